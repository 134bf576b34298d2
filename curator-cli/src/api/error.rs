//! Error taxonomy for the collections API.
//!
//! Every failure is normalized into one of three shapes: an application-level
//! failure carrying the server's own detail message, a transport failure, or
//! an unclassifiable one. Status 404 doubles as the pagination-exhaustion
//! signal, which callers distinguish from retryable failures.

use serde::Deserialize;

pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with an error payload.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never reached the server or was never answered.
    #[error("{NETWORK_ERROR}")]
    Network(String),

    /// Anything that fits neither shape.
    #[error("{UNEXPECTED_ERROR}")]
    Unexpected,
}

/// Error payload shapes the server is known to produce.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// True for the "no more data" signal that permanently ends pagination.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// The human-readable message shown in notifications.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Build from an HTTP status and raw response body, preferring the
    /// server-supplied `detail` or `message` field.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail.or(b.message))
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        ApiError::Status { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            ApiError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
