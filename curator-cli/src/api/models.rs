//! Wire models for the collections service.

use serde::{Deserialize, Serialize};

/// Status a company can be in. Kept in sync with the legacy `liked` flag:
/// `liked` is true iff status is `Liked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    #[default]
    New,
    Liked,
    Ignore,
}

impl CompanyStatus {
    /// Map a destination collection's name to the status companies take on
    /// when transferred into it.
    pub fn from_collection_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("liked") || name.contains("favorite") || name.contains("qualified") {
            CompanyStatus::Liked
        } else if name.contains("ignore") || name.contains("reject") || name.contains("skip") {
            CompanyStatus::Ignore
        } else {
            CompanyStatus::New
        }
    }

    /// User-facing phrasing for a transfer toward this status:
    /// (in-progress action, past-tense verb).
    pub fn action_text(&self) -> (&'static str, &'static str) {
        match self {
            CompanyStatus::Liked => ("Mark as Liked", "marked as Liked"),
            CompanyStatus::Ignore => ("Mark as Ignore", "moved to Ignore list"),
            CompanyStatus::New => ("Mark as New", "marked as New"),
        }
    }
}

/// A company record as served by the collections API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub company_name: String,
    /// Legacy flag, kept for older consumers.
    pub liked: bool,
    #[serde(default)]
    pub status: CompanyStatus,
}

impl Company {
    /// Apply a status change, keeping the legacy flag consistent.
    pub fn set_status(&mut self, status: CompanyStatus) {
        self.status = status;
        self.liked = status == CompanyStatus::Liked;
    }
}

/// A named grouping of companies with an approximate (cached) total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub collection_name: String,
    #[serde(default)]
    pub total: u64,
}

/// One page of companies within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPage {
    pub companies: Vec<Company>,
    pub total: u64,
}

/// Request body for a bulk transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub company_ids: Vec<i64>,
    pub dest_collection_id: String,
    #[serde(default)]
    pub transfer_all: bool,
}

/// Response to a transfer submission. A missing `job_id` means the operation
/// completed synchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    pub status: String,
    pub message: String,
}

/// Terminal and non-terminal states of a background transfer job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Status snapshot of a background transfer job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferJob {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: u64,
    pub total: u64,
    #[serde(default)]
    pub eta_seconds: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}
