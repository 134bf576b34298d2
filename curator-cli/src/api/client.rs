//! HTTP client for the collections service.

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::ApiError;
use super::models::{Collection, CompanyPage, TransferJob, TransferRequest, TransferResponse};

/// Narrow contract the core depends on. The production implementation is
/// [`CollectionsClient`]; tests substitute scripted fakes.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<Collection>, ApiError>;

    async fn list_companies(
        &self,
        collection_id: &str,
        offset: usize,
        limit: usize,
        search: &str,
    ) -> Result<CompanyPage, ApiError>;

    async fn submit_transfer(
        &self,
        collection_id: &str,
        request: TransferRequest,
    ) -> Result<TransferResponse, ApiError>;

    async fn job_status(&self, job_id: &str) -> Result<TransferJob, ApiError>;
}

/// reqwest-backed implementation of [`CollectionApi`].
pub struct CollectionsClient {
    http: reqwest::Client,
    base_url: String,
}

impl CollectionsClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        response.json::<T>().await.map_err(ApiError::from)
    }
}

#[async_trait]
impl CollectionApi for CollectionsClient {
    async fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
        let url = format!("{}/collections", self.base_url);
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn list_companies(
        &self,
        collection_id: &str,
        offset: usize,
        limit: usize,
        search: &str,
    ) -> Result<CompanyPage, ApiError> {
        let url = format!("{}/collections/{}", self.base_url, collection_id);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("search", search.to_string()),
            ])
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn submit_transfer(
        &self,
        collection_id: &str,
        request: TransferRequest,
    ) -> Result<TransferResponse, ApiError> {
        let url = format!("{}/collections/{}/transfer", self.base_url, collection_id);
        let response = self.http.post(&url).json(&request).send().await?;
        Self::decode(response).await
    }

    async fn job_status(&self, job_id: &str) -> Result<TransferJob, ApiError> {
        let url = format!("{}/collections/jobs/{}", self.base_url, job_id);
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }
}
