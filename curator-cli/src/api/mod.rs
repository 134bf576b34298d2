//! Collections service API: wire models, error normalization, and the
//! HTTP client behind the [`CollectionApi`] contract.

pub mod client;
pub mod error;
pub mod models;

pub use client::{CollectionApi, CollectionsClient};
pub use error::ApiError;
pub use models::{
    Collection, Company, CompanyPage, CompanyStatus, JobStatus, TransferJob, TransferRequest,
    TransferResponse,
};
