//! Messages driving the browser update loop.
//!
//! Async results and expired timers arrive as messages; variants carrying a
//! generation token are dropped by `update` when the token no longer matches
//! the owning component.

use crate::api::{ApiError, Collection, Company, CompanyPage, TransferJob, TransferResponse};
use crate::browser::state::TransferContext;

#[derive(Debug, Clone)]
pub enum Msg {
    // Startup and navigation
    CollectionsLoaded(Result<Vec<Collection>, ApiError>),
    CollectionSelected(String),
    SearchChanged(String),

    // List fetches
    PageLoaded {
        generation: u64,
        result: Result<CompanyPage, ApiError>,
    },
    LoadMoreRequested,
    MorePageLoaded {
        generation: u64,
        result: Result<CompanyPage, ApiError>,
    },
    RowsReordered(Vec<Company>),

    // Selection
    RowClicked {
        index: usize,
        range_select: bool,
    },
    ToggleSelectAll,
    ClearSelection,

    // Transfers
    TransferRequested {
        dest_collection_id: String,
        transfer_all: bool,
    },
    TransferSubmitted {
        ctx: TransferContext,
        result: Result<TransferResponse, ApiError>,
    },

    // Job polling and follow-up timers
    PollDue(u64),
    PollCompleted {
        generation: u64,
        result: Result<TransferJob, ApiError>,
    },
    JobDisplayExpired(u64),
    ListReloadDue(u64),

    // Registry refresh
    CollectionsRefreshDue(u64),
    CollectionsRefreshed(Result<Vec<Collection>, ApiError>),
}
