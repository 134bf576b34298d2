//! Command constructors for the browser's async effects.

use std::sync::Arc;

use crate::api::{CollectionApi, TransferRequest};
use crate::browser::msg::Msg;
use crate::browser::state::TransferContext;
use crate::command::Command;

pub fn load_collections(api: Arc<dyn CollectionApi>) -> Command<Msg> {
    Command::perform(
        async move { api.list_collections().await },
        Msg::CollectionsLoaded,
    )
}

pub fn refresh_collections(api: Arc<dyn CollectionApi>) -> Command<Msg> {
    Command::perform(
        async move { api.list_collections().await },
        Msg::CollectionsRefreshed,
    )
}

pub fn load_first_page(
    api: Arc<dyn CollectionApi>,
    collection_id: String,
    search: String,
    limit: usize,
    generation: u64,
) -> Command<Msg> {
    Command::perform(
        async move { api.list_companies(&collection_id, 0, limit, &search).await },
        move |result| Msg::PageLoaded { generation, result },
    )
}

pub fn load_next_page(
    api: Arc<dyn CollectionApi>,
    collection_id: String,
    search: String,
    offset: usize,
    limit: usize,
    generation: u64,
) -> Command<Msg> {
    Command::perform(
        async move {
            api.list_companies(&collection_id, offset, limit, &search)
                .await
        },
        move |result| Msg::MorePageLoaded { generation, result },
    )
}

pub fn submit_transfer(
    api: Arc<dyn CollectionApi>,
    ctx: TransferContext,
    request: TransferRequest,
) -> Command<Msg> {
    let source = ctx.source_collection_id.clone();
    Command::perform(
        async move { api.submit_transfer(&source, request).await },
        move |result| Msg::TransferSubmitted { ctx, result },
    )
}

pub fn poll_job(api: Arc<dyn CollectionApi>, job_id: String, generation: u64) -> Command<Msg> {
    Command::perform(
        async move { api.job_status(&job_id).await },
        move |result| Msg::PollCompleted { generation, result },
    )
}
