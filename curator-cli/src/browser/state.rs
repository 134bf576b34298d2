//! Top-level browser state.

use std::sync::Arc;

use crate::api::{Company, CompanyStatus, CollectionApi};
use crate::browser::commands;
use crate::browser::job::JobTracker;
use crate::browser::list::PagedListStore;
use crate::browser::msg::Msg;
use crate::browser::notifications::NotificationLog;
use crate::browser::registry::CollectionRegistry;
use crate::browser::selection::SelectionTracker;
use crate::command::Command;
use crate::config::BrowserConfig;

/// Everything a submitted transfer needs for its follow-up effects: the
/// notification wording, the count moved between collections, and the
/// snapshot that undoes the optimistic mutation.
#[derive(Debug, Clone)]
pub struct TransferContext {
    pub source_collection_id: String,
    pub dest_collection_id: String,
    pub new_status: CompanyStatus,
    /// Explicitly selected ids; empty for transfer-all.
    pub company_ids: Vec<i64>,
    pub transfer_all: bool,
    /// Loaded companies the optimistic mutation touched.
    pub affected_count: usize,
    pub is_large: bool,
    /// Companies removed optimistically (small transfers only).
    pub removed: Vec<Company>,
    /// Prior (id, status, liked) of patched companies (large transfers only).
    pub patched: Vec<(i64, CompanyStatus, bool)>,
}

pub struct State {
    pub api: Arc<dyn CollectionApi>,
    pub config: BrowserConfig,
    pub list: PagedListStore,
    pub selection: SelectionTracker,
    pub registry: CollectionRegistry,
    pub job: JobTracker,
    pub notifications: NotificationLog,
    /// Set while a submitted background job may still need its optimistic
    /// patch rolled back.
    pub active_transfer: Option<TransferContext>,
    pub collections_loading: bool,
    /// Token for the delayed post-job list reload.
    pub(crate) reload_generation: u64,
}

impl State {
    /// Build the initial state and the command that loads the collections.
    pub fn new(api: Arc<dyn CollectionApi>, config: BrowserConfig) -> (Self, Command<Msg>) {
        let state = Self {
            api: api.clone(),
            config,
            list: PagedListStore::default(),
            selection: SelectionTracker::default(),
            registry: CollectionRegistry::default(),
            job: JobTracker::default(),
            notifications: NotificationLog::default(),
            active_transfer: None,
            collections_loading: true,
            reload_generation: 0,
        };
        (state, commands::load_collections(api))
    }

    /// Invalidate every outstanding timer and fetch so late deliveries
    /// become no-ops. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.list.cancel_pending();
        self.registry.cancel_pending();
        self.job.clear();
        self.reload_generation += 1;
        self.active_transfer = None;
    }
}
