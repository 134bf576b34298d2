//! Paged list store for the company list.
//!
//! Owns the in-memory list for the currently viewed collection/search pair.
//! `offset` is the source of truth for how many companies have been fetched,
//! not the vec length, so interleaved optimistic mutations and loads cannot
//! disagree about the next page boundary. At rest the two are equal.

use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

use crate::api::{Company, CompanyPage, CompanyStatus};

#[derive(Debug, Clone)]
struct CachedPage {
    companies: Vec<Company>,
    total: u64,
}

/// Minimum-spacing throttle for scroll/resize-driven load triggers.
/// Independent of the in-flight load guard.
#[derive(Debug, Default)]
pub struct LoadTrigger {
    last: Option<Instant>,
}

impl LoadTrigger {
    /// Returns true and records the trigger if enough time has passed since
    /// the previous one.
    pub fn allow(&mut self, spacing: Duration) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last {
            if now.duration_since(last) < spacing {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

#[derive(Debug, Default)]
pub struct PagedListStore {
    pub companies: Vec<Company>,
    /// Server-reported total for the current view.
    pub total: u64,
    /// Count of fetched companies; the next page starts here.
    pub offset: usize,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    pub search: String,

    /// Snapshots keyed by (collection id, search term). Only populated for
    /// empty-search views; search results are ephemeral and stay uncached.
    cache: HashMap<(String, String), CachedPage>,
    /// Bumped on every refresh so late responses from a superseded fetch
    /// cannot overwrite newer state.
    generation: u64,
    trigger: LoadTrigger,
}

impl PagedListStore {
    /// Start showing `collection_id` filtered by the current search term.
    ///
    /// Returns `None` when a cached snapshot was applied synchronously, or
    /// `Some(generation)` when the caller must fetch the first page and
    /// report back with that token.
    pub fn refresh(&mut self, collection_id: &str) -> Option<u64> {
        self.error = None;
        self.loading_more = false;
        self.generation += 1;

        if self.search.is_empty() {
            let key = (collection_id.to_string(), String::new());
            if let Some(cached) = self.cache.get(&key) {
                self.companies = cached.companies.clone();
                self.total = cached.total;
                self.offset = self.companies.len();
                self.has_more = self.offset < self.total as usize;
                self.loading = false;
                return None;
            }
        }

        self.loading = true;
        self.offset = 0;
        Some(self.generation)
    }

    /// Whether a fetch result with this token is still the active one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn apply_refresh(&mut self, collection_id: &str, page: CompanyPage) {
        self.companies = page.companies;
        self.total = page.total;
        self.offset = self.companies.len();
        self.has_more = !self.companies.is_empty() && self.offset < self.total as usize;
        self.loading = false;

        if self.search.is_empty() {
            self.cache.insert(
                (collection_id.to_string(), String::new()),
                CachedPage {
                    companies: self.companies.clone(),
                    total: self.total,
                },
            );
        }
    }

    pub fn fail_refresh(&mut self, message: String) {
        self.companies.clear();
        self.total = 0;
        self.offset = 0;
        self.has_more = false;
        self.loading = false;
        self.error = Some(message);
    }

    /// Throttle gate for scroll-driven triggers; records the attempt even if
    /// the subsequent load guards reject it.
    pub fn trigger_allowed(&mut self, spacing: Duration) -> bool {
        self.trigger.allow(spacing)
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.loading && !self.loading_more
    }

    /// Capture the offset for the next page before the fetch resolves, so a
    /// second call cannot request an overlapping range.
    pub fn begin_load_more(&mut self) -> (usize, u64) {
        self.loading_more = true;
        (self.offset, self.generation)
    }

    pub fn apply_load_more(&mut self, page: CompanyPage) {
        let fetched = page.companies.len();
        self.companies.extend(page.companies);
        self.offset += fetched;
        self.total = page.total;
        self.has_more = self.offset < self.total as usize;
        self.loading_more = false;
    }

    /// A not-found style failure means the range is simply gone; anything
    /// else keeps `has_more` so the user can retry by scrolling again.
    pub fn fail_load_more(&mut self, exhausted: bool) {
        self.loading_more = false;
        if exhausted {
            self.has_more = false;
        }
    }

    /// Drop the given companies from the list, returning them in list order
    /// so a failed transfer can restore them.
    pub fn optimistic_remove(&mut self, ids: &[i64]) -> Vec<Company> {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.companies.len());
        for company in self.companies.drain(..) {
            if wanted.contains(&company.id) {
                removed.push(company);
            } else {
                kept.push(company);
            }
        }
        self.companies = kept;
        self.offset = self.companies.len();
        self.total = self.total.saturating_sub(removed.len() as u64);
        self.has_more = self.offset < self.total as usize;
        removed
    }

    /// Put previously removed companies back at the front of the list.
    pub fn optimistic_restore(&mut self, restored: Vec<Company>) {
        let count = restored.len() as u64;
        let mut companies = restored;
        companies.append(&mut self.companies);
        self.companies = companies;
        self.offset = self.companies.len();
        self.total += count;
        self.has_more = self.offset < self.total as usize;
    }

    /// In-place status change with no count or pagination effect. Returns the
    /// prior (id, status, liked) triples for optional rollback.
    pub fn optimistic_status_patch(
        &mut self,
        ids: &[i64],
        status: CompanyStatus,
    ) -> Vec<(i64, CompanyStatus, bool)> {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let mut prior = Vec::new();
        for company in &mut self.companies {
            if wanted.contains(&company.id) {
                prior.push((company.id, company.status, company.liked));
                company.set_status(status);
            }
        }
        prior
    }

    /// Undo a status patch for companies still present in the list.
    pub fn restore_statuses(&mut self, prior: &[(i64, CompanyStatus, bool)]) {
        for &(id, status, liked) in prior {
            if let Some(company) = self.companies.iter_mut().find(|c| c.id == id) {
                company.status = status;
                company.liked = liked;
            }
        }
    }

    /// Replace the display order with a client-supplied permutation. Local
    /// only; there is no server-side order to persist.
    pub fn reorder(&mut self, companies: Vec<Company>) {
        if companies.len() != self.companies.len() {
            log::warn!(
                "reorder with {} companies replaces a list of {}",
                companies.len(),
                self.companies.len()
            );
        }
        self.companies = companies;
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn loaded_ids(&self) -> Vec<i64> {
        self.companies.iter().map(|c| c.id).collect()
    }

    /// Invalidate every in-flight fetch; part of teardown.
    pub fn cancel_pending(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.loading_more = false;
    }
}
