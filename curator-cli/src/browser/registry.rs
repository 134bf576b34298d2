//! Collection registry: the set of collections, their company counts, and
//! the currently selected one.
//!
//! Counts are adjusted optimistically when a transfer is submitted and later
//! replaced wholesale by a debounced authoritative refresh. The debounce is a
//! generation token: scheduling bumps it, and a due message carrying an old
//! token is ignored.

use crate::api::Collection;

#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: Vec<Collection>,
    selected_id: Option<String>,
    refresh_generation: u64,
}

impl CollectionRegistry {
    /// Install the initial collection list, selecting the first one when
    /// nothing is selected yet.
    pub fn load(&mut self, collections: Vec<Collection>) {
        self.collections = collections;
        if self.selected_id.is_none() {
            self.selected_id = self.collections.first().map(|c| c.id.clone());
        }
    }

    /// Select by id. Returns false when the id is unknown.
    pub fn select(&mut self, id: &str) -> bool {
        if self.collections.iter().any(|c| c.id == id) {
            self.selected_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&Collection> {
        let id = self.selected_id.as_deref()?;
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Optimistically move `count` companies from `source_id` to `dest_id`.
    /// The source count floors at zero; drift is corrected by the next
    /// authoritative refresh.
    pub fn apply_counts(&mut self, source_id: &str, dest_id: &str, count: u64) {
        for collection in &mut self.collections {
            if collection.id == source_id {
                collection.total = collection.total.saturating_sub(count);
            } else if collection.id == dest_id {
                collection.total += count;
            }
        }
    }

    /// Schedule a debounced refresh, superseding any pending one. The caller
    /// delivers the returned token back when the delay elapses.
    pub fn schedule_refresh(&mut self) -> u64 {
        self.refresh_generation += 1;
        self.refresh_generation
    }

    /// Invalidate any pending debounced refresh.
    pub fn cancel_pending(&mut self) {
        self.refresh_generation += 1;
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.refresh_generation == token
    }

    /// Replace counts with the authoritative server list. The selection is
    /// kept by id.
    pub fn apply_refresh(&mut self, collections: Vec<Collection>) {
        self.collections = collections;
        if let Some(id) = &self.selected_id {
            if !self.collections.iter().any(|c| &c.id == id) {
                self.selected_id = self.collections.first().map(|c| c.id.clone());
            }
        }
    }
}
