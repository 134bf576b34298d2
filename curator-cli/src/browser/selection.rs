//! Multi-select over the loaded company list.
//!
//! Selection is keyed by company id so it survives reorders; the range anchor
//! is positional and is invalidated whenever the underlying list changes
//! shape, since a stale index would select an arbitrary span.

use std::collections::HashSet;

use crate::api::Company;

#[derive(Debug, Default)]
pub struct SelectionTracker {
    selected: HashSet<i64>,
    anchor: Option<usize>,
}

impl SelectionTracker {
    /// Handle a row click. A plain click toggles the row; a range click adds
    /// every unselected row between the anchor and the clicked index. Both
    /// kinds move the anchor to the clicked row.
    pub fn click(&mut self, index: usize, range_select: bool, companies: &[Company]) {
        let Some(company) = companies.get(index) else {
            return;
        };

        if range_select {
            if let Some(anchor) = self.anchor {
                let (start, end) = if anchor <= index {
                    (anchor, index)
                } else {
                    (index, anchor)
                };
                for row in &companies[start..=end.min(companies.len() - 1)] {
                    self.selected.insert(row.id);
                }
                self.anchor = Some(index);
                return;
            }
        }

        if !self.selected.insert(company.id) {
            self.selected.remove(&company.id);
        }
        self.anchor = Some(index);
    }

    /// Select every loaded company, or clear when all are already selected.
    pub fn toggle_select_all(&mut self, loaded_ids: &[i64]) {
        let all_selected =
            !loaded_ids.is_empty() && loaded_ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            self.clear();
        } else {
            self.selected.extend(loaded_ids.iter().copied());
            self.anchor = None;
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Drop the positional anchor; the id set stays intact.
    pub fn invalidate_anchor(&mut self) {
        self.anchor = None;
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Every loaded company is selected (false for an empty list).
    pub fn all_selected(&self, loaded_ids: &[i64]) -> bool {
        !loaded_ids.is_empty() && loaded_ids.iter().all(|id| self.selected.contains(id))
    }

    /// Some but not all loaded companies are selected.
    pub fn partially_selected(&self, loaded_ids: &[i64]) -> bool {
        let count = loaded_ids
            .iter()
            .filter(|id| self.selected.contains(id))
            .count();
        count > 0 && count < loaded_ids.len()
    }

    /// Selected ids in loaded-list order.
    pub fn selected_in(&self, companies: &[Company]) -> Vec<i64> {
        companies
            .iter()
            .filter(|c| self.selected.contains(&c.id))
            .map(|c| c.id)
            .collect()
    }
}
