//! Bounded in-memory notification log.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// Newest-last log; oldest entries are dropped past capacity.
#[derive(Debug)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl NotificationLog {
    pub fn info(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(NotificationLevel::Info, title.into(), detail.into());
    }

    pub fn success(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(NotificationLevel::Success, title.into(), detail.into());
    }

    pub fn error(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(NotificationLevel::Error, title.into(), detail.into());
    }

    fn push(&mut self, level: NotificationLevel, title: String, detail: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Notification {
            level,
            title,
            detail,
            timestamp: Utc::now(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
