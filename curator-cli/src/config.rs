//! Operational parameters for the browser core.
//!
//! Everything timing- or size-related is configurable here rather than baked
//! into the logic. Durations are stored as milliseconds so the config can be
//! loaded from a plain TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Companies fetched per page.
    pub page_size: usize,
    /// Explicit-id transfers above this count are treated as large.
    pub small_batch_threshold: usize,
    /// Spacing between background-job status polls.
    pub poll_interval_ms: u64,
    /// How long a finished job stays visible before being cleared.
    pub completion_display_ms: u64,
    /// Large transfers delay the authoritative count refresh by this factor,
    /// since background processing takes longer to settle server-side.
    pub large_refresh_multiplier: u32,
    /// Pause after job completion before clearing the cache and reloading,
    /// letting server-side state settle.
    pub reload_settle_ms: u64,
    /// Minimum spacing between scroll-driven load-more triggers.
    pub load_trigger_spacing_ms: u64,
    /// Displayed job total for transfer-all before the first poll confirms
    /// the real count.
    pub transfer_all_estimated_total: u64,
    /// Whether a failed background job rolls back the optimistic in-place
    /// status patch. Off by default: the transfer is treated as best-effort
    /// and the authoritative reload corrects any drift.
    pub rollback_patch_on_job_failure: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            small_batch_threshold: 10,
            poll_interval_ms: 1000,
            completion_display_ms: 2000,
            large_refresh_multiplier: 10,
            reload_settle_ms: 500,
            load_trigger_spacing_ms: 800,
            transfer_all_estimated_total: 10_000,
            rollback_patch_on_job_failure: false,
        }
    }
}

impl BrowserConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn completion_display(&self) -> Duration {
        Duration::from_millis(self.completion_display_ms)
    }

    pub fn reload_settle(&self) -> Duration {
        Duration::from_millis(self.reload_settle_ms)
    }

    pub fn load_trigger_spacing(&self) -> Duration {
        Duration::from_millis(self.load_trigger_spacing_ms)
    }

    /// Delay before the debounced authoritative collection refresh.
    pub fn registry_refresh_delay(&self, is_large: bool) -> Duration {
        let base = self.completion_display();
        if is_large {
            base * self.large_refresh_multiplier
        } else {
            base
        }
    }

    /// All delays zeroed; used by tests that only care about sequencing.
    pub fn immediate() -> Self {
        Self {
            poll_interval_ms: 0,
            completion_display_ms: 0,
            reload_settle_ms: 0,
            load_trigger_spacing_ms: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.small_batch_threshold, 10);
        assert_eq!(config.large_refresh_multiplier, 10);
        assert!(!config.rollback_patch_on_job_failure);
    }

    #[test]
    fn test_large_refresh_delay_is_an_order_of_magnitude_longer() {
        let config = BrowserConfig::default();
        assert_eq!(
            config.registry_refresh_delay(true),
            config.registry_refresh_delay(false) * 10
        );
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: BrowserConfig = toml::from_str("page_size = 25\n").unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.small_batch_threshold, 10);
    }
}
