use std::path::PathBuf;

use chrono::Duration;

/// Process-level configuration, read from environment variables.
///
/// Every value has a default — the detector needs no secrets and runs out
/// of the box.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Where the persisted engine state lives.
    pub state_path: PathBuf,
    /// Tier configuration file; built-in tiers are used when it is absent.
    pub tiers_path: PathBuf,
    /// Expected spacing between batches, in seconds. Sizes the snapshot
    /// buffer together with the tier spans.
    pub poll_interval_secs: u64,
    /// Capacity of the dedup registry.
    pub pushed_limit: usize,
}

impl AppConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::seconds(i64::try_from(self.poll_interval_secs).unwrap_or(i64::MAX))
    }
}
