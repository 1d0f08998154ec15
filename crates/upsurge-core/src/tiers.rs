//! Growth-rate tiers and threshold matching.
//!
//! A tier is a `(span, count)` pair: "the counter grew by at least `count`
//! within `span`". Tiers are held ascending by span; a shared tolerance is
//! added to every tier's span bound to absorb scheduling jitter, and never
//! to the count bound — count thresholds are strict.

use std::path::Path;

use chrono::Duration;
use serde::Deserialize;

use crate::error::ConfigError;

/// One growth-rate threshold.
#[derive(Debug, Clone)]
pub struct Tier {
    /// Human-readable span description, used verbatim in reports.
    pub label: String,
    /// Time window the growth must fit inside.
    pub span: Duration,
    /// Minimum counter growth within the window.
    pub count_delta: i64,
}

/// The fixed tier list (ascending by span) plus the shared span tolerance.
#[derive(Debug, Clone)]
pub struct TierSet {
    tiers: Vec<Tier>,
    tolerance: Duration,
}

impl TierSet {
    /// Build a tier set, validating that tiers are non-empty, have positive
    /// spans and counts, and are strictly ascending by span.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTiers`] when validation fails.
    pub fn new(tiers: Vec<Tier>, tolerance: Duration) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::InvalidTiers(
                "at least one tier is required".to_string(),
            ));
        }
        if tolerance < Duration::zero() {
            return Err(ConfigError::InvalidTiers(
                "tolerance must not be negative".to_string(),
            ));
        }
        for tier in &tiers {
            if tier.span <= Duration::zero() {
                return Err(ConfigError::InvalidTiers(format!(
                    "tier \"{}\" has a non-positive span",
                    tier.label
                )));
            }
            if tier.count_delta <= 0 {
                return Err(ConfigError::InvalidTiers(format!(
                    "tier \"{}\" has a non-positive count delta",
                    tier.label
                )));
            }
        }
        for pair in tiers.windows(2) {
            if pair[1].span <= pair[0].span {
                return Err(ConfigError::InvalidTiers(format!(
                    "tier spans must be strictly ascending: \"{}\" does not extend \"{}\"",
                    pair[1].label, pair[0].label
                )));
            }
        }
        Ok(Self { tiers, tolerance })
    }

    /// Load a tier set from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails
    /// validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TiersFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: TiersFile = serde_yaml::from_str(&content)?;
        file.into_tier_set()
    }

    /// Load a tier set from a YAML file, falling back to the built-in
    /// defaults when the file does not exist. A present-but-broken file is
    /// still an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an existing file cannot be read, parsed, or
    /// fails validation.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "tiers file not found, using built-in tiers");
            Ok(Self::default())
        }
    }

    /// Classify a computed `(span, delta)` pair: the first tier (ascending
    /// span order) satisfied by both bounds, or `None`.
    ///
    /// Ascending order means the tightest satisfied tier wins — a burst
    /// large enough for both a 30-minute and a 2-hour tier reports under
    /// the 30-minute tier. The tolerance widens only the span bound.
    #[must_use]
    pub fn classify(&self, span: Duration, delta: i64) -> Option<&Tier> {
        self.tiers
            .iter()
            .find(|tier| delta >= tier.count_delta && span <= tier.span + self.tolerance)
    }

    /// How many batches the snapshot buffer must hold: enough to cover the
    /// longest tracked span at the given polling interval, plus one.
    #[must_use]
    pub fn history_limit(&self, poll_interval: Duration) -> usize {
        let max_span_secs = self.tiers.last().map_or(0, |t| t.span.num_seconds());
        let poll_secs = poll_interval.num_seconds().max(1);
        let batches = (max_span_secs + poll_secs - 1) / poll_secs + 1;
        usize::try_from(batches).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    #[must_use]
    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }
}

impl Default for TierSet {
    /// The built-in tiers: 15 in 10 minutes, 30 in 30 minutes, 45 in one
    /// hour, 60 in two hours, with a two-minute span tolerance.
    fn default() -> Self {
        let tier = |label: &str, minutes: i64, count_delta: i64| Tier {
            label: label.to_string(),
            span: Duration::minutes(minutes),
            count_delta,
        };
        Self {
            tiers: vec![
                tier("10 minutes", 10, 15),
                tier("30 minutes", 30, 30),
                tier("1 hour", 60, 45),
                tier("2 hours", 120, 60),
            ],
            tolerance: Duration::minutes(2),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TiersFile {
    #[serde(default = "default_tolerance_secs")]
    tolerance_secs: u64,
    tiers: Vec<TierEntry>,
}

#[derive(Debug, Deserialize)]
struct TierEntry {
    label: String,
    span_secs: u64,
    count_delta: i64,
}

fn default_tolerance_secs() -> u64 {
    120
}

impl TiersFile {
    fn into_tier_set(self) -> Result<TierSet, ConfigError> {
        let tolerance = secs_to_duration(self.tolerance_secs, "tolerance_secs")?;
        let tiers = self
            .tiers
            .into_iter()
            .map(|entry| {
                let span = secs_to_duration(entry.span_secs, &entry.label)?;
                Ok(Tier {
                    label: entry.label,
                    span,
                    count_delta: entry.count_delta,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        TierSet::new(tiers, tolerance)
    }
}

fn secs_to_duration(secs: u64, what: &str) -> Result<Duration, ConfigError> {
    let secs = i64::try_from(secs)
        .map_err(|_| ConfigError::InvalidTiers(format!("{what}: seconds value out of range")))?;
    Ok(Duration::seconds(secs))
}
