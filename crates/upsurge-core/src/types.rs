//! Core data model: item records, batches, and the run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of one trackable entity at one point in time.
///
/// Immutable once created; each run builds fresh records from the
/// collaborator's parsed listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Stable identity, assigned by the listing source (e.g. a topic id).
    pub id: String,

    /// Categorical tag for the entity (e.g. the board or node it lives under).
    pub label: String,

    /// Display title at capture time.
    pub title: String,

    /// Link back to the entity on the source.
    pub link: String,

    /// Monotonically non-decreasing engagement counter (e.g. reply count).
    pub counter: u64,

    /// When this observation was captured. Stamped by the collaborator
    /// during parsing; the engine never reads the clock.
    pub captured_at: DateTime<Utc>,
}

/// One timestamped collection of item records from a single observation of
/// the source listing.
///
/// Records within a batch carry at most one entry per id; the collaborator
/// that parses the listing owns that guarantee. All records are captured at
/// effectively the same instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch(Vec<ItemRecord>);

impl Batch {
    #[must_use]
    pub fn new(records: Vec<ItemRecord>) -> Self {
        Self(records)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records in enumeration order (the order the source listed them).
    pub fn iter(&self) -> std::slice::Iter<'_, ItemRecord> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a ItemRecord;
    type IntoIter = std::slice::Iter<'a, ItemRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One qualifying entity in a run's report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendHit {
    /// Categorical tag of the entity at its latest observation.
    pub label: String,
    pub title: String,
    pub link: String,
    /// Human-readable span description of the matched tier.
    pub tier_label: String,
    /// Counter growth over the matched comparison window.
    pub delta: i64,
}

/// The single structured result of a run that found qualifying entities.
///
/// Hits appear in discovery order: oldest historical batch first, then
/// record enumeration order within that batch. No entity appears twice.
/// Rendering this into text or markup for a delivery channel is a
/// collaborator concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub hits: Vec<TrendHit>,
}
