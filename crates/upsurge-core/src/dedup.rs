//! Dedup registry: bounded set of already-reported entity ids.

use serde::{Deserialize, Serialize};

/// Insertion-ordered set of entity ids that have already been reported.
///
/// Membership is by presence only, but insertion order matters: `trim`
/// keeps the most-recently-inserted ids and discards the oldest, so the
/// order in which qualifying ids are discovered determines which survive
/// under capacity pressure. This is a memory-bounded approximation of
/// "never re-alert" — an id evicted from the registry can re-enter
/// tracking and be reported again later.
///
/// Backed by a `Vec`; the registry holds on the order of a hundred ids, so
/// linear membership checks are fine. Serializes as a plain id array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupRegistry(Vec<String>);

impl DedupRegistry {
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|pushed| pushed == id)
    }

    /// Record `id` as reported. A no-op if it is already present, so an
    /// id's position reflects its first insertion.
    pub fn add(&mut self, id: &str) {
        if !self.contains(id) {
            self.0.push(id.to_string());
        }
    }

    /// Keep only the most-recently-inserted `limit` ids, discarding the
    /// oldest. Called once per run after all adds are done.
    pub fn trim(&mut self, limit: usize) {
        if self.0.len() > limit {
            let excess = self.0.len() - limit;
            self.0.drain(..excess);
        }
    }

    /// Ids in insertion order, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
