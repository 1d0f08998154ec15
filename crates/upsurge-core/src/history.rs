//! Snapshot buffer: bounded, time-ordered history of past batches.

use serde::{Deserialize, Serialize};

use crate::types::Batch;

/// Bounded sequence of past batches, oldest first.
///
/// Capacity is enforced at append time with FIFO eviction from the front:
/// age of insertion governs eviction, never access. Stored batches are
/// read-only; nothing removes an individual record from a batch once it is
/// in the buffer.
///
/// Serializes as a plain array of batches, so persisted state round-trips
/// unchanged in shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotBuffer(Vec<Batch>);

impl SnapshotBuffer {
    /// Append the current batch and trim from the front so that at most
    /// `limit` batches remain.
    pub fn append(&mut self, batch: Batch, limit: usize) {
        self.0.push(batch);
        if self.0.len() > limit {
            let excess = self.0.len() - limit;
            self.0.drain(..excess);
        }
    }

    /// Batches oldest to newest.
    pub fn iter(&self) -> std::slice::Iter<'_, Batch> {
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
