//! The detection engine: one sequential pass per scheduler tick.

use std::collections::HashMap;

use chrono::Duration;

use crate::error::EngineError;
use crate::state::EngineState;
use crate::tiers::TierSet;
use crate::types::{Batch, ItemRecord, TrendHit, TrendReport};

/// Trending detector over periodic listing snapshots.
///
/// Holds the tier set and the derived capacity bounds; all cross-run state
/// is threaded explicitly through [`TrendEngine::run`]. The engine performs
/// no I/O and never reads the clock.
#[derive(Debug, Clone)]
pub struct TrendEngine {
    tiers: TierSet,
    history_limit: usize,
    pushed_limit: usize,
}

/// Result of one run: an optional report plus the advanced state to
/// persist. A run that found nothing still advances state — observation
/// continues even when nothing qualifies.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Option<TrendReport>,
    pub state: EngineState,
}

impl TrendEngine {
    /// Build an engine for the given tier set. `poll_interval` is the
    /// expected spacing between batches and sizes the snapshot buffer so it
    /// covers the longest tier span.
    #[must_use]
    pub fn new(tiers: TierSet, poll_interval: Duration, pushed_limit: usize) -> Self {
        let history_limit = tiers.history_limit(poll_interval);
        Self {
            tiers,
            history_limit,
            pushed_limit,
        }
    }

    #[must_use]
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Run one detection pass.
    ///
    /// 1. Reject an empty batch before touching anything.
    /// 2. Pair every historical record (oldest batch first) with its latest
    ///    observation and classify the growth against the tiers; the first
    ///    qualifying match for an id adds it to the dedup registry, so
    ///    later pairings for the same id short-circuit. Growth is reported
    ///    against the earliest qualifying comparison point, not the largest
    ///    delta.
    /// 3. Append the current batch to the snapshot buffer and trim both
    ///    structures to their capacity bounds.
    ///
    /// The input state is untouched; the advanced copy is returned in the
    /// outcome, so a failed run consumes no state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyBatch`] if `batch` has no records.
    pub fn run(&self, state: &EngineState, batch: &Batch) -> Result<RunOutcome, EngineError> {
        if batch.is_empty() {
            return Err(EngineError::EmptyBatch);
        }

        // Duplicate ids within a batch are a collaborator contract
        // violation; last record wins, matching lookup-map construction.
        let latest_by_id: HashMap<&str, &ItemRecord> =
            batch.iter().map(|record| (record.id.as_str(), record)).collect();

        let mut pushed = state.pushed.clone();
        let mut hits: Vec<TrendHit> = Vec::new();

        for old_batch in state.history.iter() {
            for old in old_batch {
                let Some(&latest) = latest_by_id.get(old.id.as_str()) else {
                    // Dropped off the current listing; nothing to compare.
                    continue;
                };
                if pushed.contains(&old.id) {
                    continue;
                }

                let span = latest.captured_at - old.captured_at;
                // Counter regressions yield a negative delta and simply
                // fail every tier's count bound.
                #[allow(clippy::cast_possible_wrap)]
                let delta = latest.counter as i64 - old.counter as i64;

                let Some(tier) = self.tiers.classify(span, delta) else {
                    continue;
                };

                pushed.add(&old.id);
                hits.push(TrendHit {
                    label: latest.label.clone(),
                    title: latest.title.clone(),
                    link: latest.link.clone(),
                    tier_label: tier.label.clone(),
                    delta,
                });
            }
        }

        let mut history = state.history.clone();
        history.append(batch.clone(), self.history_limit);
        pushed.trim(self.pushed_limit);

        let report = if hits.is_empty() {
            tracing::info!(batch_len = batch.len(), "no new trending items");
            None
        } else {
            tracing::info!(
                hits = hits.len(),
                batch_len = batch.len(),
                "detected trending items"
            );
            Some(TrendReport { hits })
        };

        Ok(RunOutcome {
            report,
            state: EngineState { history, pushed },
        })
    }
}
