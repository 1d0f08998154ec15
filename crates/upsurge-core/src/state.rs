//! Engine state persisted across runs.

use serde::{Deserialize, Serialize};

use crate::dedup::DedupRegistry;
use crate::history::SnapshotBuffer;

/// The only state that survives between runs: the snapshot buffer and the
/// dedup registry.
///
/// Loaded as a working copy at run start and replaced wholesale at run end;
/// the engine never partially mutates persisted state. Where and how the
/// serialized form is stored is a collaborator concern — the engine only
/// requires that `{history, pushed}` round-trips unchanged in shape.
///
/// `Default` is the first-ever-run state: empty history, empty registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineState {
    #[serde(default)]
    pub history: SnapshotBuffer,
    #[serde(default)]
    pub pushed: DedupRegistry,
}
