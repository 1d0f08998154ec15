pub mod app_config;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod history;
pub mod state;
pub mod tiers;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use dedup::DedupRegistry;
pub use engine::{RunOutcome, TrendEngine};
pub use error::{ConfigError, EngineError};
pub use history::SnapshotBuffer;
pub use state::EngineState;
pub use tiers::{Tier, TierSet};
pub use types::{Batch, ItemRecord, TrendHit, TrendReport};
