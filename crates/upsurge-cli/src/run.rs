//! One detection pass: read the batch, thread the state, render the report.

use std::fmt::Write as _;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use upsurge_core::{AppConfig, Batch, EngineState, ItemRecord, TierSet, TrendEngine, TrendReport};

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Batch file holding the current listing snapshot as a JSON array of
    /// item records, or `-` for stdin.
    #[arg(long, default_value = "-")]
    pub batch: String,

    /// Engine state file; created on first run. Overrides UPSURGE_STATE_PATH.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Tier configuration file. Overrides UPSURGE_TIERS_PATH.
    #[arg(long)]
    pub tiers: Option<PathBuf>,

    /// Report output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Run one detection pass end to end.
///
/// The state file is only written after the engine succeeds, and the write
/// is temp-file-plus-rename, so a failed pass leaves the previous state
/// intact and the run can simply be re-attempted.
///
/// # Errors
///
/// Fails on unreadable/invalid batch or state files, invalid tier
/// configuration, an empty batch, or a state-write failure.
pub fn run_once(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let state_path = args.state.clone().unwrap_or_else(|| config.state_path.clone());
    let tiers_path = args.tiers.clone().unwrap_or_else(|| config.tiers_path.clone());

    let tiers = TierSet::from_file_or_default(&tiers_path)?;
    let engine = TrendEngine::new(tiers, config.poll_interval(), config.pushed_limit);

    let batch = read_batch(&args.batch)?;
    let state = load_state(&state_path)?;

    let outcome = engine.run(&state, &batch)?;

    if let Some(report) = &outcome.report {
        match args.format {
            Format::Text => print!("{}", render_text(report)),
            Format::Json => println!("{}", serde_json::to_string_pretty(report)?),
        }
    }

    write_state(&state_path, &outcome.state)?;
    Ok(())
}

fn read_batch(source: &str) -> anyhow::Result<Batch> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read batch from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read batch file {source}"))?
    };
    parse_batch(&raw)
}

fn parse_batch(raw: &str) -> anyhow::Result<Batch> {
    let records: Vec<ItemRecord> =
        serde_json::from_str(raw).context("batch is not a JSON array of item records")?;
    Ok(Batch::new(records))
}

/// Load persisted engine state; an absent file is the first-ever run.
fn load_state(path: &Path) -> anyhow::Result<EngineState> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no state file yet, starting fresh");
        return Ok(EngineState::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("state file {} is corrupt", path.display()))
}

fn write_state(path: &Path, state: &EngineState) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("failed to write state to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move state into place at {}", path.display()))?;
    Ok(())
}

fn render_text(report: &TrendReport) -> String {
    let mut out = format!("Found {} items trending upward:\n", report.hits.len());
    for hit in &report.hits {
        let _ = write!(
            out,
            "\n- [{}] {}\n  {}\n  +{} within {}\n",
            hit.label, hit.title, hit.link, hit.delta, hit.tier_label
        );
    }
    out
}
