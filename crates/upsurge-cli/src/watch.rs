//! Scheduled detection passes.
//!
//! Registers the single-pass runner as a cron job. The batch file is
//! re-read on every tick; whatever refreshes it (a fetcher, a parser, a
//! cron job of its own) runs out of band. Ticks are serialized by the job
//! body itself — each pass loads state, runs, and writes state to
//! completion before the closure returns.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use tokio_cron_scheduler::{Job, JobScheduler};
use upsurge_core::AppConfig;

use crate::run::{run_once, RunArgs};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Cron expression (with seconds field) controlling when passes fire.
    #[arg(long, default_value = "0 */10 * * * *")]
    pub cron: String,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Run detection passes on the given cron schedule until Ctrl-C/SIGTERM.
///
/// # Errors
///
/// Fails if the cron expression is invalid or the scheduler cannot start.
/// Failures inside a pass (empty batch, unreadable files) are logged and
/// the next tick proceeds — state is untouched by a failed pass, so a
/// retry on the next tick is safe.
pub async fn watch(config: &AppConfig, args: WatchArgs) -> anyhow::Result<()> {
    if args.run.batch == "-" {
        anyhow::bail!("watch re-reads the batch every tick: point --batch at a file, not stdin");
    }

    let config = Arc::new(config.clone());
    let run_args = Arc::new(args.run);

    let job = Job::new_async(args.cron.as_str(), move |_uuid, _scheduler| {
        let config = Arc::clone(&config);
        let run_args = Arc::clone(&run_args);
        Box::pin(async move {
            if let Err(e) = run_once(&config, &run_args) {
                tracing::error!(error = %e, "detection pass failed");
            }
        })
    })
    .with_context(|| format!("invalid cron expression \"{}\"", args.cron))?;

    let mut scheduler = JobScheduler::new().await?;
    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %args.cron, "watch started");

    shutdown_signal().await;
    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping watch");
}
