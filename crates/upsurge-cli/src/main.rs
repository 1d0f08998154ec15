mod run;
mod watch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "upsurge-cli")]
#[command(about = "Trending-item detection over periodic listing snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one detection pass over a batch file and exit.
    Run(run::RunArgs),
    /// Keep running detection passes on a cron schedule.
    Watch(watch::WatchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = upsurge_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run::run_once(&config, &args),
        Commands::Watch(args) => watch::watch(&config, args).await,
    }
}
