mod collect;
mod export;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "subpulse")]
#[command(about = "Collect, score, and export subreddit content")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect posts (and optionally comments) for configured sources
    Collect {
        /// Collect only these sources; may be repeated. Sources missing from
        /// the sources file are collected with default settings.
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Maximum number of sources collected concurrently
        #[arg(long)]
        pool_size: Option<usize>,

        /// Print the collection plan without contacting Reddit or the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a JSON snapshot of recent posts and their comments
    Export {
        /// Include posts created within this many days
        #[arg(long)]
        days: u32,

        /// Output directory (defaults to SUBPULSE_EXPORT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the last collection outcome for each source
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = subpulse_core::load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Collect {
            sources,
            pool_size,
            dry_run,
        } => collect::run_collect(&config, &sources, pool_size, dry_run).await,
        Commands::Export { days, out } => export::run_export(&config, days, out).await,
        Commands::Status => status::run_status(&config).await,
    }
}

/// Open the SQLite store and apply pending migrations.
///
/// Failure here is fatal for every command that touches the database.
pub(crate) async fn open_store(
    config: &subpulse_core::AppConfig,
) -> anyhow::Result<Arc<subpulse_db::SqliteStore>> {
    let pool_config = subpulse_db::PoolConfig::from_app_config(config);
    let store = subpulse_db::open_store(&config.database_url, pool_config)
        .await
        .with_context(|| format!("failed to open store at {}", config.database_url))?;
    Ok(Arc::new(store))
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping collection");
}
