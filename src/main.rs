use anyhow::Context;
use clap::Parser;
use dbkeeper::{Config, Registry};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Demonstration client for the process-wide connection registry
#[derive(Parser)]
#[command(name = "dbkeeper", version, about = "Process-wide database connection registry")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, default_value = "dbkeeper.toml")]
    config: PathBuf,

    /// Connect with a postgresql:// URL instead of a config file
    #[arg(long)]
    url: Option<String>,
}

// Allow println in main CLI binary
#[allow(clippy::disallowed_methods)]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    let config = match &cli.url {
        Some(url) => Config::from_url(url).context("invalid database URL")?,
        None => Config::from_file(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?,
    };

    let registry = Registry::init_global(config).await;
    if let Err(e) = registry.ensure_primary().await {
        tracing::warn!(error = %e, "continuing without a primary connection");
    }

    // One registry, any number of simultaneously open connections.
    let first = registry
        .get_connection()
        .await
        .context("opening first connection")?;
    let second = registry
        .get_connection()
        .await
        .context("opening second connection")?;

    println!(
        "connection 1: {}",
        first.query_scalar("SELECT now()::text").await?
    );
    println!(
        "connection 2: {}",
        second.query_scalar("SELECT now()::text").await?
    );

    drop(first);
    drop(second);

    registry.close_primary().await;
    Ok(())
}

/// Initialize logging based on environment variables
fn init_logging() {
    // Default to INFO level, can be overridden by RUST_LOG
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dbkeeper=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}
