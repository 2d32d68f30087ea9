//! Satellite visibility dashboard client - Entry Point

use anyhow::Result;
use clap::{Parser, Subcommand};
use satvis_app::{AppConfig, Application};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Satellite visibility dashboard client
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SATVIS_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the backend base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Poll the backend until Ctrl-C (default)
    Watch,
    /// Refresh once and print the dashboard summary
    Refresh,
    /// Probe every endpoint and print the health report
    Health,
    /// Generate test data on the backend, then refresh
    Generate,
    /// Print collected Prometheus metrics after a refresh
    Metrics,
    /// Refresh, then write the cache to a JSON file
    Export {
        /// Output file (default: satellite_data_<YYYY-MM-DD>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    satvis_telemetry::init_logging()?;

    info!("Starting satvis v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(args.config)?;
    if let Some(base_url) = args.base_url {
        config.transport.base_url = base_url;
    }
    info!(
        base_url = %config.transport.base_url,
        interval_ms = config.refresh.interval_ms,
        "Configuration loaded"
    );

    let app = Application::new(config)?;

    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => app.run().await?,
        Command::Refresh => print_json(&app.refresh_once().await?)?,
        Command::Health => print_json(&app.health().await)?,
        Command::Generate => print_json(&app.generate().await?)?,
        Command::Metrics => {
            if let Err(e) = app.refresh_once().await {
                warn!(error = %e, "Refresh before metrics dump failed");
            }
            print!("{}", satvis_telemetry::Metrics::render()?);
        }
        Command::Export { output } => {
            let path = app.export(output).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
