use anyhow::Result;
use std::path::PathBuf;
use clap::Parser;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use filedrop::{run_api_server, config};

/// Filedropd - receives uploads and keeps the latest one on disk.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the 'config.toml'.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    dump_version();
    init_logging();

    let config = config::load(args.config).await?;

    run_api_server(config).await?;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();
}

fn dump_version() {
    #[cfg(debug_assertions)]
    eprintln!("Filedrop {} (debug)", env!("CARGO_PKG_VERSION"));
    #[cfg(not(debug_assertions))]
    eprintln!("Filedrop {} (release)", env!("CARGO_PKG_VERSION"));
}
