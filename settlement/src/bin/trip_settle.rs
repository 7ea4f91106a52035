//! Trip settlement command line tool
//!
//! Usage: `trip-settle <trip.json> [config.toml]`

use anyhow::Context;
use trip_settlement::{Config, SettlementEngine, TripSnapshot};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let trip_path = args
        .next()
        .context("usage: trip-settle <trip.json> [config.toml]")?;

    // Load configuration
    let config = match args.next() {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::from_env()?,
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting trip settlement"
    );

    let content = std::fs::read_to_string(&trip_path)
        .with_context(|| format!("Failed to read trip document {}", trip_path))?;
    let trip = TripSnapshot::from_json_str(&content)?;

    let engine = SettlementEngine::new(config.report.include_transfer_plan);
    let report = engine.settle(&trip).rounded(config.report.display_dp);

    let output = if config.report.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}
