//! Scrypt Stratum Miner - Main Application
//!
//! Loads configuration, picks the miner for the requested currency and runs
//! it until the pool session ends.

use scrypt_stratum_miner::{
    config::Config,
    registry::{MinerContext, MinerRegistry},
    utils::format_hash_rate,
    worker::MiningStats,
    Result, APP_NAME, APP_VERSION,
};

use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load and validate configuration
    let config = Config::load().await?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let registry = MinerRegistry::new();

    // Handle special commands
    if config.list_currencies {
        print_currencies(&registry);
        return Ok(());
    }

    if config.print_config {
        print_configuration(&config)?;
        return Ok(());
    }

    let started_at = chrono::Local::now();
    let started = Instant::now();
    info!("Starting {} v{} at {}", APP_NAME, APP_VERSION, started_at.format("%Y-%m-%d %H:%M:%S"));
    info!("Starting mining for {}", config.currency.to_uppercase());

    let result = mine(&config, &registry).await;
    if let Err(e) = &result {
        error!(category = e.category(), "Mining stopped: {}", e);
    }

    let elapsed = std::time::Duration::from_secs(started.elapsed().as_secs());
    info!(
        "Finished at {} after {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        humantime::format_duration(elapsed)
    );

    result
}

/// Build the miner for the configured currency and run it
async fn mine(config: &Config, registry: &MinerRegistry) -> Result<()> {
    let pool = config.pool_config()?;
    info!("Pool: {} (worker {})", pool.address(), pool.username);

    let context = MinerContext::new(pool).with_report_interval(config.report_interval);
    let mut miner = registry.create(&config.currency, context)?;

    let (stats_tx, stats_rx) = mpsc::unbounded_channel();
    miner.attach_stats(stats_tx);
    let stats_handle = tokio::spawn(log_stats(stats_rx));

    info!("Using {} miner", miner.name());
    let result = match miner.connect().await {
        Ok(()) => miner.run().await,
        Err(e) => Err(e),
    };

    stats_handle.abort();
    result
}

/// Log search statistics as they arrive
async fn log_stats(mut stats_rx: mpsc::UnboundedReceiver<MiningStats>) {
    while let Some(stats) = stats_rx.recv().await {
        info!(
            "Job {} - Current hashrate: {}, total hashes: {}",
            stats.job_id,
            format_hash_rate(stats.current_hash_rate),
            stats.total_hashes
        );
    }
}

/// Print the supported currency symbols
fn print_currencies(registry: &MinerRegistry) {
    println!("{} v{}", APP_NAME, APP_VERSION);
    println!("Supported currencies:");
    for symbol in registry.symbols() {
        println!("  {}", symbol);
    }
}

/// Print current configuration
fn print_configuration(config: &Config) -> Result<()> {
    let config_yaml = serde_yaml::to_string(config)?;
    println!("{}", config_yaml);
    Ok(())
}
