use anyhow::{Context, Result};
use backoff::prelude::*;
use backoff::{TICKER_NAME, VERSION};
use colored::Colorize;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_PULSES: u64 = 10;

/// Usage: `backoffdev [CONFIG.toml] [PULSES]`
#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging. `RUST_LOG=backoff=trace` shows every round.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // 2. Load the backoff parameters from the optional file and BACKOFF_* variables.
    let mut args = std::env::args().skip(1);
    let path = args.next().map(PathBuf::from);
    let max_pulses = match args.next() {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("'{}' is not a valid pulse count", arg))?,
        None => DEFAULT_PULSES,
    };
    let config = BackoffConfig::load(path.as_deref())?;

    // 3. Start the ticker.
    let mut ticker = Ticker::from_config(&config)?;
    info!(
        "{} v{} running: min {:?}, max {}, factor {}. Press Ctrl+C to stop.",
        TICKER_NAME.cyan(),
        VERSION,
        ticker.min_interval(),
        ticker
            .max_interval()
            .map_or_else(|| "unbounded".to_string(), |max| format!("{:?}", max)),
        ticker.factor()
    );

    // 4. Stop on Ctrl+C from a separate task.
    let stop = ticker.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received. Stopping ticker...");
            stop.stop();
        }
    });

    // 5. Log every pulse until the budget is spent or the ticker stops.
    let start = Instant::now();
    let mut last = start;
    let mut count = 0;
    while count < max_pulses {
        if ticker.recv().await.is_none() {
            break;
        }
        let now = Instant::now();
        count += 1;
        info!(
            "{} #{} after {:?} (elapsed {:?})",
            "[PULSE]".green().bold(),
            count,
            now - last,
            now - start
        );
        last = now;
    }

    ticker.shutdown().await;
    info!("{} has shut down after {} pulses.", TICKER_NAME.cyan(), count);
    Ok(())
}
