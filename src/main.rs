use anyhow::Result;
use chrono::Local;
use claude_burn_bar::config::get_config;
use claude_burn_bar::display::DisplayManager;
use claude_burn_bar::logging::init_logging;
use claude_burn_bar::{Totals, UsageAggregator};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "claude-burn-bar")]
#[command(about = "Today's Claude Code spend, estimated from local usage logs")]
#[command(version)]
struct Cli {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
    /// Keep running and refresh on an interval
    #[arg(long)]
    watch: bool,
    /// Refresh interval in seconds for --watch (default from config)
    #[arg(long)]
    interval: Option<u64>,
    /// Use only the built-in pricing table
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = get_config().clone();
    if cli.offline {
        config.pricing.remote_enabled = false;
    }
    let _guard = init_logging(&config.logging);

    let aggregator = Arc::new(UsageAggregator::from_config(&config));
    let display = DisplayManager::new();

    if !cli.watch {
        let (totals, degraded) = refresh(&aggregator, Totals::default()).await;
        display.display_totals(&totals, cli.json, degraded, seed());
        return Ok(());
    }

    let period = Duration::from_secs(cli.interval.unwrap_or(config.refresh.interval_secs).max(1));
    info!(interval_secs = period.as_secs(), "Starting refresh loop");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last = Totals::default();
    loop {
        ticker.tick().await;
        let (totals, degraded) = refresh(&aggregator, last).await;
        if let Some(age) = aggregator.resolver().catalog_age().await {
            debug!(catalog_age_secs = age.as_secs(), "Pricing catalog in use");
        }
        display.display_totals(&totals, cli.json, degraded, seed());
        if !cli.json {
            println!();
        }
        last = totals;
    }
}

/// Run one aggregation in its own task so an unexpected panic leaves the host
/// running with the previous totals and a degraded marker.
async fn refresh(aggregator: &Arc<UsageAggregator>, previous: Totals) -> (Totals, bool) {
    let aggregator = Arc::clone(aggregator);
    match tokio::spawn(async move { aggregator.compute_daily_totals().await }).await {
        Ok(totals) => (totals, false),
        Err(e) => {
            error!(error = %e, "Aggregation run failed");
            (previous, true)
        }
    }
}

fn seed() -> usize {
    Local::now().timestamp().unsigned_abs() as usize
}
