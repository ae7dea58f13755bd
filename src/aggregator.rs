//! Daily Usage Aggregation
//!
//! This module drives the whole pipeline for one refresh: it computes the day
//! window, asks [`LogDiscovery`] for log files, streams each file through the
//! [`RecordReader`], prices every record, and folds it into [`Totals`].
//!
//! ## Processing Pipeline
//!
//! 1. **Window**: "today" in host local time, fixed for the run
//! 2. **Discovery**: every `*.jsonl` beneath the configured roots
//! 3. **Parsing**: one file at a time, one line at a time
//! 4. **Pricing**: `costUSD` is trusted; otherwise the model's rate is resolved
//! 5. **Folding**: purely additive, so file and line order never matter
//!
//! ## Failure Handling
//!
//! A file that cannot be opened is logged and skipped. Bad lines are dropped by
//! the parser. [`UsageAggregator::compute_daily_totals`] always returns totals.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use claude_burn_bar::aggregator::UsageAggregator;
//! use claude_burn_bar::config::get_config;
//!
//! # async fn example() {
//! let aggregator = UsageAggregator::from_config(get_config());
//! let totals = aggregator.compute_daily_totals().await;
//! println!("${:.2} across {} tokens", totals.usd, totals.tokens);
//! # }
//! ```

use crate::config::Config;
use crate::day_window::DayWindow;
use crate::file_discovery::LogDiscovery;
use crate::logging::run_span;
use crate::models::*;
use crate::parser::{ParseStats, RecordReader};
use crate::pricing_cache::PricingResolver;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

pub struct UsageAggregator {
    discovery: LogDiscovery,
    resolver: Arc<PricingResolver>,
}

impl UsageAggregator {
    pub fn new(discovery: LogDiscovery, resolver: Arc<PricingResolver>) -> Self {
        Self {
            discovery,
            resolver,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            LogDiscovery::from_config(&config.paths),
            Arc::new(PricingResolver::from_config(&config.pricing)),
        )
    }

    pub fn resolver(&self) -> &Arc<PricingResolver> {
        &self.resolver
    }

    /// Totals for the host's current local day.
    pub async fn compute_daily_totals(&self) -> Totals {
        self.compute_totals(DayWindow::today()).await
    }

    /// Totals for every record inside `window`.
    pub async fn compute_totals(&self, window: DayWindow) -> Totals {
        async {
            let files = self.discovery.discover_log_files();
            debug!(files = files.len(), date = %window.date, "Aggregating usage");

            let mut totals = Totals::default();
            let mut skipped = 0usize;
            for file in &files {
                if let Err(e) = self.fold_file(file, window, &mut totals).await {
                    skipped += 1;
                    warn!(file = %file.display(), error = %e, "Skipping unreadable log file");
                }
            }

            let totals = totals.finish();
            info!(
                files = files.len(),
                skipped,
                usd = totals.usd,
                tokens = totals.tokens,
                "Aggregation finished"
            );
            totals
        }
        .instrument(run_span())
        .await
    }

    /// Stream one file into `totals`. Only a failure to open the file is an error.
    pub async fn fold_file(
        &self,
        path: &Path,
        window: DayWindow,
        totals: &mut Totals,
    ) -> Result<ParseStats> {
        let mut reader = RecordReader::open(path, window).await?;
        while let Some(record) = reader.next_record().await {
            let cost = self.record_cost(&record).await;
            totals.add(cost, &record.usage);
        }
        Ok(reader.stats())
    }

    /// Dollar cost of one record.
    pub async fn record_cost(&self, record: &UsageRecord) -> f64 {
        match &record.pricing {
            RecordPricing::Precomputed(cost) => *cost,
            RecordPricing::Model(model) => {
                self.resolver.resolve_rate(model).await.cost(&record.usage)
            }
            RecordPricing::Unpriced => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn aggregator() -> UsageAggregator {
        UsageAggregator::new(
            LogDiscovery::with_claude_roots(Vec::new()),
            Arc::new(PricingResolver::static_only()),
        )
    }

    fn record(pricing: RecordPricing, usage: TokenUsage) -> UsageRecord {
        UsageRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            pricing,
            usage,
        }
    }

    #[tokio::test]
    async fn test_record_cost_branches() {
        let agg = aggregator();
        let usage = TokenUsage {
            input: 1_000_000,
            ..Default::default()
        };

        let precomputed = record(RecordPricing::Precomputed(0.5), usage);
        assert_eq!(agg.record_cost(&precomputed).await, 0.5);

        let haiku = record(RecordPricing::Model("claude-3-5-haiku".to_string()), usage);
        assert!((agg.record_cost(&haiku).await - 0.25).abs() < 1e-12);

        let unpriced = record(RecordPricing::Unpriced, usage);
        assert_eq!(agg.record_cost(&unpriced).await, 0.0);
    }

    #[tokio::test]
    async fn test_no_roots_yields_zero_totals() {
        let totals = aggregator().compute_daily_totals().await;
        assert_eq!(totals, Totals::default());
    }
}
