//! Claude Burn Bar Library
//!
//! Estimates what Claude Code has cost you today by reading the JSONL usage logs it
//! writes locally. Logs are discovered under the usual Claude directories, streamed
//! line by line, priced per model, and summed into a single [`Totals`] value.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Line schema, per-record classification, rates and totals
//! - [`pricing`] - Built-in glob-pattern rate table with a conservative fallback
//! - [`litellm_pricing`] - Remote LiteLLM pricing catalog and its lookup rules
//! - [`pricing_cache`] - TTL-cached resolver combining catalog and table
//! - [`file_discovery`] - Finds `*.jsonl` logs beneath the Claude roots
//! - [`parser`] - Streaming, error-tolerant line parser
//! - [`day_window`] - The local calendar day being reported
//! - [`aggregator`] - Drives the pipeline once per refresh
//! - [`display`] - Terminal and JSON rendering of totals
//! - [`config`] - Configuration with TOML file and environment support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//!
//! ## Main Entry Point
//!
//! ```rust,no_run
//! use claude_burn_bar::UsageAggregator;
//! use claude_burn_bar::config::get_config;
//!
//! # async fn example() {
//! let aggregator = UsageAggregator::from_config(get_config());
//! let totals = aggregator.compute_daily_totals().await;
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod day_window;
pub mod display;
pub mod file_discovery;
pub mod litellm_pricing;
pub mod logging;
pub mod models;
pub mod parser;
pub mod pricing;
pub mod pricing_cache;
pub mod timestamp_parser;

pub use aggregator::UsageAggregator;
pub use models::*;
