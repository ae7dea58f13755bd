//! Core Data Models
//!
//! This module defines the data structures that flow through the daily usage pipeline,
//! from a raw JSONL line to the totals handed to the presentation layer.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`UsageEntry`] - One decoded JSONL line, every field optional
//! 2. **Classification**: [`UsageRecord`] - An in-window line with its [`RecordPricing`]
//!    outcome and zero-filled [`TokenUsage`]
//! 3. **Pricing**: [`ModelRate`] - Per-million-token rates resolved for a model
//! 4. **Output**: [`Totals`] - The day's accumulated spend and token counts
//!
//! ## Features
//!
//! - **Serde Integration**: Line schema and totals support (de)serialization
//! - **Optional Fields**: Missing usage fields decode as zero, unknown fields are ignored
//! - **Pure Folding**: [`Totals::add`] is purely additive, so record order never matters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One line of a Claude Code project log, as written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<MessageData>,
    #[serde(rename = "costUSD", default)]
    pub cost_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageData {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<UsageData>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageData {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub cache_creation_input_tokens: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub cache_read_input_tokens: u64,
}

/// Token fields written as `null` count as zero, same as a missing key.
fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Token counts for a single record, zero where the log omitted a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub cache_creation: u64,
    pub cache_read: u64,
}

impl From<UsageData> for TokenUsage {
    fn from(usage: UsageData) -> Self {
        Self {
            input: usage.input_tokens,
            output: usage.output_tokens,
            cache_creation: usage.cache_creation_input_tokens,
            cache_read: usage.cache_read_input_tokens,
        }
    }
}

/// How a record's cost is obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPricing {
    /// The log already carries `costUSD`; it is trusted as-is.
    Precomputed(f64),
    /// Cost must be derived from token counts at this model's rate.
    Model(String),
    /// Neither cost nor model present; only tokens are counted.
    Unpriced,
}

/// A decoded, in-window log line ready to be folded into [`Totals`].
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub pricing: RecordPricing,
    pub usage: TokenUsage,
}

/// USD per 1,000,000 tokens for each token category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRate {
    pub input: f64,
    pub output: f64,
    pub cache_create: f64,
    pub cache_read: f64,
}

impl ModelRate {
    pub const fn new(input: f64, output: f64, cache_create: f64, cache_read: f64) -> Self {
        Self {
            input,
            output,
            cache_create,
            cache_read,
        }
    }

    /// Dollar cost of `usage` at this rate.
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        (usage.input as f64 * self.input
            + usage.output as f64 * self.output
            + usage.cache_creation as f64 * self.cache_create
            + usage.cache_read as f64 * self.cache_read)
            / 1_000_000.0
    }

    /// Sum of input and output rates; used to rank tiers by expense.
    pub(crate) fn weight(&self) -> f64 {
        self.input + self.output
    }
}

/// Accumulated spend and token counts for one aggregation run.
///
/// Token counters saturate at `u64::MAX` instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub usd: f64,
    pub input: u64,
    pub output: u64,
    pub read: u64,
    pub write: u64,
    pub tokens: u64,
}

impl Totals {
    /// Fold one record's cost and tokens into the running sums.
    pub fn add(&mut self, cost: f64, usage: &TokenUsage) {
        self.usd += cost;
        self.input = self.input.saturating_add(usage.input);
        self.output = self.output.saturating_add(usage.output);
        self.read = self.read.saturating_add(usage.cache_read);
        self.write = self.write.saturating_add(usage.cache_creation);
    }

    /// Seal the run by deriving the combined token count.
    pub fn finish(mut self) -> Self {
        self.tokens = self
            .input
            .saturating_add(self.output)
            .saturating_add(self.read)
            .saturating_add(self.write);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_entry_ignores_unknown_fields() {
        let line = r#"{"timestamp":"2024-01-01T12:00:00Z","type":"assistant","message":{"id":"m","model":"claude-opus-4","usage":{"input_tokens":10,"service_tier":"standard"}}}"#;
        let entry: UsageEntry = serde_json::from_str(line).unwrap();
        let usage = entry.message.unwrap().usage.unwrap();
        assert_eq!(usage.input_tokens, 10);
        assert_eq!(usage.output_tokens, 0);
        assert!(entry.cost_usd.is_none());
    }

    #[test]
    fn test_rate_cost_per_million() {
        let rate = ModelRate::new(15.0, 75.0, 18.75, 1.5);
        let usage = TokenUsage {
            input: 1000,
            output: 500,
            ..Default::default()
        };
        assert!((rate.cost(&usage) - 0.0525).abs() < 1e-12);
    }

    #[test]
    fn test_totals_finish_derives_tokens() {
        let mut totals = Totals::default();
        totals.add(
            0.0,
            &TokenUsage {
                input: 1,
                output: 2,
                cache_creation: 3,
                cache_read: 4,
            },
        );
        let totals = totals.finish();
        assert_eq!(totals.write, 3);
        assert_eq!(totals.read, 4);
        assert_eq!(totals.tokens, 10);
        assert_eq!(totals.usd, 0.0);
    }

    #[test]
    fn test_null_token_fields_count_as_zero() {
        let line = r#"{"input_tokens":1000,"output_tokens":null,"cache_creation_input_tokens":null}"#;
        let usage: UsageData = serde_json::from_str(line).unwrap();
        assert_eq!(usage.input_tokens, 1000);
        assert_eq!(usage.output_tokens, 0);
        assert_eq!(usage.cache_creation_input_tokens, 0);
        assert_eq!(usage.cache_read_input_tokens, 0);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let huge = TokenUsage {
            input: u64::MAX - 1,
            output: u64::MAX,
            ..Default::default()
        };
        let mut totals = Totals::default();
        totals.add(0.0, &huge);
        totals.add(0.0, &huge);
        let totals = totals.finish();
        assert_eq!(totals.input, u64::MAX);
        assert_eq!(totals.output, u64::MAX);
        assert_eq!(totals.tokens, u64::MAX);
    }
}
