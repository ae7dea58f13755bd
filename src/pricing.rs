//! Built-in model rates keyed by glob-style model name patterns.
//!
//! Patterns are compiled once into unanchored regexes (`*` matches any run of
//! characters) and tried in declaration order; the first hit wins. Names that
//! match nothing are priced at the most expensive tier, so an unknown model
//! overstates rather than understates spend.

use crate::models::ModelRate;
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// USD per 1M tokens
pub const OPUS_RATE: ModelRate = ModelRate::new(15.0, 75.0, 18.75, 1.5);
pub const SONNET_RATE: ModelRate = ModelRate::new(3.0, 15.0, 3.75, 0.3);
pub const HAIKU_RATE: ModelRate = ModelRate::new(0.25, 1.25, 0.31, 0.025);

const BUILTIN_PATTERNS: &[(&str, ModelRate)] = &[
    ("*opus*4*", OPUS_RATE),
    ("*sonnet*3*", SONNET_RATE),
    ("*haiku*", HAIKU_RATE),
];

struct RatePattern {
    glob: String,
    matcher: Regex,
    rate: ModelRate,
}

/// Ordered list of compiled model-name matchers.
pub struct RateTable {
    patterns: Vec<RatePattern>,
    fallback: ModelRate,
}

impl RateTable {
    /// Compile `(glob, rate)` pairs in order. The fallback is the priciest rate.
    pub fn new<S: AsRef<str>>(entries: &[(S, ModelRate)]) -> Result<Self> {
        if entries.is_empty() {
            anyhow::bail!("Rate table needs at least one pattern");
        }

        let mut patterns = Vec::with_capacity(entries.len());
        for (glob, rate) in entries {
            let glob = glob.as_ref();
            let matcher = glob_to_regex(glob)
                .with_context(|| format!("Invalid model pattern: {}", glob))?;
            patterns.push(RatePattern {
                glob: glob.to_string(),
                matcher,
                rate: *rate,
            });
        }

        let fallback = patterns
            .iter()
            .map(|p| p.rate)
            .fold(patterns[0].rate, |best, rate| {
                if rate.weight() > best.weight() {
                    rate
                } else {
                    best
                }
            });

        Ok(Self { patterns, fallback })
    }

    /// The built-in opus / sonnet / haiku table, compiled on first use.
    pub fn builtin() -> &'static RateTable {
        static TABLE: OnceLock<RateTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            RateTable::new(BUILTIN_PATTERNS).unwrap_or_else(|e| {
                warn!(error = %e, "Built-in rate patterns failed to compile");
                RateTable {
                    patterns: Vec::new(),
                    fallback: OPUS_RATE,
                }
            })
        })
    }

    /// Rate for `model`, never failing.
    pub fn rate_for(&self, model: &str) -> ModelRate {
        self.matching_pattern(model)
            .map(|p| p.rate)
            .unwrap_or_else(|| {
                debug!(model = %model, "No rate pattern matched, using fallback tier");
                self.fallback
            })
    }

    /// The glob that `model` matches, if any.
    pub fn matched_glob(&self, model: &str) -> Option<&str> {
        self.matching_pattern(model).map(|p| p.glob.as_str())
    }

    pub fn fallback(&self) -> ModelRate {
        self.fallback
    }

    fn matching_pattern(&self, model: &str) -> Option<&RatePattern> {
        self.patterns.iter().find(|p| p.matcher.is_match(model))
    }
}

fn glob_regex_source(glob: &str) -> String {
    glob.split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

fn glob_to_regex(glob: &str) -> Result<Regex> {
    Ok(Regex::new(&glob_regex_source(glob))?)
}
