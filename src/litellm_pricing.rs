//! LiteLLM pricing catalog
//!
//! This module fetches model pricing data from LiteLLM's published JSON document
//! and answers per-model rate lookups against it. The catalog maps model names to
//! per-token USD costs; rates are converted to the per-million unit used by
//! [`ModelRate`] when the catalog is built.

use crate::models::ModelRate;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

const PER_MILLION: f64 = 1_000_000.0;

/// Where a [`PricingCatalog`] comes from.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<PricingCatalog>>;
}

#[derive(Debug, Clone, Default)]
pub struct PricingCatalog {
    models: HashMap<String, ModelRate>,
    /// (lowercased name, original name), longest first
    search_order: Vec<(String, String)>,
}

impl PricingCatalog {
    pub fn from_rates(models: HashMap<String, ModelRate>) -> Self {
        let mut search_order: Vec<(String, String)> = models
            .keys()
            .map(|name| (name.to_lowercase(), name.clone()))
            .collect();
        search_order.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self {
            models,
            search_order,
        }
    }

    /// Build from the LiteLLM document: `{ "<model>": { "input_cost_per_token": ..., ... } }`.
    ///
    /// Entries without an input or output cost are skipped; missing cache costs
    /// fall back to the entry's input cost.
    pub fn from_json_value(document: &Value) -> Result<Self> {
        let entries = document
            .as_object()
            .context("Pricing catalog is not a JSON object")?;

        let mut models = HashMap::with_capacity(entries.len());
        for (model_name, pricing) in entries {
            let cost = |field: &str| pricing.get(field).and_then(Value::as_f64);

            let input = cost("input_cost_per_token");
            let output = cost("output_cost_per_token");
            if input.is_none() && output.is_none() {
                continue;
            }

            let input = input.unwrap_or(0.0);
            let rate = ModelRate::new(
                input * PER_MILLION,
                output.unwrap_or(0.0) * PER_MILLION,
                cost("cache_creation_input_token_cost").unwrap_or(input) * PER_MILLION,
                cost("cache_read_input_token_cost").unwrap_or(input) * PER_MILLION,
            );
            models.insert(model_name.clone(), rate);
        }

        Ok(Self::from_rates(models))
    }

    pub fn from_json_str(document: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(document).context("Failed to parse pricing data JSON")?;
        Self::from_json_value(&value)
    }

    /// Look up a model: exact name, then name variants, then a case-insensitive
    /// substring match in either direction.
    pub fn lookup(&self, model_name: &str) -> Option<ModelRate> {
        if let Some(rate) = self.models.get(model_name) {
            return Some(*rate);
        }

        for variant in name_variants(model_name) {
            if let Some(rate) = self.models.get(&variant) {
                debug!(model = %model_name, matched = %variant, "Pricing matched name variant");
                return Some(*rate);
            }
        }

        let needle = model_name.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.search_order
            .iter()
            .find(|(key, _)| key.contains(&needle) || needle.contains(key.as_str()))
            .and_then(|(_, original)| {
                debug!(model = %model_name, matched = %original, "Pricing matched by substring");
                self.models.get(original).copied()
            })
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Alternate spellings tried in order after an exact miss.
fn name_variants(model_name: &str) -> Vec<String> {
    let mut variants = Vec::new();

    if let Some(stripped) = model_name.strip_prefix("anthropic/") {
        variants.push(stripped.to_string());
    } else if let Some(stripped) = model_name.strip_prefix("anthropic.") {
        variants.push(stripped.to_string());
    } else {
        variants.push(format!("anthropic/{}", model_name));
    }

    let bare = variants
        .first()
        .filter(|_| model_name.starts_with("anthropic"))
        .cloned()
        .unwrap_or_else(|| model_name.to_string());
    if !bare.starts_with("claude-") {
        variants.push(format!("claude-{}", bare));
    }

    variants
}

/// Fetches the catalog over HTTPS.
#[cfg(feature = "pricing")]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "pricing")]
impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn fetch_catalog(&self) -> Result<PricingCatalog> {
        info!(url = %self.url, "Fetching model pricing from LiteLLM");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to fetch pricing data from LiteLLM")?
            .error_for_status()
            .context("LiteLLM pricing endpoint returned an error status")?;

        let document: Value = response
            .json()
            .await
            .context("Failed to parse pricing data JSON")?;

        let catalog = PricingCatalog::from_json_value(&document)?;
        info!(models = catalog.model_count(), "Fetched model pricing");
        Ok(catalog)
    }
}

#[cfg(feature = "pricing")]
impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> BoxFuture<'_, Result<PricingCatalog>> {
        Box::pin(self.fetch_catalog())
    }
}
