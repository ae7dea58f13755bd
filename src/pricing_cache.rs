//! Model rate resolution with an optional TTL-cached remote catalog.
//!
//! [`PricingResolver::resolve_rate`] never fails. With a catalog source it
//! tries, in order: exact catalog key, name variants, substring match, and
//! finally the built-in [`RateTable`] patterns. Without one, only the table is
//! used.
//!
//! Refreshes are serialized by holding the cache lock across the fetch: a
//! lookup that finds the cache due while another refresh is in flight waits
//! for that refresh and then reuses its result instead of fetching again.

use crate::litellm_pricing::{CatalogSource, PricingCatalog};
use crate::models::ModelRate;
use crate::pricing::RateTable;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_RETRY: Duration = Duration::from_secs(5 * 60);

#[derive(Default)]
struct CacheState {
    catalog: Option<Arc<PricingCatalog>>,
    /// When the next fetch may be attempted
    due_at: Option<Instant>,
    refreshed_at: Option<Instant>,
}

impl CacheState {
    fn is_due(&self, now: Instant) -> bool {
        self.due_at.map_or(true, |due| now >= due)
    }
}

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    Catalog,
    Table,
}

pub struct PricingResolver {
    table: &'static RateTable,
    source: Option<Arc<dyn CatalogSource>>,
    ttl: Duration,
    retry_after: Duration,
    state: Mutex<CacheState>,
}

impl PricingResolver {
    /// Resolve against the built-in table only.
    pub fn static_only() -> Self {
        Self {
            table: RateTable::builtin(),
            source: None,
            ttl: DEFAULT_TTL,
            retry_after: DEFAULT_RETRY,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Resolve against a remote catalog cached for `ttl`, falling back to the table.
    pub fn with_catalog(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        Self {
            source: Some(source),
            ttl,
            ..Self::static_only()
        }
    }

    /// How long to wait before retrying after a failed fetch.
    pub fn retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Build from configuration: remote catalog when enabled and compiled in.
    pub fn from_config(config: &crate::config::PricingConfig) -> Self {
        #[cfg(feature = "pricing")]
        {
            if config.remote_enabled {
                let timeout = Duration::from_secs(config.request_timeout_secs);
                match crate::litellm_pricing::HttpCatalogSource::new(&config.catalog_url, timeout) {
                    Ok(source) => {
                        return Self::with_catalog(
                            Arc::new(source),
                            Duration::from_secs(config.ttl_secs),
                        )
                        .retry_after(Duration::from_secs(config.retry_secs));
                    }
                    Err(e) => warn!(error = %e, "Remote pricing unavailable, using built-in rates"),
                }
            }
        }

        #[cfg(not(feature = "pricing"))]
        let _ = config;

        Self::static_only()
    }

    /// Rate for `model`. Never fails.
    pub async fn resolve_rate(&self, model: &str) -> ModelRate {
        self.resolve(model).await.0
    }

    /// Rate for `model` together with where it came from.
    pub async fn resolve(&self, model: &str) -> (ModelRate, RateSource) {
        if let Some(catalog) = self.current_catalog().await {
            if let Some(rate) = catalog.lookup(model) {
                return (rate, RateSource::Catalog);
            }
            debug!(model = %model, "Model not in pricing catalog, using built-in patterns");
        }
        (self.table.rate_for(model), RateSource::Table)
    }

    /// Force a fetch now, replacing the cache on success.
    ///
    /// On failure the previous catalog, if any, keeps serving lookups.
    pub async fn refresh(&self) -> Result<()> {
        let Some(source) = self.source.as_ref() else {
            return Ok(());
        };
        let mut state = self.state.lock().await;
        self.refresh_locked(source.as_ref(), &mut state).await
    }

    /// Age of the cached catalog, if one was ever loaded.
    pub async fn catalog_age(&self) -> Option<Duration> {
        let state = self.state.lock().await;
        state.refreshed_at.map(|at| at.elapsed())
    }

    async fn current_catalog(&self) -> Option<Arc<PricingCatalog>> {
        let source = self.source.as_ref()?;
        let mut state = self.state.lock().await;

        if state.is_due(Instant::now()) {
            if let Err(e) = self.refresh_locked(source.as_ref(), &mut state).await {
                if state.catalog.is_some() {
                    warn!(error = %e, "Pricing refresh failed, keeping cached catalog");
                } else {
                    warn!(error = %e, "Pricing fetch failed, using built-in rates");
                }
            }
        }

        state.catalog.clone()
    }

    async fn refresh_locked(&self, source: &dyn CatalogSource, state: &mut CacheState) -> Result<()> {
        match source.fetch().await {
            Ok(catalog) if !catalog.is_empty() => {
                let now = Instant::now();
                info!(models = catalog.model_count(), "Pricing catalog refreshed");
                state.catalog = Some(Arc::new(catalog));
                state.refreshed_at = Some(now);
                state.due_at = Some(now + self.ttl);
                Ok(())
            }
            Ok(_) => {
                state.due_at = Some(Instant::now() + self.retry_after);
                anyhow::bail!("Pricing catalog contained no usable models")
            }
            Err(e) => {
                state.due_at = Some(Instant::now() + self.retry_after);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{HAIKU_RATE, OPUS_RATE};
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSource;

    impl CatalogSource for FailingSource {
        fn fetch(&self) -> BoxFuture<'_, Result<PricingCatalog>> {
            Box::pin(async { Err::<PricingCatalog, _>(anyhow::anyhow!("offline")) })
        }
    }

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CatalogSource for CountingSource {
        fn fetch(&self) -> BoxFuture<'_, Result<PricingCatalog>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                let mut models = HashMap::new();
                models.insert("gpt-4".to_string(), ModelRate::new(30.0, 60.0, 30.0, 30.0));
                Ok::<_, anyhow::Error>(PricingCatalog::from_rates(models))
            })
        }
    }

    #[tokio::test]
    async fn test_static_only_uses_table() {
        let resolver = PricingResolver::static_only();
        assert_eq!(resolver.resolve_rate("claude-3-5-haiku-20241022").await, HAIKU_RATE);
        assert_eq!(resolver.resolve_rate("gpt-4").await, OPUS_RATE);
        assert!(resolver.refresh().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_table() {
        let resolver = PricingResolver::with_catalog(Arc::new(FailingSource), DEFAULT_TTL);
        let (rate, source) = resolver.resolve("claude-3-5-haiku-20241022").await;
        assert_eq!(rate, HAIKU_RATE);
        assert_eq!(source, RateSource::Table);
        assert!(resolver.refresh().await.is_err());
        assert!(resolver.catalog_age().await.is_none());
    }

    #[tokio::test]
    async fn test_catalog_hit_and_table_fallthrough() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let resolver = PricingResolver::with_catalog(source.clone(), DEFAULT_TTL);

        let (rate, from) = resolver.resolve("gpt-4").await;
        assert_eq!(rate.input, 30.0);
        assert_eq!(from, RateSource::Catalog);

        let (rate, from) = resolver.resolve("claude-3-5-haiku-20241022").await;
        assert_eq!(rate, HAIKU_RATE);
        assert_eq!(from, RateSource::Table);

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
