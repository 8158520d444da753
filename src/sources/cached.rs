use async_trait::async_trait;
use chrono::Duration;
use tracing::debug;

use crate::config::SourceSettings;
use crate::models::{CacheKey, Chain, Clock, RequestThrottle, ResponseCache, Result};
use crate::sources::{PortfolioSource, RawPortfolioData};

/// Wraps a source with a TTL response cache and a minimum spacing between
/// upstream requests. Failed fetches are never cached.
pub struct CachedSource<S, C: Clock> {
    inner: S,
    cache: ResponseCache<RawPortfolioData, C>,
    throttle: RequestThrottle,
}

impl<S: PortfolioSource, C: Clock> CachedSource<S, C> {
    pub fn new(inner: S, clock: C, ttl: Duration, max_entries: usize, min_interval: Duration) -> Self {
        Self {
            inner,
            cache: ResponseCache::new(clock, ttl, max_entries),
            throttle: RequestThrottle::new(min_interval),
        }
    }

    pub fn from_settings(inner: S, clock: C, settings: &SourceSettings) -> Self {
        Self::new(
            inner,
            clock,
            Duration::seconds(settings.cache_ttl_seconds as i64),
            settings.max_cache_entries,
            Duration::milliseconds(settings.min_request_interval_ms as i64),
        )
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<S: PortfolioSource, C: Clock> PortfolioSource for CachedSource<S, C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(&self, address: &str, chain: Chain) -> Result<RawPortfolioData> {
        let key = CacheKey::portfolio(chain.chain_id(), address);
        if let Some(hit) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        let wait = self.throttle.reserve(self.cache.clock().now());
        if let Ok(wait) = wait.to_std() {
            if !wait.is_zero() {
                debug!("Throttling {} request for {:?}", self.inner.name(), wait);
                tokio::time::sleep(wait).await;
            }
        }

        let data = self.inner.fetch(address, chain).await?;
        self.cache.insert(key, data.clone());
        Ok(data)
    }
}
