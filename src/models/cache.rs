use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Source of "now" for cache expiry and request throttling.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.write() {
            *now += by;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.write() {
            *now = to;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.read().map(|n| *n).unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= self.ttl
    }
}

/// In-memory response cache keyed by request, expiring entries after a fixed TTL.
pub struct ResponseCache<T, C: Clock> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    clock: C,
    ttl: Duration,
    max_entries: usize,
}

impl<T: Clone, C: Clock> ResponseCache<T, C> {
    pub fn new(clock: C, ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            ttl,
            max_entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let cache = self.entries.read().ok()?;
        let entry = cache.get(key)?;

        if entry.is_expired(self.clock.now()) {
            return None;
        }

        Some(entry.value.clone())
    }

    pub fn insert(&self, key: String, value: T) {
        let now = self.clock.now();
        if let Ok(mut cache) = self.entries.write() {
            if cache.len() >= self.max_entries && !cache.contains_key(&key) {
                cache.retain(|_, entry| !entry.is_expired(now));
                // Still full: evict the oldest entry.
                if cache.len() >= self.max_entries {
                    let oldest = cache
                        .iter()
                        .min_by_key(|(_, entry)| entry.created_at)
                        .map(|(k, _)| k.clone());
                    if let Some(oldest) = oldest {
                        cache.remove(&oldest);
                    }
                }
            }
            cache.insert(key, CacheEntry::new(value, now, self.ttl));
        }
    }

    pub fn cleanup_expired(&self) {
        let now = self.clock.now();
        if let Ok(mut cache) = self.entries.write() {
            cache.retain(|_, entry| !entry.is_expired(now));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.clear();
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Enforces a minimum interval between upstream requests.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: RwLock<Option<DateTime<Utc>>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: RwLock::new(None),
        }
    }

    /// Reserves the next request slot and returns how long the caller must
    /// wait before sending it.
    pub fn reserve(&self, now: DateTime<Utc>) -> Duration {
        let Ok(mut last) = self.last_request.write() else {
            return Duration::zero();
        };

        let slot = match *last {
            Some(previous) => (previous + self.min_interval).max(now),
            None => now,
        };
        *last = Some(slot);

        slot - now
    }
}

/// Cache key builder for consistent key generation
pub struct CacheKey;

impl CacheKey {
    pub fn portfolio(chain_id: u64, address: &str) -> String {
        format!("portfolio:{}:{}", chain_id, address.to_lowercase())
    }
}
