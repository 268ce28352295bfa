//! Series cache for fetched market data.
//!
//! Provides in-memory caching with TTL, keyed by (ticker, lookback, interval),
//! to keep repeated runs from hammering the data provider. Time is injected
//! through the `Clock` trait so expiry is testable without sleeping.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::provider::{DataProvider, ProviderError};
use super::{Interval, PriceSeries};

// ============================================================================
// Clock
// ============================================================================

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================================================
// Series Cache
// ============================================================================

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry {
    series: PriceSeries,
    expires_at: DateTime<Utc>,
}

/// Market data series cache.
pub struct SeriesCache {
    /// Entries keyed by "ticker:lookback:interval"
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Entry TTL in seconds
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl SeriesCache {
    /// Create a cache with the given TTL, using the wall clock.
    pub fn new(ttl_secs: i64) -> Self {
        Self::with_clock(ttl_secs, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source.
    pub fn with_clock(ttl_secs: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_secs,
            clock,
        }
    }

    fn key(ticker: &str, lookback_days: u32, interval: Interval) -> String {
        format!("{}:{}:{}", ticker, lookback_days, interval)
    }

    /// Get a cached series if present and not expired.
    pub fn get(&self, ticker: &str, lookback_days: u32, interval: Interval) -> Option<PriceSeries> {
        let key = Self::key(ticker, lookback_days, interval);
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;

        entries.get(&key).and_then(|entry| {
            if now > entry.expires_at {
                None
            } else {
                Some(entry.series.clone())
            }
        })
    }

    /// Insert a series.
    pub fn set(&self, ticker: &str, lookback_days: u32, interval: Interval, series: PriceSeries) {
        let key = Self::key(ticker, lookback_days, interval);
        let entry = CacheEntry {
            series,
            expires_at: self.clock.now() + Duration::seconds(self.ttl_secs),
        };

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, entry);
        }
    }

    /// Drop all expired entries.
    pub fn clear_expired(&self) {
        let now = self.clock.now();
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| now <= entry.expires_at);
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read().ok();
        let (total, expired) = entries
            .map(|e| {
                let total = e.len();
                let expired = e.values().filter(|c| now > c.expires_at).count();
                (total, expired)
            })
            .unwrap_or((0, 0));

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

// ============================================================================
// Caching Provider
// ============================================================================

/// Provider wrapper that consults a [`SeriesCache`] before the inner source.
pub struct CachedProvider<P> {
    inner: P,
    cache: SeriesCache,
}

impl<P: DataProvider> CachedProvider<P> {
    /// Wrap a provider with a cache of the given TTL.
    pub fn new(inner: P, ttl_secs: i64) -> Self {
        Self {
            inner,
            cache: SeriesCache::new(ttl_secs),
        }
    }

    /// Wrap with an explicit cache (used to inject a test clock).
    pub fn with_cache(inner: P, cache: SeriesCache) -> Self {
        Self { inner, cache }
    }

    /// Access the underlying cache.
    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }
}

#[async_trait]
impl<P: DataProvider> DataProvider for CachedProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch_ohlcv(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<PriceSeries, ProviderError> {
        if let Some(series) = self.cache.get(ticker, lookback_days, interval) {
            debug!(ticker, "Cache hit");
            return Ok(series);
        }

        let series = self.inner.fetch_ohlcv(ticker, lookback_days, interval).await?;
        self.cache.set(ticker, lookback_days, interval, series.clone());
        Ok(series)
    }
}

// ============================================================================
// Tests
// ============================================================================
