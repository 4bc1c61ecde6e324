//! Response cache wrapped around any fetcher

use crate::fetcher::{CandleFetcher, FetchResult};
use candle_charts_shared::{Candle, DisplayRange, Interval};
use futures::future::BoxFuture;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Key for one cached response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Window {
        symbol: String,
        period1: i64,
        period2: i64,
        interval: Interval,
    },
    Range {
        symbol: String,
        range: DisplayRange,
    },
}

struct CacheEntry {
    candles: Vec<Candle>,
    stored_at: Instant,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// LRU cache with a time-to-live in front of a [`CandleFetcher`].
///
/// Only non-empty successful responses are stored, so failures and
/// exhausted windows are always retried against the inner fetcher.
pub struct CachedFetcher<F> {
    inner: F,
    cache: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
    stats: Mutex<CacheStats>,
}

impl<F: CandleFetcher> CachedFetcher<F> {
    pub fn new(inner: F, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = *self.stats.lock();
        stats.entries = self.cache.lock().len();
        stats
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    fn lookup(&self, key: &CacheKey) -> Option<Vec<Candle>> {
        let mut cache = self.cache.lock();
        let hit = match cache.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.candles.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        };
        drop(cache);

        let mut stats = self.stats.lock();
        if hit.is_some() {
            stats.hits += 1;
            log::debug!("cache hit for {key:?}");
        } else {
            stats.misses += 1;
            log::debug!("cache miss for {key:?}");
        }
        hit
    }

    fn store(&self, key: CacheKey, candles: &[Candle]) {
        if candles.is_empty() {
            return;
        }
        self.cache.lock().put(
            key,
            CacheEntry {
                candles: candles.to_vec(),
                stored_at: Instant::now(),
            },
        );
    }

    async fn cached(
        &self,
        key: CacheKey,
        fetch: BoxFuture<'_, FetchResult<Vec<Candle>>>,
    ) -> FetchResult<Vec<Candle>> {
        if let Some(candles) = self.lookup(&key) {
            return Ok(candles);
        }
        let candles = fetch.await?;
        self.store(key, &candles);
        Ok(candles)
    }
}

impl<F: CandleFetcher> CandleFetcher for CachedFetcher<F> {
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        period1: i64,
        period2: i64,
        interval: Interval,
    ) -> BoxFuture<'a, FetchResult<Vec<Candle>>> {
        let key = CacheKey::Window {
            symbol: symbol.to_string(),
            period1,
            period2,
            interval,
        };
        Box::pin(self.cached(key, self.inner.fetch_candles(symbol, period1, period2, interval)))
    }

    fn fetch_candles_by_range<'a>(
        &'a self,
        symbol: &'a str,
        range: DisplayRange,
    ) -> BoxFuture<'a, FetchResult<Vec<Candle>>> {
        let key = CacheKey::Range {
            symbol: symbol.to_string(),
            range,
        };
        Box::pin(self.cached(key, self.inner.fetch_candles_by_range(symbol, range)))
    }
}
