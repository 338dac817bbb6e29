//! TTL + LRU result cache.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aerolab_core::SolverResult;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::key::CacheKey;
use crate::stats::{AtomicCacheStats, CacheStats};

/// Default time-to-live of an entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 256;

/// Cache sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Maximum number of entries kept.
    pub capacity: usize,
    /// Age after which an entry is no longer served.
    pub ttl: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

struct Entry {
    value: Arc<SolverResult>,
    inserted_at: Instant,
}

/// Shared cache of solver results. All methods take `&self`.
pub struct ResultCache {
    entries: Mutex<LruCache<CacheKey, Entry>>,
    ttl: Duration,
    stats: AtomicCacheStats,
}

impl ResultCache {
    /// Create a cache. A zero capacity falls back to the default.
    #[must_use]
    pub fn new(options: CacheOptions) -> Self {
        let capacity = NonZeroUsize::new(options.capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: options.ttl,
            stats: AtomicCacheStats::new(),
        }
    }

    /// Look up a result.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SolverResult>> {
        self.get_at(key, Instant::now())
    }

    /// Look up a result as of `now`. Expired entries are removed.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Arc<SolverResult>> {
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.inserted_at) < self.ttl => {
                self.stats.record_hit();
                debug!(?key, "Cache hit");
                return Some(Arc::clone(&entry.value));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            self.stats.record_expirations(1);
        }
        self.stats.record_miss();
        debug!(?key, expired, "Cache miss");
        None
    }

    /// Store a result, replacing any previous entry for the key.
    pub fn insert(&self, key: CacheKey, value: Arc<SolverResult>) {
        self.insert_at(key, value, Instant::now());
    }

    /// Store a result as of `now`.
    ///
    /// A full cache first drops expired entries, so live entries are only
    /// evicted when nothing stale is left.
    pub fn insert_at(&self, key: CacheKey, value: Arc<SolverResult>, now: Instant) {
        let entry = Entry {
            value,
            inserted_at: now,
        };
        let mut entries = self.entries.lock();
        if entries.len() >= entries.cap().get() && !entries.contains(&key) {
            self.purge_locked(&mut entries, now);
        }
        let displaced = entries.push(key, entry);
        drop(entries);
        self.stats.record_insertion();

        if let Some((old_key, _)) = displaced {
            if old_key != key {
                self.stats.record_eviction();
                debug!(evicted = ?old_key, "Cache capacity reached, evicted LRU entry");
            }
        }
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Drop every entry expired as of `now`.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        self.purge_locked(&mut self.entries.lock(), now)
    }

    fn purge_locked(&self, entries: &mut LruCache<CacheKey, Entry>, now: Instant) -> usize {
        let stale: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, e)| now.saturating_duration_since(e.inserted_at) >= self.ttl)
            .map(|(k, _)| *k)
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        self.stats.record_expirations(stale.len() as u64);
        stale.len()
    }

    /// Number of entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Entry time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a snapshot of cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}
