use crate::types::{EngineEvaluation, TablebaseEvaluation, TopMoves};
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Time source for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.origin + offset
    }
}

/// Thread-safe LRU cache with time-based expiration
pub struct TimedLruCache<K: Hash + Eq, V> {
    cache: Mutex<LruCache<K, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

/// Cache entry with timestamp for TTL support
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    timestamp: Instant,
}

impl<K, V> TimedLruCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create a new timed LRU cache
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let non_zero_capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(non_zero_capacity)),
            ttl,
            clock,
        }
    }

    /// Insert a value into the cache
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            timestamp: self.clock.now(),
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, entry);
        }
    }

    /// Get a value from the cache
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(entry) = cache.get(key) {
                if now.duration_since(entry.timestamp) < self.ttl {
                    return Some(entry.value.clone());
                }
                cache.pop(key);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Get cache statistics (hit ratio is filled in by the owner)
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        if let Ok(cache) = self.cache.lock() {
            let expired_count = cache
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.timestamp) >= self.ttl)
                .count();

            CacheStats {
                capacity: cache.cap().get(),
                size: cache.len(),
                expired_count,
                hit_ratio: 0.0,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// FEN-keyed memoization of provider answers.
///
/// Tablebase entries store `None` for "position not covered", so a known
/// miss is served from cache just like a hit. Provider errors are never
/// stored.
pub struct EvaluationCache {
    engine: TimedLruCache<String, EngineEvaluation>,
    tablebase: TimedLruCache<String, Option<TablebaseEvaluation>>,
    top_moves: TimedLruCache<(String, usize), TopMoves>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl EvaluationCache {
    /// Create a new evaluation cache on the wall clock
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine: TimedLruCache::new(capacity, ttl, Arc::clone(&clock)),
            tablebase: TimedLruCache::new(capacity, ttl, Arc::clone(&clock)),
            top_moves: TimedLruCache::new(capacity, ttl, clock),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    pub fn get_engine(&self, fen: &str) -> Option<EngineEvaluation> {
        self.record(self.engine.get(&fen.to_string()))
    }

    pub fn store_engine(&self, fen: &str, evaluation: EngineEvaluation) {
        self.engine.insert(fen.to_string(), evaluation);
    }

    /// `Some(None)` is a cached "not covered"
    pub fn get_tablebase(&self, fen: &str) -> Option<Option<TablebaseEvaluation>> {
        self.record(self.tablebase.get(&fen.to_string()))
    }

    pub fn store_tablebase(&self, fen: &str, result: Option<TablebaseEvaluation>) {
        self.tablebase.insert(fen.to_string(), result);
    }

    pub fn get_top_moves(&self, fen: &str, n: usize) -> Option<TopMoves> {
        self.record(self.top_moves.get(&(fen.to_string(), n)))
    }

    pub fn store_top_moves(&self, fen: &str, n: usize, moves: TopMoves) {
        self.top_moves.insert((fen.to_string(), n), moves);
    }

    fn record<V>(&self, lookup: Option<V>) -> Option<V> {
        let counter = if lookup.is_some() {
            &self.hit_count
        } else {
            &self.miss_count
        };
        counter.fetch_add(1, Ordering::Relaxed);
        lookup
    }

    /// Combined statistics with hit ratio
    pub fn stats(&self) -> CacheStats {
        let parts = [self.engine.stats(), self.tablebase.stats(), self.top_moves.stats()];

        let hits = self.hit_count.load(Ordering::Relaxed);
        let misses = self.miss_count.load(Ordering::Relaxed);

        CacheStats {
            capacity: parts.iter().map(|s| s.capacity).sum(),
            size: parts.iter().map(|s| s.size).sum(),
            expired_count: parts.iter().map(|s| s.expired_count).sum(),
            hit_ratio: if hits + misses > 0 {
                hits as f64 / (hits + misses) as f64
            } else {
                0.0
            },
        }
    }

    /// Clear cache and reset statistics
    pub fn clear(&self) {
        self.engine.clear();
        self.tablebase.clear();
        self.top_moves.clear();
        self.hit_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub capacity: usize,
    pub size: usize,
    pub expired_count: usize,
    pub hit_ratio: f64,
}
