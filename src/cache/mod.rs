//! Time-bounded result cache.
//!
//! A concurrent map of composed results with a fixed time-to-live. Expired
//! entries are evicted lazily when they are next read; there is no background
//! sweep, so keys that are never read again stay until [`ResultCache::clear`].

use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Thread-safe TTL cache.
///
/// # Examples
///
/// ```
/// use ipinfo::ResultCache;
/// use std::time::Duration;
///
/// let cache: ResultCache<u32, String> = ResultCache::new(Duration::from_secs(600));
/// cache.set(15169, "Google LLC".to_string());
/// assert_eq!(cache.get(&15169).as_deref(), Some("Google LLC"));
/// ```
pub struct ResultCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `value`, replacing any previous entry and restarting its lifetime.
    pub fn set(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Returns the cached value if it is younger than the TTL.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            // A concurrent set may have refreshed the entry since the read
            self.entries.remove_if(key, |_, entry| {
                now.saturating_duration_since(entry.stored_at) >= self.ttl
            });
        }
        None
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<K, V> std::fmt::Debug for ResultCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
