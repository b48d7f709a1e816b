//! Concurrent LRU Cache
//!
//! [`ConcurrentLruCache`] shares one [`LruCache`] between threads behind a
//! single `parking_lot::RwLock`. The hash index and the recency list are
//! guarded together, so LRU ordering is global and eviction order is exact.
//!
//! # Locking
//!
//! | Operation | Lock |
//! |-----------|------|
//! | `peek`, `peek_with`, `contains`, `get_oldest`, `keys`, `len`, `is_empty`, `cap`, `metrics` | shared |
//! | `add`, `get`, `get_with`, `remove`, `purge`, `resize` | exclusive |
//!
//! `get` takes the exclusive lock because it moves the entry to the front of
//! the recency list. Readers that must not reorder (`peek`, `contains`, ...)
//! may run in parallel with each other.
//!
//! # Eviction Callback
//!
//! The callback runs synchronously while the exclusive lock is held. It must
//! not call back into the same cache: `parking_lot` locks are not reentrant,
//! so doing so deadlocks. The lock is released on every exit path, including
//! a callback panic, and it is never poisoned.
//!
//! # Example
//!
//! ```rust
//! use simplelru::ConcurrentLruCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentLruCache::new(1000).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..1000 {
//!                 let key = format!("key_{}_{}", t, i);
//!                 cache.add(key.clone(), i);
//!                 let _ = cache.get(&key);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(cache.len(), 1000);
//! ```

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::error::Result;
use crate::lru::{EvictCallback, LruCache};
use crate::metrics::{CacheMetrics, LruCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::RwLock;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe LRU cache.
///
/// All methods take `&self`; share the cache through an `Arc`. Values are
/// returned as clones so no reference into the cache outlives the lock. Use
/// [`get_with`](Self::get_with) or [`peek_with`](Self::peek_with) to read a
/// value in place instead.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq`; `Clone` for `add` and `keys`.
/// - `V`: Value type. `Clone` for the methods returning values.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
pub struct ConcurrentLruCache<K, V, S = DefaultHashBuilder> {
    inner: RwLock<LruCache<K, V, S>>,
}

impl<K: Hash + Eq, V> ConcurrentLruCache<K, V, DefaultHashBuilder> {
    /// Creates a cache holding at most `capacity` entries, without an
    /// eviction callback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::init(LruCacheConfig::new(capacity), None)
    }

    /// Creates a cache from a configuration and an optional eviction callback.
    ///
    /// # Example
    ///
    /// ```rust
    /// use simplelru::config::LruCacheConfig;
    /// use simplelru::{ConcurrentLruCache, EvictCallback};
    ///
    /// let on_evict: EvictCallback<String, Vec<u8>> = Box::new(|key: String, value: Vec<u8>| {
    ///     println!("dropping {} ({} bytes)", key, value.len());
    /// });
    /// let cache = ConcurrentLruCache::init(LruCacheConfig { capacity: 128 }, Some(on_evict))
    ///     .unwrap();
    /// assert_eq!(cache.cap().get(), 128);
    /// ```
    pub fn init(config: LruCacheConfig, on_evict: Option<EvictCallback<K, V>>) -> Result<Self> {
        Ok(Self {
            inner: RwLock::new(LruCache::init(config, on_evict)?),
        })
    }
}

impl<K, V, S> ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a cache that hashes keys with `hash_builder`.
    pub fn with_hasher(
        config: LruCacheConfig,
        on_evict: Option<EvictCallback<K, V>>,
        hash_builder: S,
    ) -> Result<Self> {
        Ok(Self {
            inner: RwLock::new(LruCache::with_hasher(config, on_evict, hash_builder)?),
        })
    }

    /// Returns the current capacity.
    pub fn cap(&self) -> NonZeroUsize {
        self.inner.read().cap()
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the cache contains no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Inserts or updates an entry and marks it most recently used.
    ///
    /// Returns `true` if the insertion evicted the least recently used entry.
    pub fn add(&self, key: K, value: V) -> bool
    where
        K: Clone,
    {
        self.inner.write().add(key, value)
    }

    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.write().get(key).cloned()
    }

    /// Marks `key` most recently used and applies `f` to its value while the
    /// lock is held.
    ///
    /// ```rust
    /// use simplelru::ConcurrentLruCache;
    ///
    /// let cache = ConcurrentLruCache::new(4).unwrap();
    /// cache.add("greeting", String::from("hello"));
    /// assert_eq!(cache.get_with(&"greeting", |s| s.len()), Some(5));
    /// ```
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.inner.write().get(key).map(f)
    }

    /// Returns a clone of the value for `key` without touching its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.read().peek(key).cloned()
    }

    /// Applies `f` to the value for `key` under the shared lock, without
    /// touching its recency.
    pub fn peek_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.inner.read().peek(key).map(f)
    }

    /// Returns `true` if `key` is resident. Does not touch its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.read().contains(key)
    }

    /// Removes `key`, invoking the eviction callback with its entry.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.write().remove(key)
    }

    /// Returns a clone of the least recently used entry without touching it.
    pub fn get_oldest(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.inner
            .read()
            .get_oldest()
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Returns a snapshot of every key, least recently used first.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.inner.read().keys()
    }

    /// Removes every entry, invoking the eviction callback once per entry.
    pub fn purge(&self) {
        self.inner.write().purge();
    }

    /// Changes the capacity and returns how many entries were evicted.
    pub fn resize(&self, cap: NonZeroUsize) -> usize {
        self.inner.write().resize(cap)
    }

    /// Returns a copy of the usage counters.
    pub fn counters(&self) -> LruCacheMetrics {
        self.inner.read().counters().clone()
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentLruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.inner.try_read() {
            Some(inner) => f
                .debug_struct("ConcurrentLruCache")
                .field("inner", &*inner)
                .finish(),
            None => f
                .debug_struct("ConcurrentLruCache")
                .field("inner", &"<locked>")
                .finish(),
        }
    }
}

impl<K, V, S> CacheMetrics for ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.read().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}
