//! Least Recently Used (LRU) Cache Implementation
//!
//! This module provides the single-owner LRU engine. It keeps two coupled
//! structures in step: a hash index from key to list node, and a doubly
//! linked recency list whose front is the most recently used entry and whose
//! back is the next eviction candidate.
//!
//! # Algorithm
//!
//! - `add` of a new key pushes a node to the front; if that takes the cache
//!   past its capacity, the back node is evicted.
//! - `add` of a resident key replaces its value and moves it to the front.
//! - `get` moves the key to the front ("touches" it).
//! - `peek`, `contains`, `get_oldest`, `keys` and `len` never reorder.
//!
//! # Performance Characteristics
//!
//! - **Time Complexity**: `add`, `get`, `peek`, `contains`, `remove` and
//!   `get_oldest` are O(1); `keys` and `purge` are O(n); `resize` is
//!   O(evicted entries).
//! - **Space Complexity**: O(capacity), about 48 bytes per entry plus the
//!   key (stored twice) and the value.
//!
//! # Eviction Callback
//!
//! An optional [`EvictCallback`] receives the owned key and value of every
//! entry that leaves the cache through capacity pressure, `remove`, `purge`
//! or `resize`. Dropping the cache does not invoke it. The entry is unlinked
//! from both structures before the callback runs, so a panicking callback
//! cannot leave the cache inconsistent.
//!
//! # Thread Safety
//!
//! `LruCache` is not synchronized. Use
//! [`ConcurrentLruCache`](crate::ConcurrentLruCache) to share one cache
//! between threads.

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::error::Result;
use crate::list::{Entry, List};
use crate::metrics::{CacheMetrics, LruCacheMetrics};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;
use log::{debug, trace};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Callback invoked with the key and value of every entry leaving the cache.
///
/// It runs synchronously inside the operation that removed the entry. When
/// the cache is a [`ConcurrentLruCache`](crate::ConcurrentLruCache) that
/// means it runs under the exclusive lock, so it must not call back into the
/// same cache or it will deadlock.
pub type EvictCallback<K, V> = Box<dyn FnMut(K, V) + Send + Sync>;

/// An implementation of a Least Recently Used (LRU) cache.
///
/// # Safety
///
/// `map` holds raw pointers to nodes owned by `list`. They are valid as long
/// as the pointer was returned by `list.push_front`, the node has not been
/// removed from the list, and the cache has not been dropped. Every removal
/// takes the key out of `map` in the same operation.
///
/// # Examples
///
/// ```
/// use simplelru::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
///
/// cache.add("apple", 1);
/// cache.add("banana", 2);
///
/// // Accessing items updates their recency
/// assert_eq!(cache.get(&"apple"), Some(&1));
///
/// // Adding beyond capacity evicts the least recently used item
/// assert!(cache.add("cherry", 3));
/// assert_eq!(cache.get(&"banana"), None);
/// assert_eq!(cache.keys(), vec!["apple", "cherry"]);
/// ```
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    cap: NonZeroUsize,
    list: List<(K, V)>,
    map: HashMap<K, *mut Entry<(K, V)>, S>,
    on_evict: Option<EvictCallback<K, V>>,
    metrics: LruCacheMetrics,
}

// SAFETY: the cache owns every node the raw pointers in `map` refer to, so
// sending the cache sends the keys and values with it.
unsafe impl<K: Send, V: Send, S: Send> Send for LruCache<K, V, S> {}

// SAFETY: `&self` methods only read through the node pointers; all mutation
// requires `&mut self`.
unsafe impl<K: Sync, V: Sync, S: Sync> Sync for LruCache<K, V, S> {}

impl<K: Hash + Eq, V> LruCache<K, V> {
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
    /// # Examples
    ///
    /// ```
    /// use simplelru::config::LruCacheConfig;
    /// use simplelru::{EvictCallback, LruCache};
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let evicted = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&evicted);
    /// let on_evict: EvictCallback<u32, u32> = Box::new(move |_, _| {
    ///     counter.fetch_add(1, Ordering::SeqCst);
    /// });
    ///
    /// let mut cache = LruCache::init(LruCacheConfig { capacity: 1 }, Some(on_evict)).unwrap();
    /// cache.add(1, 1);
    /// cache.add(2, 2);
    /// assert_eq!(evicted.load(Ordering::SeqCst), 1);
    /// ```
    pub fn init(config: LruCacheConfig, on_evict: Option<EvictCallback<K, V>>) -> Result<Self> {
        Self::with_hasher(config, on_evict, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Creates a cache that hashes keys with `hash_builder`.
    pub fn with_hasher(
        config: LruCacheConfig,
        on_evict: Option<EvictCallback<K, V>>,
        hash_builder: S,
    ) -> Result<Self> {
        let cap = config.validate()?;
        debug!("creating LRU cache with capacity {}", cap);
        Ok(LruCache {
            cap,
            list: List::new(),
            map: HashMap::with_capacity_and_hasher(cap.get(), hash_builder),
            on_evict,
            metrics: LruCacheMetrics::new(),
        })
    }

    /// Returns the maximum number of entries the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the number of resident entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the usage counters of this cache.
    #[inline]
    pub fn counters(&self) -> &LruCacheMetrics {
        &self.metrics
    }

    /// Inserts or updates an entry and marks it most recently used.
    ///
    /// Returns `true` if inserting a new key evicted the least recently used
    /// entry. Updating a resident key never evicts.
    pub fn add(&mut self, key: K, value: V) -> bool
    where
        K: Clone,
    {
        if let Some(&node) = self.map.get(&key) {
            unsafe {
                // SAFETY: node comes from our map
                self.list.move_to_front(node);
                let _previous = self.list.update(node, (key, value));
            }
            self.metrics.record_update();
            return false;
        }

        let node = self.list.push_front((key.clone(), value));
        self.map.insert(key, node);
        self.metrics.record_insertion();

        if self.list.len() > self.cap.get() {
            return self.evict_oldest();
        }
        false
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(node) = self.map.get(key).copied() else {
            self.metrics.record_miss();
            return None;
        };
        self.metrics.record_hit();
        unsafe {
            // SAFETY: node comes from our map
            self.list.move_to_front(node);
            Some(&(*node).get_value().1)
        }
    }

    /// Like [`get`](Self::get), but hands out a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(node) = self.map.get(key).copied() else {
            self.metrics.record_miss();
            return None;
        };
        self.metrics.record_hit();
        unsafe {
            // SAFETY: node comes from our map
            self.list.move_to_front(node);
            Some(&mut (*node).get_value_mut().1)
        }
    }

    /// Returns the value for `key` without touching its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        // SAFETY: node comes from our map
        unsafe { Some(&(*node).get_value().1) }
    }

    /// Returns `true` if `key` is resident. Does not touch its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Removes `key`, invoking the eviction callback with its entry.
    ///
    /// Returns `false` if the key was not resident.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(node) = self.map.remove(key) else {
            return false;
        };
        // SAFETY: node came from our map and was still linked
        let Some(entry) = (unsafe { self.list.remove(node) }) else {
            return false;
        };
        let (key, value) = entry.into_value();
        self.metrics.record_removal();
        trace!("removed entry, {} remaining", self.list.len());
        self.notify(key, value);
        true
    }

    /// Returns the least recently used entry without touching it.
    pub fn get_oldest(&self) -> Option<(&K, &V)> {
        self.list.back().map(|(k, v)| (k, v))
    }

    /// Returns every resident key, least recently used first.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.list.iter().rev().map(|(k, _)| k.clone()).collect()
    }

    /// Removes every entry, invoking the eviction callback once per entry.
    ///
    /// The capacity and the callback are kept.
    pub fn purge(&mut self) {
        let mut drained = mem::take(&mut self.list);
        self.map.clear();
        debug!("purging {} entries", drained.len());

        // A panicking callback drops whatever is left in `drained`.
        while let Some(entry) = drained.remove_last() {
            let (key, value) = entry.into_value();
            self.metrics.record_removal();
            self.notify(key, value);
        }
    }

    /// Changes the capacity, evicting least recently used entries until the
    /// cache fits.
    ///
    /// Returns the number of entries evicted by this call; growing the cache
    /// always returns 0.
    pub fn resize(&mut self, cap: NonZeroUsize) -> usize {
        let old_cap = mem::replace(&mut self.cap, cap);
        let mut evicted = 0;
        while self.list.len() > cap.get() && self.evict_oldest() {
            evicted += 1;
        }
        debug!(
            "resized LRU cache from {} to {}, evicted {} entries",
            old_cap, cap, evicted
        );
        evicted
    }

    /// Unlinks the back entry and hands it to the callback.
    fn evict_oldest(&mut self) -> bool {
        let Some(entry) = self.list.remove_last() else {
            return false;
        };
        let (key, value) = entry.into_value();
        self.map.remove(&key);
        self.metrics.record_eviction();
        trace!("evicted least recently used entry, {} remaining", self.list.len());
        self.notify(key, value);
        true
    }

    fn notify(&mut self, key: K, value: V) {
        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(key, value);
        }
    }
}

impl<K, V, S> core::fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.cap)
            .field("len", &self.list.len())
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LruCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}
