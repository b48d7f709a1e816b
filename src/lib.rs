//! A fixed-capacity key-value cache with least-recently-used eviction.
//!
//! The cache keeps a hash index from key to node and a doubly linked recency
//! list in step, so that every lookup, insertion, touch and eviction is O(1).
//! When inserting a new key would exceed the capacity, the least recently
//! used entry is evicted and handed to an optional callback.
//!
//! # Which type?
//!
//! | Type | Receivers | Use it when |
//! |------|-----------|-------------|
//! | [`ConcurrentLruCache`] | `&self`, internal `RwLock` | several threads share one cache |
//! | [`LruCache`] | `&mut self` for mutation | one owner, or you already hold a lock |
//!
//! # Touching
//!
//! `add` and `get` mark an entry most recently used. `peek`, `contains`,
//! `get_oldest`, `keys` and `len` never change the order, and on
//! [`ConcurrentLruCache`] they only take the shared lock.
//!
//! # Example
//!
//! ```rust
//! use simplelru::config::LruCacheConfig;
//! use simplelru::{ConcurrentLruCache, EvictCallback};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let evictions = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&evictions);
//! let on_evict: EvictCallback<u32, u32> = Box::new(move |_key: u32, _value: u32| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let cache = ConcurrentLruCache::init(LruCacheConfig { capacity: 128 }, Some(on_evict)).unwrap();
//! for i in 1..=300 {
//!     cache.add(i, i);
//! }
//!
//! assert_eq!(evictions.load(Ordering::SeqCst), 172);
//! assert_eq!(cache.len(), 128);
//! assert_eq!(cache.keys(), (173..=300).collect::<Vec<_>>());
//! ```
//!
//! # Eviction Callback
//!
//! The callback receives the owned key and value of each entry removed by
//! capacity pressure, [`remove`](LruCache::remove), [`purge`](LruCache::purge)
//! or [`resize`](LruCache::resize). On [`ConcurrentLruCache`] it runs under the
//! exclusive lock and must not call back into the same cache.
//!
//! # Features
//!
//! - `hashbrown` (default): use `hashbrown::HashMap` for the index.
//! - `concurrent` (default): enable [`ConcurrentLruCache`] (pulls in `parking_lot`).
//!
//! # Logging
//!
//! Construction, `purge` and `resize` are reported at `debug` level and
//! individual evictions at `trace` level through the `log` facade.

#![no_std]

extern crate alloc;

#[cfg(any(test, not(feature = "hashbrown")))]
extern crate std;

/// Doubly linked list used as the recency ordering.
///
/// **Note**: This module is internal infrastructure. It exposes unsafe raw
/// pointer operations that require careful invariant maintenance.
pub(crate) mod list;

/// Cache configuration.
pub mod config;

/// Construction errors.
pub mod error;

/// Single-owner LRU cache.
pub mod lru;

/// Usage counters and the `CacheMetrics` reporting trait.
pub mod metrics;

/// Thread-safe LRU cache.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use config::LruCacheConfig;
pub use error::{Error, Result};
pub use lru::{EvictCallback, LruCache};
pub use metrics::{CacheMetrics, LruCacheMetrics};

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentLruCache;
