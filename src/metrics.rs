//! Cache Metrics
//!
//! Counters describing how an LRU cache has been used, reported through the
//! [`CacheMetrics`] trait as a `BTreeMap` so that output ordering is
//! deterministic across runs.
//!
//! Only operations that already hold exclusive access record anything
//! (`add`, `get`, `remove`, `purge`, `resize`). Pure reads such as `peek` or
//! `contains` leave the counters untouched, which keeps them callable under a
//! shared lock.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Counters tracked by an LRU cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LruCacheMetrics {
    /// Number of `get` calls.
    pub requests: u64,

    /// Number of `get` calls that found their key.
    pub cache_hits: u64,

    /// Number of `add` calls that inserted a new key.
    pub insertions: u64,

    /// Number of `add` calls that replaced the value of a resident key.
    pub updates: u64,

    /// Entries dropped to respect the capacity (on `add` or `resize`).
    pub evictions: u64,

    /// Entries dropped on request (`remove` or `purge`).
    pub removals: u64,
}

impl LruCacheMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a `get` that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a `get` that did not find its key.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Number of `get` calls that missed.
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Hit rate between 0.0 and 1.0, or 0.0 if no request has been made.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Miss rate between 0.0 and 1.0, or 0.0 if no request has been made.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a map with stable key ordering.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("updates".to_string(), self.updates as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);

        // Rates (0.0 to 1.0)
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics
    }
}

/// Uniform read-out of cache metrics.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs, sorted by key.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// A static name identifying the eviction algorithm.
    fn algorithm_name(&self) -> &'static str;
}

impl CacheMetrics for LruCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}
