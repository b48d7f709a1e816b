//! Cache Configuration
//!
//! [`LruCacheConfig`] is a plain struct with public fields, checked once when
//! a cache is built.
//!
//! # Sizing
//!
//! `capacity` is an entry count, not a byte budget. Each resident entry costs
//! the key and value plus roughly 48 bytes for the list node and a map slot
//! (the map is pre-sized to `capacity`).
//!
//! # Examples
//!
//! ```
//! use simplelru::config::LruCacheConfig;
//! use simplelru::LruCache;
//!
//! let config = LruCacheConfig { capacity: 1_000 };
//! let cache: LruCache<String, Vec<u8>> = LruCache::init(config, None).unwrap();
//! assert_eq!(cache.cap().get(), 1_000);
//!
//! // A zero capacity is rejected.
//! assert!(LruCache::<u32, u32>::init(LruCacheConfig { capacity: 0 }, None).is_err());
//! ```

use crate::error::{Error, Result};
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an LRU cache.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LruCacheConfig {
    /// Maximum number of key-value pairs the cache can hold. Must be positive.
    pub capacity: usize,
}

impl LruCacheConfig {
    pub fn new(capacity: usize) -> Self {
        LruCacheConfig { capacity }
    }

    /// Checks the configuration and returns the capacity as a `NonZeroUsize`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when `capacity` is 0.
    pub fn validate(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity).ok_or(Error::InvalidConfiguration {
            reason: "capacity must be positive",
        })
    }
}

impl fmt::Debug for LruCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
