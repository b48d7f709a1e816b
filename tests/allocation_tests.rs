//! Allocation Tests
//!
//! Lookups and touches on resident keys must not allocate. All checks live in
//! one test so no other test in this binary allocates concurrently while a
//! region is being measured.

use simplelru::{ConcurrentLruCache, LruCache};
use stats_alloc::{Region, StatsAlloc, INSTRUMENTED_SYSTEM};
use std::alloc::System;

#[global_allocator]
static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

#[test]
fn test_hot_path_does_not_allocate() {
    let mut cache: LruCache<u64, u64> = LruCache::new(64).unwrap();
    for i in 0..64 {
        cache.add(i, i);
    }

    let region = Region::new(GLOBAL);
    for i in 0..64 {
        assert_eq!(cache.get(&i), Some(&i));
        assert_eq!(cache.peek(&i), Some(&i));
        assert!(cache.contains(&i));
    }
    // updating a resident key reuses its node
    cache.add(7, 700);
    assert_eq!(cache.get_oldest(), Some((&0, &0)));
    let stats = region.change();
    assert_eq!(stats.allocations, 0);
    assert_eq!(stats.reallocations, 0);

    // eviction frees one node and allocates one
    let region = Region::new(GLOBAL);
    assert!(cache.add(1_000, 1_000));
    let stats = region.change();
    assert_eq!(stats.allocations, 1);
    assert_eq!(stats.deallocations, 1);

    let shared: ConcurrentLruCache<u64, u64> = ConcurrentLruCache::new(64).unwrap();
    for i in 0..64 {
        shared.add(i, i);
    }
    let region = Region::new(GLOBAL);
    for i in 0..64 {
        assert_eq!(shared.get(&i), Some(i));
        assert_eq!(shared.peek(&i), Some(i));
    }
    assert_eq!(shared.len(), 64);
    let stats = region.change();
    assert_eq!(stats.allocations, 0);
}
