//! Stress Tests for the Concurrent Cache
//!
//! These tests verify thread safety and the cache invariants under high
//! contention.

#![cfg(feature = "concurrent")]

use simplelru::config::LruCacheConfig;
use simplelru::{CacheMetrics, ConcurrentLruCache, EvictCallback};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 10_000;

fn counting_cache(capacity: usize) -> (Arc<ConcurrentLruCache<usize, usize>>, Arc<AtomicUsize>) {
    let evicted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evicted);
    let on_evict: EvictCallback<usize, usize> = Box::new(move |_: usize, _: usize| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let cache = ConcurrentLruCache::init(LruCacheConfig { capacity }, Some(on_evict)).unwrap();
    (Arc::new(cache), evicted)
}

/// Test high contention with many threads hammering the same keys
#[test]
fn stress_high_contention() {
    let (cache, _) = counting_cache(100);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = i % 10; // Only 10 keys for high contention
                if t % 2 == 0 {
                    cache.add(key, t * OPS_PER_THREAD + i);
                } else {
                    let _ = cache.get(&key);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(cache.len(), 10);
    assert_eq!(cache.keys().len(), 10);
}

/// Every insertion beyond capacity is accounted for by exactly one eviction
#[test]
fn stress_capacity_limits() {
    let capacity = 100;
    let (cache, evicted) = counting_cache(capacity);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                cache.add(t * OPS_PER_THREAD + i, i);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(cache.len(), capacity);
    assert_eq!(
        evicted.load(Ordering::SeqCst),
        NUM_THREADS * OPS_PER_THREAD - capacity
    );
}

/// Mixed touches, reads, removals and occasional purges
#[test]
fn stress_mixed_operations() {
    let (cache, evicted) = counting_cache(64);
    let removed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        let removed = Arc::clone(&removed);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = (t * 7 + i) % 256;
                match i % 6 {
                    0 | 1 => {
                        cache.add(key, i);
                    }
                    2 => {
                        let _ = cache.get(&key);
                    }
                    3 => {
                        let _ = cache.peek(&key);
                        let _ = cache.contains(&key);
                    }
                    4 => {
                        if cache.remove(&key) {
                            removed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                    _ => {
                        let _ = cache.get_oldest();
                        if i % 5_000 == 5 && t == 0 {
                            cache.purge();
                        }
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.len() <= 64);
    assert_eq!(cache.keys().len(), cache.len());

    // insertions = resident + evicted (capacity, remove, purge)
    let counters = cache.counters();
    assert_eq!(
        counters.insertions as usize,
        cache.len() + evicted.load(Ordering::SeqCst)
    );
    assert_eq!(
        counters.removals as usize + counters.evictions as usize,
        evicted.load(Ordering::SeqCst)
    );
    assert!(removed.load(Ordering::SeqCst) <= counters.removals as usize);
}

/// Readers on the shared lock run alongside writers that resize the cache
#[test]
fn stress_resize_while_reading() {
    let (cache, _) = counting_cache(512);
    for i in 0..512 {
        cache.add(i, i);
    }

    let mut handles = Vec::new();
    for t in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let size = 32 + (i * 13 + t) % 480;
                cache.resize(NonZeroUsize::new(size).unwrap());
                cache.add(i, i);
            }
        }));
    }
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let keys = cache.keys();
                assert!(keys.len() <= 512);
                let _ = cache.peek(&(i % 512));
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.len() <= cache.cap().get());
}

/// Shared readers borrowing the cache from a scoped pool
#[test]
fn stress_scoped_readers() {
    let cache: ConcurrentLruCache<usize, String> = ConcurrentLruCache::new(1_000).unwrap();
    for i in 0..1_000 {
        cache.add(i, format!("value-{}", i));
    }
    let before = cache.keys();

    let mut pool = scoped_threadpool::Pool::new(8);
    pool.scoped(|scope| {
        for t in 0..8 {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..1_000 {
                    let key = (i + t * 125) % 1_000;
                    let expected = format!("value-{}", key);
                    assert_eq!(cache.peek(&key).as_deref(), Some(expected.as_str()));
                    assert_eq!(cache.peek_with(&key, |v| v.len()), Some(expected.len()));
                    assert!(cache.contains(&key));
                }
            });
        }
    });

    // no reader moved anything
    assert_eq!(cache.keys(), before);
    assert_eq!(cache.metrics().get("requests"), Some(&0.0));
}

/// Operations on an empty cache from many threads
#[test]
fn stress_empty_cache() {
    let (cache, evicted) = counting_cache(100);

    let mut handles = Vec::new();
    for _ in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..1000 {
                assert!(cache.get(&i).is_none());
                assert!(!cache.remove(&i));
                assert!(cache.get_oldest().is_none());
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.is_empty());
    assert_eq!(evicted.load(Ordering::SeqCst), 0);
}
