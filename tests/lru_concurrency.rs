// ==============================================
// LRU CONCURRENCY TESTS (integration)
// ==============================================
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use lrukit::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

mod shared_engine {
    use super::*;

    #[test]
    fn concurrent_puts_respect_capacity() {
        let capacity = 64;
        let cache: Arc<LruCache<u64, u64>> = Arc::new(LruCache::new(capacity).unwrap());
        let num_threads = 8;
        let ops_per_thread = 2_000u64;
        let barrier = Arc::new(Barrier::new(num_threads));

        let handles: Vec<_> = (0..num_threads as u64)
            .map(|thread_id| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..ops_per_thread {
                        cache.put(thread_id * 1_000_000 + i, i).unwrap();
                        assert!(cache.len() <= capacity);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), capacity);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn mixed_random_workload_keeps_invariants() {
        let capacity = 32;
        let cache: Arc<LruCache<u32, u32>> = Arc::new(LruCache::new(capacity).unwrap());
        let num_threads = 6;
        let barrier = Arc::new(Barrier::new(num_threads));
        let hits = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..num_threads as u64)
            .map(|seed| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                let hits = Arc::clone(&hits);
                thread::spawn(move || {
                    let mut rng = SmallRng::seed_from_u64(seed);
                    barrier.wait();
                    for _ in 0..5_000 {
                        let key = rng.gen_range(0..128u32);
                        match rng.gen_range(0..10) {
                            0..=4 => cache.put(key, key * 2).unwrap(),
                            5..=7 => {
                                if let Some(value) = cache.get(&key).unwrap() {
                                    // a value is only ever written for its own key
                                    assert_eq!(*value, key * 2);
                                    hits.fetch_add(1, Ordering::Relaxed);
                                }
                            },
                            8 => {
                                cache.remove(&key).unwrap();
                            },
                            _ => {
                                cache.touch(&key);
                            },
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= capacity);
        assert!(cache.check_invariants().is_ok());
        assert!(hits.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn concurrent_clear_and_put() {
        let cache: Arc<LruCache<u32, u32>> = Arc::new(LruCache::new(16).unwrap());
        let barrier = Arc::new(Barrier::new(3));

        let writers: Vec<_> = (0..2u32)
            .map(|offset| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..3_000 {
                        cache.put(i * 2 + offset, i).unwrap();
                    }
                })
            })
            .collect();

        let clearer = {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    cache.clear();
                    thread::yield_now();
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        clearer.join().unwrap();

        assert!(cache.len() <= 16);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn same_key_last_write_is_visible() {
        let cache: Arc<LruCache<&'static str, usize>> = Arc::new(LruCache::new(4).unwrap());
        let num_threads = 4;
        let barrier = Arc::new(Barrier::new(num_threads));

        let handles: Vec<_> = (0..num_threads)
            .map(|thread_id| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..1_000 {
                        cache.put("shared", thread_id).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
        let value = cache.get(&"shared").unwrap().unwrap();
        assert!(*value < num_threads);
    }
}

mod registry {
    use super::*;

    #[test]
    fn concurrent_distinct_names_all_register() {
        let manager: Arc<CacheManager<u32, u32>> = Arc::new(CacheManager::new());
        let num_threads = 8;
        let barrier = Arc::new(Barrier::new(num_threads));

        let handles: Vec<_> = (0..num_threads)
            .map(|thread_id| {
                let manager = Arc::clone(&manager);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let name = format!("cache_{}", thread_id);
                    let cache = manager.create_named_cache(name, CachePolicy::Lru, 8).unwrap();
                    for i in 0..100 {
                        cache.put(i, i).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let caches = manager.list_caches();
        assert_eq!(caches.len(), num_threads);
        for cache in caches.values() {
            assert_eq!(cache.len(), 8);
        }
    }

    #[test]
    fn lookups_during_registration_see_whole_caches() {
        let manager: Arc<CacheManager<u32, u32>> = Arc::new(CacheManager::new());
        manager.create_named_cache("base", CachePolicy::Lru, 4).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let writer = {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..200 {
                    manager
                        .create_named_cache(format!("c{}", i), CachePolicy::Lru, 2)
                        .unwrap();
                }
            })
        };

        let reader = {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    assert!(manager.get_cache("base").is_some());
                    let snapshot = manager.list_caches();
                    assert!(snapshot.contains_key("base"));
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(manager.len(), 201);
    }
}
