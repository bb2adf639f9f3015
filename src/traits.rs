//! # Cache Trait Hierarchy
//!
//! Two layers of traits describe what a cache can do:
//!
//! ```text
//!   Single-threaded (&mut self, infallible)      Thread-safe (&self, validated)
//!   ═══════════════════════════════════════      ══════════════════════════════
//!
//!   ┌──────────────────────────────┐             ┌──────────────────────────────┐
//!   │        CoreCache<K, V>       │             │          Cache<K, V>         │
//!   │  insert / get / contains     │             │  put / get / remove          │
//!   │  len / capacity / clear      │             │  len / capacity / clear      │
//!   └──────────────┬───────────────┘             │                              │
//!                  ▼                             │  absent key → InvalidArgument│
//!   ┌──────────────────────────────┐             └──────────────────────────────┘
//!   │      MutableCache<K, V>      │
//!   │  remove                      │
//!   └──────────────┬───────────────┘
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │      LruCacheTrait<K, V>     │
//!   │  pop_lru / peek_lru          │
//!   │  touch / recency_rank        │
//!   └──────────────────────────────┘
//! ```
//!
//! The single-threaded traits are implemented by policy cores such as
//! [`LruCore`](crate::policy::lru::LruCore). [`Cache`] is the public contract of
//! the lock-protected engines and of the factory's
//! [`PolicyCache`](crate::builder::PolicyCache); every call is one critical
//! section.
//!
//! ## Absent keys
//!
//! Rust keys cannot be null, so the contract models a missing key as `None`.
//! Key parameters accept anything convertible into `Option<K>` (or
//! `Option<&K>` for lookups):
//!
//! ```
//! use lrukit::policy::lru::LruCache;
//! use lrukit::traits::Cache;
//!
//! let cache: LruCache<&str, i32> = LruCache::new(2).unwrap();
//! cache.put("a", 1).unwrap();
//! assert_eq!(cache.get(&"a").unwrap().as_deref(), Some(&1));
//!
//! assert!(cache.put(None, 2).is_err());
//! assert!(cache.get(None).is_err());
//! ```

use std::sync::Arc;

use crate::error::CacheError;

/// Operations every single-threaded cache core supports.
///
/// `get` may reorder internal state (recency), so it takes `&mut self`; use
/// [`contains`](Self::contains) for a check that leaves eviction order alone.
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key existed.
    ///
    /// If the cache is at capacity and the key is new, an entry is evicted
    /// according to the cache's policy before the new entry is inserted.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key, recording the access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    fn capacity(&self) -> usize;

    /// Removes all entries. Capacity is unchanged.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    ///
    /// Never evicts another entry and never reorders the remaining ones.
    fn remove(&mut self, key: &K) -> Option<V>;
}

/// LRU-specific operations that respect recency order.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lrukit::policy::lru::LruCore;
/// use lrukit::traits::{CoreCache, LruCacheTrait};
///
/// let mut cache: LruCore<u64, &str> = LruCore::new(3).unwrap();
/// cache.insert(1, Arc::new("one"));
/// cache.insert(2, Arc::new("two"));
/// cache.insert(3, Arc::new("three"));
///
/// cache.get(&1);
/// assert_eq!(cache.peek_lru().map(|(k, _)| *k), Some(2));
///
/// assert!(cache.touch(&2));
/// let (key, _) = cache.pop_lru().unwrap();
/// assert_eq!(key, 3);
/// ```
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Peeks at the LRU entry without removing or promoting it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks an entry as most recently used without reading it.
    ///
    /// Returns `false` if the key is not present.
    fn touch(&mut self, key: &K) -> bool;

    /// Position in recency order (0 = most recent). O(n).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// The thread-safe cache contract.
///
/// Implementations serialize every call behind one lock, so the observable
/// effect is as if calls were applied one at a time. Values are handed out as
/// `Arc<V>` so they outlive the critical section (and eviction) cheaply.
///
/// # Errors
///
/// `put`, `get` and `remove` return [`CacheError::InvalidArgument`] when the
/// key is `None`. The cache is left untouched in that case.
pub trait Cache<K, V> {
    /// Inserts or updates `key`, making it the most recently used entry.
    ///
    /// Inserting a new key into a full cache evicts the least recently used
    /// entry first. Updating an existing key never evicts.
    fn put<Q>(&self, key: Q, value: V) -> Result<(), CacheError>
    where
        Q: Into<Option<K>>;

    /// Returns the value for `key` and marks it most recently used.
    fn get<'k, Q>(&self, key: Q) -> Result<Option<Arc<V>>, CacheError>
    where
        Q: Into<Option<&'k K>>,
        K: 'k;

    /// Removes `key` and returns its value.
    fn remove<'k, Q>(&self, key: Q) -> Result<Option<Arc<V>>, CacheError>
    where
        Q: Into<Option<&'k K>>,
        K: 'k;

    /// Current number of entries, always `<= capacity()`.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bound fixed at construction. Always positive.
    fn capacity(&self) -> usize;

    /// Drops every entry; `len()` becomes 0.
    fn clear(&self);
}
