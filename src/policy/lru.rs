//! # Least Recently Used (LRU) Cache
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                           LruCache<K, V>                             │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │      parking_lot::Mutex<LruCore<K, V>>  (fair unlock)        │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                                │                                     │
//!   │                                ▼                                     │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                        LruCore<K, V>                         │   │
//!   │   │                                                              │   │
//!   │   │   KeyIndex<K>  (FxHashMap<K, SlotId>)                        │   │
//!   │   │     a ──────────────┐                                        │   │
//!   │   │     b ──────────────┼──────────┐                             │   │
//!   │   │     c ──────────────┼──────────┼──────────┐                  │   │
//!   │   │                     ▼          ▼          ▼                  │   │
//!   │   │   RecencyList   head ─► [c] ◄──► [b] ◄──► [a] ◄── tail       │   │
//!   │   │   (SlotArena)         (MRU)                (LRU)             │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   INSERT new key (cache full, capacity = 3)
//!     head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!     insert(D):  1. remove_tail → C, drop C from index
//!                 2. add_first(D), index D
//!     head ──► [D] ◄──► [A] ◄──► [B] ◄── tail
//!
//!   UPDATE existing key
//!     insert(B, v2):  replace value in place, move_to_head(B); never evicts
//!
//!   ACCESS
//!     get(B):  index lookup O(1), move_to_head(B) O(1)
//!
//!   REMOVE
//!     remove(A):  unlink A wherever it sits; others keep their order
//! ```
//!
//! ## Types
//!
//! | Type             | Thread-safe | Description                                  |
//! |------------------|-------------|----------------------------------------------|
//! | `LruCore<K, V>`  | No          | Index + recency list + capacity, `&mut self` |
//! | `LruCache<K, V>` | Yes         | `LruCore` behind one fair `Mutex`, `&self`   |
//!
//! ## Concurrency Model
//!
//! `get` reorders the recency list, so there is no read-only fast path: every
//! public call on [`LruCache`] takes the same exclusive lock for its full
//! duration. The guard is released with `unlock_fair`, which hands the lock
//! to the longest waiter and keeps a stream of `get`s from starving `put`.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::lru::LruCache;
//! use lrukit::traits::Cache;
//!
//! let cache: LruCache<&str, i32> = LruCache::new(2).unwrap();
//! cache.put("a", 1).unwrap();
//! cache.put("b", 2).unwrap();
//! cache.get(&"a").unwrap();      // a becomes MRU
//! cache.put("c", 3).unwrap();    // evicts b
//!
//! assert!(cache.get(&"b").unwrap().is_none());
//! assert_eq!(cache.len(), 2);
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::{Mutex, MutexGuard};

use crate::ds::{KeyIndex, RecencyList};
use crate::error::{CacheError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::{
    CoreMetricsRecorder, LruMetrics, LruMetricsRecorder, LruMetricsSnapshot,
    MetricsSnapshotProvider,
};
use crate::traits::{Cache, CoreCache, LruCacheTrait, MutableCache};

const ABSENT_KEY: &str = "key must not be absent";
const ZERO_CAPACITY: &str = "capacity must be greater than zero";

/// Most entries reserved up front when preallocating.
pub const PREALLOC_LIMIT: usize = 1 << 16;

/// Single-threaded LRU engine: key index + recency list + capacity bound.
///
/// Values are stored as `Arc<V>` so callers can keep a value after it has
/// been evicted or removed. Keys are stored twice (index and list), hence the
/// `K: Clone` bound.
pub struct LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    index: KeyIndex<K>,
    list: RecencyList<K, Arc<V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an LRU core holding at most `capacity` entries, with index and
    /// arena storage reserved up front (up to [`PREALLOC_LIMIT`]).
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `capacity` is 0.
    ///
    /// # Example
    /// ```
    /// use lrukit::policy::lru::LruCore;
    ///
    /// let cache: LruCore<u32, String> = LruCore::new(100).unwrap();
    /// assert!(LruCore::<u32, String>::new(0).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        Self::with_prealloc(capacity, true)
    }

    /// Like [`new`](Self::new), but only reserves storage when `prealloc` is set.
    ///
    /// At most [`PREALLOC_LIMIT`] entries are reserved, so any positive
    /// capacity (including `usize::MAX`) is accepted.
    pub fn with_prealloc(capacity: usize, prealloc: bool) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidArgument(ZERO_CAPACITY));
        }
        let (index, list) = if prealloc {
            // Bounds above the limit grow on demand past the reserved part.
            let reserve = capacity.min(PREALLOC_LIMIT);
            (
                KeyIndex::with_capacity(reserve),
                RecencyList::with_capacity(reserve),
            )
        } else {
            (KeyIndex::new(), RecencyList::new())
        };
        debug!("created LRU core (capacity {}, prealloc {})", capacity, prealloc);
        Ok(LruCore {
            index,
            list,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Returns the value without touching recency order.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use lrukit::policy::lru::LruCore;
    /// use lrukit::traits::CoreCache;
    ///
    /// let mut cache: LruCore<u32, &str> = LruCore::new(2).unwrap();
    /// cache.insert(1, Arc::new("first"));
    /// cache.insert(2, Arc::new("second"));
    ///
    /// assert_eq!(cache.peek(&1).as_deref(), Some(&"first"));
    ///
    /// // 1 is still LRU and goes first
    /// cache.insert(3, Arc::new("third"));
    /// assert!(!cache.contains(&1));
    /// ```
    #[inline]
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let id = self.index.get(key)?;
        self.list.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.list
            .iter()
            .map(|(_, entry)| entry.key().clone())
            .collect()
    }

    /// Verifies that index and list describe the same set of entries and that
    /// the list is a well-formed chain within capacity.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.validate()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} entries",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (id, entry) in self.list.iter() {
            if self.index.get(entry.key()) != Some(id) {
                return Err(InvariantError::new(format!(
                    "list slot {} is not the indexed slot for its key",
                    id.index()
                )));
            }
        }
        Ok(())
    }

    #[inline]
    fn debug_validate(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.check_invariants() {
                panic!("LRU invariant violated: {err}");
            }
        }
    }

    /// Unlinks the tail and drops its key from the index.
    fn evict_lru(&mut self) -> Option<(K, Arc<V>)> {
        let (key, value) = self.list.remove_tail()?;
        self.index.remove(&key);
        trace!(
            "evicted LRU entry (len {}, capacity {})",
            self.list.len(),
            self.capacity
        );
        Some((key, value))
    }
}

impl<K, V> CoreCache<K, Arc<V>> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn insert(&mut self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let previous = self
                .list
                .value_mut(id)
                .map(|slot| std::mem::replace(slot, value));
            self.list.move_to_head(id);
            self.debug_validate();
            return previous;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        // Make room before linking so len never exceeds capacity.
        if self.index.len() >= self.capacity {
            #[cfg(feature = "metrics")]
            self.metrics.record_evict_call();

            if self.evict_lru().is_some() {
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
            }
        }

        let id = self.list.add_first(key.clone(), value);
        self.index.insert(key, id);
        self.debug_validate();
        None
    }

    fn get(&mut self, key: &K) -> Option<&Arc<V>> {
        let Some(id) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.list.move_to_head(id);
        self.debug_validate();
        self.list.get(id).map(|entry| entry.value())
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index.contains(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.list.clear();
        self.index.clear();
        debug!("cleared LRU core (capacity {})", self.capacity);
    }
}

impl<K, V> MutableCache<K, Arc<V>> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let id = self.index.remove(key)?;
        let removed = self.list.remove(id).map(|(_, value)| value);

        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_remove_found();
        }

        self.debug_validate();
        removed
    }
}

impl<K, V> LruCacheTrait<K, Arc<V>> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn pop_lru(&mut self) -> Option<(K, Arc<V>)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let popped = self.evict_lru()?;

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();

        self.debug_validate();
        Some(popped)
    }

    fn peek_lru(&self) -> Option<(&K, &Arc<V>)> {
        let id = self.list.tail_id()?;
        self.list.get(id).map(|entry| (entry.key(), entry.value()))
    }

    fn touch(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let Some(id) = self.index.get(key) else {
            return false;
        };
        self.list.move_to_head(id);

        #[cfg(feature = "metrics")]
        self.metrics.record_touch_found();

        self.debug_validate();
        true
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        let target = self.index.get(key)?;
        self.list.iter().position(|(id, _)| id == target)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            clear_calls: self.metrics.clear_calls,
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            cache_len: self.index.len(),
            capacity: self.capacity,
        }
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("capacity", &self.capacity)
            .field("len", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, Arc<V>)> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn extend<T: IntoIterator<Item = (K, Arc<V>)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe LRU cache: an [`LruCore`] behind one fair, exclusive lock.
///
/// Share it between threads with `Arc<LruCache<K, V>>`.
pub struct LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    inner: Mutex<LruCore<K, V>>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `capacity` is 0.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    /// use lrukit::traits::Cache;
    ///
    /// let cache: LruCache<u32, String> = LruCache::new(100).unwrap();
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        Self::with_prealloc(capacity, true)
    }

    pub fn with_prealloc(capacity: usize, prealloc: bool) -> Result<Self, CacheError> {
        let core = LruCore::with_prealloc(capacity, prealloc)?;
        Ok(Self {
            inner: Mutex::new(core),
            capacity,
        })
    }

    /// Runs `f` as one critical section and hands the lock to the next waiter
    /// in arrival order.
    #[inline]
    fn locked<R>(&self, f: impl FnOnce(&mut LruCore<K, V>) -> R) -> R {
        let mut guard = self.inner.lock();
        let out = f(&mut *guard);
        MutexGuard::unlock_fair(guard);
        out
    }

    /// Reads a value without promoting it.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.locked(|core| core.peek(key))
    }

    /// Checks for `key` without promoting it.
    pub fn contains(&self, key: &K) -> bool {
        self.locked(|core| core.contains(key))
    }

    /// Promotes `key` to most recently used without reading it.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    /// use lrukit::traits::Cache;
    ///
    /// let cache: LruCache<u32, &str> = LruCache::new(2).unwrap();
    /// cache.put(1, "first").unwrap();
    /// cache.put(2, "second").unwrap();
    ///
    /// assert!(cache.touch(&1));
    /// cache.put(3, "third").unwrap();
    /// assert!(cache.contains(&1));
    /// assert!(!cache.contains(&2));
    /// assert!(!cache.touch(&99));
    /// ```
    pub fn touch(&self, key: &K) -> bool {
        self.locked(|core| core.touch(key))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&self) -> Option<(K, Arc<V>)> {
        self.locked(|core| core.pop_lru())
    }

    /// The least recently used entry, left in place.
    pub fn peek_lru(&self) -> Option<(K, Arc<V>)> {
        self.locked(|core| {
            core.peek_lru()
                .map(|(key, value)| (key.clone(), Arc::clone(value)))
        })
    }

    /// Position in recency order (0 = most recent). O(n) under the lock.
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        self.locked(|core| core.recency_rank(key))
    }

    /// Keys from most to least recently used, as of one instant.
    pub fn keys(&self) -> Vec<K> {
        self.locked(|core| core.keys())
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.locked(|core| core.check_invariants())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.locked(|core| core.snapshot())
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn put<Q>(&self, key: Q, value: V) -> Result<(), CacheError>
    where
        Q: Into<Option<K>>,
    {
        let key = key.into().ok_or(CacheError::InvalidArgument(ABSENT_KEY))?;
        let value = Arc::new(value);
        self.locked(|core| {
            core.insert(key, value);
        });
        Ok(())
    }

    fn get<'k, Q>(&self, key: Q) -> Result<Option<Arc<V>>, CacheError>
    where
        Q: Into<Option<&'k K>>,
        K: 'k,
    {
        let key = key.into().ok_or(CacheError::InvalidArgument(ABSENT_KEY))?;
        Ok(self.locked(|core| core.get(key).map(Arc::clone)))
    }

    fn remove<'k, Q>(&self, key: Q) -> Result<Option<Arc<V>>, CacheError>
    where
        Q: Into<Option<&'k K>>,
        K: 'k,
    {
        let key = key.into().ok_or(CacheError::InvalidArgument(ABSENT_KEY))?;
        Ok(self.locked(|core| core.remove(key)))
    }

    fn len(&self) -> usize {
        self.locked(|core| core.len())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&self) {
        self.locked(|core| core.clear());
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &Cache::len(self))
            .finish_non_exhaustive()
    }
}
