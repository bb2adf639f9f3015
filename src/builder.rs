//! Policy selection and cache construction.
//!
//! [`CachePolicy`] is a closed set of eviction policies. [`create_cache`] (and
//! the fluent [`CacheBuilder`]) turn a selector plus a capacity into a
//! [`PolicyCache`], a thin wrapper that dispatches the [`Cache`] contract to
//! the concrete engine.
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::{CacheBuilder, CachePolicy};
//! use lrukit::traits::Cache;
//!
//! let cache = CacheBuilder::new(100)
//!     .policy(CachePolicy::Lru)
//!     .build::<u64, String>()
//!     .unwrap();
//! cache.put(1, "hello".to_string()).unwrap();
//! assert_eq!(cache.get(&1).unwrap().as_deref().map(String::as_str), Some("hello"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use log::warn;

use crate::error::CacheError;
use crate::policy::lru::LruCache;
use crate::traits::Cache;

/// Available cache eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    #[default]
    Lru,
    /// First In, First Out eviction. Recognised but not implemented; the
    /// factory rejects it with [`CacheError::UnsupportedPolicy`].
    Fifo,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::Lru => f.write_str("LRU"),
            CachePolicy::Fifo => f.write_str("FIFO"),
        }
    }
}

/// Configuration for cache creation.
///
/// | Field      | Type          | Default | Description                          |
/// |------------|---------------|---------|--------------------------------------|
/// | `capacity` | `usize`       | 1000    | Maximum number of entries (> 0)      |
/// | `policy`   | `CachePolicy` | `Lru`   | Eviction policy                      |
/// | `prealloc` | `bool`        | true    | Reserve index/arena storage up front |
///
/// # Example
///
/// ```
/// use lrukit::builder::{CacheBuilder, CacheConfig};
///
/// let config = CacheConfig {
///     capacity: 64,
///     ..Default::default()
/// };
/// let cache = CacheBuilder::from(config).build::<u32, u32>().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    pub capacity: usize,

    /// Eviction policy to construct.
    pub policy: CachePolicy,

    /// Pre-allocate storage for the full capacity, capped at
    /// [`PREALLOC_LIMIT`](crate::policy::lru::PREALLOC_LIMIT) entries.
    ///
    /// When false, storage grows as entries arrive.
    pub prealloc: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            policy: CachePolicy::Lru,
            prealloc: true,
        }
    }
}

/// A cache built by the factory, whatever its policy.
pub struct PolicyCache<K, V>
where
    K: Clone + Eq + Hash,
{
    inner: PolicyInner<K, V>,
}

enum PolicyInner<K, V>
where
    K: Clone + Eq + Hash,
{
    Lru(LruCache<K, V>),
}

impl<K, V> PolicyCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// The policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            PolicyInner::Lru(_) => CachePolicy::Lru,
        }
    }

    /// The underlying LRU engine, for LRU-only operations such as `peek`.
    pub fn as_lru(&self) -> Option<&LruCache<K, V>> {
        match &self.inner {
            PolicyInner::Lru(lru) => Some(lru),
        }
    }
}

impl<K, V> Cache<K, V> for PolicyCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn put<Q>(&self, key: Q, value: V) -> Result<(), CacheError>
    where
        Q: Into<Option<K>>,
    {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.put(key, value),
        }
    }

    fn get<'k, Q>(&self, key: Q) -> Result<Option<Arc<V>>, CacheError>
    where
        Q: Into<Option<&'k K>>,
        K: 'k,
    {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.get(key),
        }
    }

    fn remove<'k, Q>(&self, key: Q) -> Result<Option<Arc<V>>, CacheError>
    where
        Q: Into<Option<&'k K>>,
        K: 'k,
    {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.remove(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.capacity(),
        }
    }

    fn clear(&self) {
        match &self.inner {
            PolicyInner::Lru(lru) => lru.clear(),
        }
    }
}

impl<K, V> fmt::Debug for PolicyCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyCache")
            .field("policy", &self.policy())
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    config: CacheConfig,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity and the default
    /// (LRU) policy.
    pub fn new(capacity: usize) -> Self {
        Self {
            config: CacheConfig {
                capacity,
                ..CacheConfig::default()
            },
        }
    }

    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn prealloc(mut self, prealloc: bool) -> Self {
        self.config.prealloc = prealloc;
        self
    }

    /// Build a cache from the accumulated configuration.
    ///
    /// # Errors
    ///
    /// - [`CacheError::UnsupportedPolicy`] for a policy without an implementation.
    /// - [`CacheError::InvalidArgument`] for a zero capacity.
    pub fn build<K, V>(self) -> Result<PolicyCache<K, V>, CacheError>
    where
        K: Clone + Eq + Hash,
    {
        let CacheConfig {
            capacity,
            policy,
            prealloc,
        } = self.config;

        let inner = match policy {
            CachePolicy::Lru => PolicyInner::Lru(LruCache::with_prealloc(capacity, prealloc)?),
            CachePolicy::Fifo => {
                warn!("rejected cache request for unimplemented policy {}", policy);
                return Err(CacheError::UnsupportedPolicy(policy));
            },
        };

        Ok(PolicyCache { inner })
    }
}

impl From<CacheConfig> for CacheBuilder {
    fn from(config: CacheConfig) -> Self {
        Self { config }
    }
}

/// Builds a cache for `policy` holding at most `capacity` entries.
///
/// # Example
///
/// ```
/// use lrukit::builder::{CachePolicy, create_cache};
/// use lrukit::error::CacheError;
/// use lrukit::traits::Cache;
///
/// let cache = create_cache::<&str, i32>(CachePolicy::Lru, 2).unwrap();
/// assert_eq!(cache.capacity(), 2);
///
/// assert_eq!(
///     create_cache::<&str, i32>(CachePolicy::Fifo, 2).unwrap_err(),
///     CacheError::UnsupportedPolicy(CachePolicy::Fifo)
/// );
/// ```
pub fn create_cache<K, V>(policy: CachePolicy, capacity: usize) -> Result<PolicyCache<K, V>, CacheError>
where
    K: Clone + Eq + Hash,
{
    CacheBuilder::new(capacity).policy(policy).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_policy_basic_ops() {
        let cache = create_cache::<u64, String>(CachePolicy::Lru, 10).unwrap();
        assert_eq!(cache.policy(), CachePolicy::Lru);

        cache.put(1, "one".to_string()).unwrap();
        cache.put(2, "two".to_string()).unwrap();
        assert_eq!(cache.get(&1).unwrap().as_deref().map(String::as_str), Some("one"));
        assert!(cache.get(&3).unwrap().is_none());
        assert_eq!(cache.len(), 2);

        cache.put(1, "ONE".to_string()).unwrap();
        assert_eq!(cache.get(&1).unwrap().as_deref().map(String::as_str), Some("ONE"));
        assert_eq!(cache.len(), 2);

        assert!(cache.remove(&2).unwrap().is_some());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn capacity_enforcement() {
        let cache = create_cache::<u64, u64>(CachePolicy::Lru, 2).unwrap();
        cache.put(1, 1).unwrap();
        cache.put(2, 2).unwrap();
        cache.put(3, 3).unwrap();

        assert_eq!(cache.len(), 2);
        let lru = cache.as_lru().unwrap();
        assert!(!lru.contains(&1));
        assert!(lru.contains(&2));
        assert!(lru.contains(&3));
    }

    #[test]
    fn fifo_is_unsupported() {
        let err = create_cache::<u64, u64>(CachePolicy::Fifo, 4).unwrap_err();
        assert_eq!(err, CacheError::UnsupportedPolicy(CachePolicy::Fifo));
    }

    #[test]
    fn unsupported_policy_wins_over_bad_capacity() {
        let err = create_cache::<u64, u64>(CachePolicy::Fifo, 0).unwrap_err();
        assert_eq!(err, CacheError::UnsupportedPolicy(CachePolicy::Fifo));
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let err = create_cache::<u64, u64>(CachePolicy::Lru, 0).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArgument(_)));
    }

    #[test]
    fn builder_from_config() {
        let config = CacheConfig {
            capacity: 3,
            prealloc: false,
            ..Default::default()
        };
        let cache = CacheBuilder::from(config).build::<u32, u32>().unwrap();
        assert_eq!(cache.capacity(), 3);
        assert_eq!(cache.policy(), CachePolicy::Lru);
    }

    #[test]
    fn absent_key_propagates_through_wrapper() {
        let cache = CacheBuilder::new(2).build::<u32, u32>().unwrap();
        assert!(matches!(cache.put(None, 1), Err(CacheError::InvalidArgument(_))));
        assert!(matches!(cache.get(None), Err(CacheError::InvalidArgument(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn huge_capacity_builds_with_default_config() {
        let cache = create_cache::<u64, u64>(CachePolicy::Lru, usize::MAX).unwrap();
        cache.put(1, 1).unwrap();
        assert_eq!(cache.get(&1).unwrap().as_deref(), Some(&1));
        assert_eq!(cache.capacity(), usize::MAX);
    }

    #[test]
    fn default_config_values() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.policy, CachePolicy::Lru);
        assert!(config.prealloc);
        assert_eq!(CachePolicy::default(), CachePolicy::Lru);
    }

    #[test]
    fn debug_names_policy() {
        let cache = create_cache::<u32, u32>(CachePolicy::Lru, 4).unwrap();
        assert_eq!(
            format!("{:?}", cache),
            "PolicyCache { policy: Lru, capacity: 4, len: 0 }"
        );
    }
}
