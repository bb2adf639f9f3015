//! Registry of named caches.
//!
//! [`CacheManager`] owns a map from name to shared cache handle. Each cache
//! keeps its own lock, so the registry lock is only held while the map itself
//! is read or changed, never across cache operations.
//!
//! ```text
//!   CacheManager
//!   ┌──────────────────────────────────────────────┐
//!   │ RwLock<FxHashMap<String, Arc<PolicyCache>>>  │
//!   │   "sessions" ──► Arc ──► PolicyCache (LRU)   │
//!   │   "pages"    ──► Arc ──► PolicyCache (LRU)   │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! Registering a name that already exists replaces the previous cache. Handles
//! already given out keep working on the old instance.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::builder::{CachePolicy, PolicyCache, create_cache};
use crate::error::CacheError;

const EMPTY_NAME: &str = "cache name must not be empty";

/// Thread-safe registry of named caches sharing one key and value type.
///
/// # Example
///
/// ```
/// use lrukit::builder::CachePolicy;
/// use lrukit::manager::CacheManager;
/// use lrukit::traits::Cache;
///
/// let manager: CacheManager<String, u64> = CacheManager::new();
/// let users = manager.create_named_cache("users", CachePolicy::Lru, 100).unwrap();
/// users.put("alice".to_string(), 1).unwrap();
///
/// let again = manager.get_cache("users").unwrap();
/// assert_eq!(again.get(&"alice".to_string()).unwrap().as_deref(), Some(&1));
/// assert!(manager.get_cache("missing").is_none());
/// ```
pub struct CacheManager<K, V>
where
    K: Clone + Eq + Hash,
{
    caches: RwLock<FxHashMap<String, Arc<PolicyCache<K, V>>>>,
}

impl<K, V> CacheManager<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            caches: RwLock::new(FxHashMap::default()),
        }
    }

    /// Builds a cache and registers it under `name`.
    ///
    /// The cache is constructed before the registry lock is taken, so a failed
    /// construction leaves the registry unchanged. An existing entry with the
    /// same name is replaced.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidArgument`] for an empty name or a zero capacity.
    /// - [`CacheError::UnsupportedPolicy`] for a policy without an implementation.
    pub fn create_named_cache(
        &self,
        name: impl Into<String>,
        policy: CachePolicy,
        capacity: usize,
    ) -> Result<Arc<PolicyCache<K, V>>, CacheError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CacheError::InvalidArgument(EMPTY_NAME));
        }

        let cache = Arc::new(create_cache(policy, capacity)?);
        let previous = self
            .caches
            .write()
            .insert(name.clone(), Arc::clone(&cache));

        match previous {
            Some(_) => warn!("replaced existing cache '{}' ({}, capacity {})", name, policy, capacity),
            None => info!("created cache '{}' ({}, capacity {})", name, policy, capacity),
        }
        Ok(cache)
    }

    /// Looks up a cache by name.
    pub fn get_cache(&self, name: &str) -> Option<Arc<PolicyCache<K, V>>> {
        self.caches.read().get(name).cloned()
    }

    /// Snapshot of every registered cache, ordered by name.
    ///
    /// Later registrations do not show up in a snapshot already taken.
    pub fn list_caches(&self) -> BTreeMap<String, Arc<PolicyCache<K, V>>> {
        self.caches
            .read()
            .iter()
            .map(|(name, cache)| (name.clone(), Arc::clone(cache)))
            .collect()
    }

    /// Unregisters `name`, returning its cache if it was present.
    pub fn remove_cache(&self, name: &str) -> Option<Arc<PolicyCache<K, V>>> {
        let removed = self.caches.write().remove(name);
        if removed.is_some() {
            debug!("removed cache '{}'", name);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }
}

impl<K, V> Default for CacheManager<K, V>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for CacheManager<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.list_caches().into_keys().collect();
        f.debug_struct("CacheManager").field("caches", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Cache;

    #[test]
    fn create_and_lookup() {
        let manager: CacheManager<u32, u32> = CacheManager::new();
        let cache = manager.create_named_cache("a", CachePolicy::Lru, 4).unwrap();
        cache.put(1, 10).unwrap();

        let found = manager.get_cache("a").unwrap();
        assert!(Arc::ptr_eq(&cache, &found));
        assert_eq!(found.get(&1).unwrap().as_deref(), Some(&10));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn missing_name_is_none() {
        let manager: CacheManager<u32, u32> = CacheManager::new();
        assert!(manager.get_cache("nope").is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let manager: CacheManager<u32, u32> = CacheManager::new();
        let err = manager.create_named_cache("", CachePolicy::Lru, 4).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArgument(_)));
        assert!(manager.is_empty());
    }

    #[test]
    fn failed_construction_leaves_registry_unchanged() {
        let manager: CacheManager<u32, u32> = CacheManager::new();
        let original = manager.create_named_cache("a", CachePolicy::Lru, 4).unwrap();

        let err = manager.create_named_cache("a", CachePolicy::Fifo, 4).unwrap_err();
        assert_eq!(err, CacheError::UnsupportedPolicy(CachePolicy::Fifo));
        assert!(manager.create_named_cache("b", CachePolicy::Lru, 0).is_err());

        assert_eq!(manager.len(), 1);
        assert!(Arc::ptr_eq(&original, &manager.get_cache("a").unwrap()));
    }

    #[test]
    fn duplicate_name_replaces_previous() {
        let manager: CacheManager<u32, u32> = CacheManager::new();
        let first = manager.create_named_cache("a", CachePolicy::Lru, 4).unwrap();
        first.put(1, 1).unwrap();

        let second = manager.create_named_cache("a", CachePolicy::Lru, 8).unwrap();
        let current = manager.get_cache("a").unwrap();
        assert!(Arc::ptr_eq(&second, &current));
        assert_eq!(current.capacity(), 8);
        assert!(current.is_empty());

        // the old handle still works on its own instance
        assert_eq!(first.get(&1).unwrap().as_deref(), Some(&1));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn list_caches_is_sorted_snapshot() {
        let manager: CacheManager<u32, u32> = CacheManager::new();
        manager.create_named_cache("b", CachePolicy::Lru, 1).unwrap();
        manager.create_named_cache("a", CachePolicy::Lru, 1).unwrap();

        let snapshot = manager.list_caches();
        manager.create_named_cache("c", CachePolicy::Lru, 1).unwrap();

        let names: Vec<_> = snapshot.keys().cloned().collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn remove_cache_unregisters() {
        let manager: CacheManager<u32, u32> = CacheManager::new();
        manager.create_named_cache("a", CachePolicy::Lru, 1).unwrap();
        assert!(manager.remove_cache("a").is_some());
        assert!(manager.remove_cache("a").is_none());
        assert!(manager.get_cache("a").is_none());
    }

    #[test]
    fn debug_lists_names() {
        let manager: CacheManager<u32, u32> = CacheManager::default();
        manager.create_named_cache("x", CachePolicy::Lru, 1).unwrap();
        assert_eq!(format!("{:?}", manager), r#"CacheManager { caches: ["x"] }"#);
    }
}
