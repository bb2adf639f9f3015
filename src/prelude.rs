pub use crate::builder::{CacheBuilder, CacheConfig, CachePolicy, PolicyCache, create_cache};
pub use crate::ds::{KeyIndex, RecencyList, SlotArena, SlotId};
pub use crate::error::{CacheError, InvariantError};
pub use crate::manager::CacheManager;
#[cfg(feature = "metrics")]
pub use crate::metrics::{LruMetricsSnapshot, MetricsSnapshotProvider};
pub use crate::policy::lru::{LruCache, LruCore};
pub use crate::traits::{Cache, CoreCache, LruCacheTrait, MutableCache};
