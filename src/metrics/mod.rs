//! Operation counters for cache cores (feature `metrics`).
//!
//! Recorders only write counters; snapshot providers only read them. Cores
//! hold a recorder by value and update it inside their own critical section,
//! so no atomics are involved.

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::LruMetrics;
pub use snapshot::LruMetricsSnapshot;
pub use traits::{CoreMetricsRecorder, LruMetricsRecorder, MetricsSnapshotProvider};
