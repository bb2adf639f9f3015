//! Error types for the lrukit library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Returned by the cache contract, the policy factory and the
//!   named-cache registry. Every variant is deterministic: retrying the same
//!   call with the same input fails the same way.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::builder::{CachePolicy, create_cache};
//! use lrukit::error::CacheError;
//!
//! let err = create_cache::<u64, u64>(CachePolicy::Lru, 0).unwrap_err();
//! assert!(matches!(err, CacheError::InvalidArgument(_)));
//!
//! let err = create_cache::<u64, u64>(CachePolicy::Fifo, 8).unwrap_err();
//! assert_eq!(err, CacheError::UnsupportedPolicy(CachePolicy::Fifo));
//! ```

use thiserror::Error;

use crate::builder::CachePolicy;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Errors surfaced by cache operations and cache construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The caller passed an input that can never succeed: an absent key, a
    /// zero capacity or an empty cache name. Fix the call site.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The policy selector is recognised but has no implementation.
    #[error("unsupported eviction policy: {0}")]
    UnsupportedPolicy(CachePolicy),
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`LruCore::check_invariants`](crate::policy::lru::LruCore::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- CacheError -------------------------------------------------------

    #[test]
    fn invalid_argument_display_includes_reason() {
        let err = CacheError::InvalidArgument("key is absent");
        assert_eq!(err.to_string(), "invalid argument: key is absent");
    }

    #[test]
    fn unsupported_policy_display_names_policy() {
        let err = CacheError::UnsupportedPolicy(CachePolicy::Fifo);
        assert_eq!(err.to_string(), "unsupported eviction policy: FIFO");
    }

    #[test]
    fn cache_error_clone_and_eq() {
        let a = CacheError::InvalidArgument("x");
        assert_eq!(a.clone(), a);
        assert_ne!(a, CacheError::UnsupportedPolicy(CachePolicy::Fifo));
    }

    #[test]
    fn cache_error_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CacheError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index/list length mismatch");
        assert_eq!(err.to_string(), "index/list length mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }
}
