//! Eviction policy implementations.
//!
//! | Policy | File     | Status                                         |
//! |--------|----------|------------------------------------------------|
//! | LRU    | `lru.rs` | Implemented                                    |
//! | FIFO   | -        | Selector only; the factory rejects it          |
//!
//! A new policy adds a module here, a [`CachePolicy`](crate::builder::CachePolicy)
//! variant, and one arm in [`create_cache`](crate::builder::create_cache).

pub mod lru;
