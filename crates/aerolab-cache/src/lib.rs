//! # aerolab-cache
//!
//! In-memory cache of solver results. Entries are keyed by a content hash of
//! the canonical geometry and flow condition, expire after a fixed TTL, and
//! are evicted least-recently-used first once the capacity bound is reached.
#![warn(missing_docs)]

pub mod cache;
pub mod key;
pub mod stats;

pub use cache::{CacheOptions, ResultCache};
pub use key::CacheKey;
pub use stats::{AtomicCacheStats, CacheStats};
