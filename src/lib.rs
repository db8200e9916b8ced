//! A concurrent, in-process loading cache.
//!
//! `loadcache` is a key/value store that can populate itself on demand via a
//! caller-supplied loader, expire entries by time since last write and/or
//! last read, bound its size with a pluggable eviction policy, partition
//! itself into independently-locked shards, and notify listeners when
//! entries are removed.
//!
//! # Features
//! - **Loading**: a miss invokes the configured loader under the shard's
//!   write lock, so concurrent requesters of a missing key all observe one
//!   load.
//! - **Expiry**: expire-after-write and expire-after-read windows, checked
//!   lazily on access and, optionally, by a background sweeper.
//! - **Bounded size**: a per-shard maximum with a swappable victim-selection
//!   policy (arbitrary, LRU, random).
//! - **Sharding**: `hash(key) mod N` routing over independent engines; the
//!   only source of true parallelism.
//! - **Removal listeners**: one notification per removed entry, fanned out
//!   concurrently and joined before the removing operation completes.
//! - **Testable time**: every expiry decision consults a substitutable
//!   [`Clock`].
//!
//! # Example
//! ```
//! use loadcache::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!   .loader(|key: &u32| Ok(key.to_string()))
//!   .build()
//!   .unwrap();
//!
//! assert_eq!(*cache.get(&7).unwrap(), "7");
//! ```

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod listener;
pub mod metrics;
pub mod policy;
pub mod time;

// Internal, crate-only modules
mod cache;
mod engine;
mod entry;
mod router;
mod task;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::{BoxError, BuildError, CacheError};
pub use listener::{RemovalListener, RemovalNotification, RemovalReason};
pub use metrics::{Stats, StatsSnapshot};
pub use policy::{ArbitraryPolicy, EvictionPolicy, LruPolicy, RandomPolicy, VictimCandidate};
pub use time::{Clock, MockClock, SystemClock};
