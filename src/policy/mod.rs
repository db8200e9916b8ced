pub mod arbitrary;
pub mod lru;
pub mod random;

pub use arbitrary::ArbitraryPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

/// Per-entry metadata handed to an eviction policy while it selects a
/// victim. Timestamps are nanoseconds since the cache's internal epoch and
/// are only meaningful relative to each other.
#[derive(Debug)]
pub struct VictimCandidate<'a, K> {
  pub key: &'a K,
  /// When the entry was last read.
  pub last_read: u64,
  /// When the entry was written.
  pub last_write: u64,
}

/// A strategy for choosing which entry to remove when an insert would push a
/// shard past its maximum size.
///
/// The policy is consulted with the shard's write lock held, once per
/// over-capacity insert, and sees every entry currently in the shard. It
/// returns the key of the entry to evict, or `None` to admit the insert
/// without evicting (only sensible for an empty candidate set).
pub trait EvictionPolicy<K>: Send + Sync {
  fn select_victim(&self, candidates: &mut dyn Iterator<Item = VictimCandidate<'_, K>>)
    -> Option<K>;
}
