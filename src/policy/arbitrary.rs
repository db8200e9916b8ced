use super::{EvictionPolicy, VictimCandidate};

/// The default size-eviction policy: evicts whichever entry the shard's map
/// iteration yields first.
///
/// This carries no ordering guarantee whatsoever. It is not LRU and it is
/// not uniformly random; with a randomized hasher it merely tends to spread
/// evictions around. Choose [`LruPolicy`](super::LruPolicy) or
/// [`RandomPolicy`](super::RandomPolicy) when the victim matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArbitraryPolicy;

impl<K: Clone> EvictionPolicy<K> for ArbitraryPolicy {
  fn select_victim(
    &self,
    candidates: &mut dyn Iterator<Item = VictimCandidate<'_, K>>,
  ) -> Option<K> {
    candidates.next().map(|candidate| candidate.key.clone())
  }
}
