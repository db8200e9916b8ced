use super::{EvictionPolicy, VictimCandidate};

/// Evicts the entry with the oldest last-read timestamp.
///
/// The shard's map keeps no recency ordering, so selection is a full scan of
/// the shard under its write lock. This is best-effort LRU: the last-read
/// timestamp is refreshed outside the lock on a hit, so a concurrent read
/// can lose the race and its entry may still be chosen.
#[derive(Debug, Default, Clone, Copy)]
pub struct LruPolicy;

impl<K: Clone> EvictionPolicy<K> for LruPolicy {
  fn select_victim(
    &self,
    candidates: &mut dyn Iterator<Item = VictimCandidate<'_, K>>,
  ) -> Option<K> {
    candidates
      .min_by_key(|candidate| candidate.last_read)
      .map(|candidate| candidate.key.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn picks_least_recently_read() {
    let keys = ["a", "b", "c"];
    let reads = [30_u64, 10, 20];
    let mut candidates = keys.iter().zip(reads).map(|(key, last_read)| VictimCandidate {
      key,
      last_read,
      last_write: 0,
    });
    let victim = LruPolicy.select_victim(&mut candidates);
    assert_eq!(victim, Some("b"));
  }
}
