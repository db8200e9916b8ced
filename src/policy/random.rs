use super::{EvictionPolicy, VictimCandidate};

use rand::seq::IteratorRandom;

/// Evicts a uniformly random entry when the shard is full.
///
/// Unlike [`ArbitraryPolicy`](super::ArbitraryPolicy), which only looks
/// random, this policy samples the candidate set uniformly.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPolicy;

impl<K: Clone> EvictionPolicy<K> for RandomPolicy {
  fn select_victim(
    &self,
    candidates: &mut dyn Iterator<Item = VictimCandidate<'_, K>>,
  ) -> Option<K> {
    let mut rng = rand::rng();
    candidates
      .choose(&mut rng)
      .map(|candidate| candidate.key.clone())
  }
}
