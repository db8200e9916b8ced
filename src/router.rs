use crate::engine::Engine;
use crate::error::CacheError;
use crate::metrics::Stats;

use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

/// A helper function to hash a key using a `BuildHasher`.
#[inline]
pub(crate) fn hash_key<K: Hash, H: BuildHasher>(hasher: &H, key: &K) -> u64 {
  let mut state = hasher.build_hasher();
  key.hash(&mut state);
  state.finish()
}

/// Routes operations across N independently-locked engines.
///
/// Each key is owned by exactly one engine, selected by `hash(key) mod N`,
/// so operations on different shards never contend for the same lock. The
/// element type is the concrete leaf [`Engine`], which makes a
/// router-of-routers unrepresentable.
pub(crate) struct Router<K, V, H> {
  shards: Box<[Engine<K, V, H>]>,
  hasher: H,
}

impl<K, V, H> Router<K, V, H> {
  pub(crate) fn shard_count(&self) -> usize {
    self.shards.len()
  }
}

impl<K, V, H> Router<K, V, H>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
  H: BuildHasher + Send + Sync + 'static,
{
  pub(crate) fn new(shards: Vec<Engine<K, V, H>>, hasher: H) -> Self {
    debug_assert!(!shards.is_empty());
    Self {
      shards: shards.into_boxed_slice(),
      hasher,
    }
  }

  /// Returns the engine that owns `key`. The same key always routes to the
  /// same shard.
  #[inline]
  fn shard_for(&self, key: &K) -> &Engine<K, V, H> {
    let index = hash_key(&self.hasher, key) as usize % self.shards.len();
    &self.shards[index]
  }

  pub(crate) fn get(&self, key: &K) -> Result<Arc<V>, CacheError<K>> {
    self.shard_for(key).get(key)
  }

  pub(crate) fn put(&self, key: K, value: V) {
    self.shard_for(&key).put(key, value);
  }

  /// Routes each key to its owning shard independently; the keys of one call
  /// need not share a shard.
  pub(crate) fn invalidate<'a, I>(&self, keys: I)
  where
    I: IntoIterator<Item = &'a K>,
    K: 'a,
  {
    for key in keys {
      self.shard_for(key).invalidate(std::iter::once(key));
    }
  }

  pub(crate) fn invalidate_all(&self) {
    for shard in self.shards.iter() {
      shard.invalidate_all();
    }
  }

  pub(crate) fn close(&self) {
    for shard in self.shards.iter() {
      shard.close();
    }
  }

  /// One live view summing every shard's counters. The aggregate is always
  /// the exact sum of the per-shard stats at the moment of each field read.
  pub(crate) fn stats(&self) -> Stats {
    Stats::new(self.shards.iter().map(|shard| shard.metrics()).collect())
  }

  pub(crate) fn len(&self) -> usize {
    self.shards.iter().map(|shard| shard.len()).sum()
  }
}
