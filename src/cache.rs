use crate::builder::CacheBuilder;
use crate::engine::Engine;
use crate::error::CacheError;
use crate::metrics::Stats;
use crate::router::Router;

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// A concurrent, in-process loading cache.
///
/// Built via [`CacheBuilder`]. A cache with one shard is a single engine
/// behind one lock; with more shards, each operation is routed to the engine
/// owning its key, and engines never contend with each other.
///
/// All methods take `&self`; the cache is `Send + Sync` and is typically
/// shared behind an `Arc`.
pub struct Cache<K, V, H = ahash::RandomState> {
  inner: CacheInner<K, V, H>,
}

enum CacheInner<K, V, H> {
  Single(Engine<K, V, H>),
  Sharded(Router<K, V, H>),
}

impl<K, V> Cache<K, V, ahash::RandomState>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Starts building a cache with the default hasher.
  pub fn builder() -> CacheBuilder<K, V> {
    CacheBuilder::new()
  }
}

impl<K, V, H> Cache<K, V, H>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
  H: BuildHasher + Send + Sync + 'static,
{
  pub(crate) fn single(engine: Engine<K, V, H>) -> Self {
    Self {
      inner: CacheInner::Single(engine),
    }
  }

  pub(crate) fn sharded(router: Router<K, V, H>) -> Self {
    Self {
      inner: CacheInner::Sharded(router),
    }
  }

  /// Returns the value associated with `key`.
  ///
  /// On a miss (or a lazily-detected expired entry) the configured loader is
  /// invoked and its value cached and returned. Without a loader, a miss is
  /// [`CacheError::NotFound`]. The returned `Arc` is a snapshot; it stays
  /// valid after the entry is evicted or replaced.
  pub fn get(&self, key: &K) -> Result<Arc<V>, CacheError<K>> {
    match &self.inner {
      CacheInner::Single(engine) => engine.get(key),
      CacheInner::Sharded(router) => router.get(key),
    }
  }

  /// Adds a value to the cache under `key`, unconditionally replacing any
  /// existing entry.
  pub fn put(&self, key: K, value: V) {
    match &self.inner {
      CacheInner::Single(engine) => engine.put(key, value),
      CacheInner::Sharded(router) => router.put(key, value),
    }
  }

  /// Removes `key` from the cache. A no-op if the key is absent.
  pub fn invalidate(&self, key: &K) {
    self.invalidate_many(std::iter::once(key));
  }

  /// Removes every key in `keys`. On a sharded cache each key is routed to
  /// its owning shard independently.
  pub fn invalidate_many<'a, I>(&self, keys: I)
  where
    I: IntoIterator<Item = &'a K>,
    K: 'a,
  {
    match &self.inner {
      CacheInner::Single(engine) => engine.invalidate(keys),
      CacheInner::Sharded(router) => router.invalidate(keys),
    }
  }

  /// Removes every entry from the cache.
  pub fn invalidate_all(&self) {
    match &self.inner {
      CacheInner::Single(engine) => engine.invalidate_all(),
      CacheInner::Sharded(router) => router.invalidate_all(),
    }
  }

  /// Stops the background sweeper(s) and waits for them to finish. Entries
  /// stay readable afterwards, but no further time-based eviction happens
  /// automatically. Closing an already-closed cache is a no-op. Dropping the
  /// cache closes it implicitly.
  pub fn close(&self) {
    match &self.inner {
      CacheInner::Single(engine) => engine.close(),
      CacheInner::Sharded(router) => router.close(),
    }
  }

  /// Returns a live view of the cache's counters. For a sharded cache the
  /// view sums every shard. See [`Stats`] for its consistency semantics.
  pub fn stats(&self) -> Stats {
    match &self.inner {
      CacheInner::Single(engine) => engine.stats(),
      CacheInner::Sharded(router) => router.stats(),
    }
  }

  /// The number of entries currently in the cache, expired or not.
  pub fn len(&self) -> usize {
    match &self.inner {
      CacheInner::Single(engine) => engine.len(),
      CacheInner::Sharded(router) => router.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<K, V, H> fmt::Debug for Cache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let shards = match &self.inner {
      CacheInner::Single(_) => 1,
      CacheInner::Sharded(router) => router.shard_count(),
    };
    f.debug_struct("Cache").field("shards", &shards).finish()
  }
}
