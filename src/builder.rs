use crate::cache::Cache;
use crate::engine::{Engine, EngineConfig, LoaderFn};
use crate::error::{BoxError, BuildError};
use crate::listener::RemovalListener;
use crate::policy::{ArbitraryPolicy, EvictionPolicy};
use crate::router::Router;
use crate::time::{Clock, SystemClock};

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// A builder for [`Cache`] instances. Every knob is independently optional.
///
/// ```
/// use loadcache::CacheBuilder;
/// use std::time::Duration;
///
/// let cache: loadcache::Cache<String, u64> = CacheBuilder::new()
///   .expire_after_write(Duration::from_secs(60))
///   .max_size(10_000)
///   .build()
///   .unwrap();
/// cache.put("a".to_string(), 1);
/// ```
pub struct CacheBuilder<K, V, H = ahash::RandomState> {
  clock: Arc<dyn Clock>,
  expire_after_write: Option<Duration>,
  expire_after_read: Option<Duration>,
  loader: Option<LoaderFn<K, V>>,
  max_size: Option<u64>,
  listeners: Vec<Arc<dyn RemovalListener<K, V>>>,
  shards: usize,
  hasher: H,
  policy: Arc<dyn EvictionPolicy<K>>,
  sweep_interval: Option<Duration>,
  _value_marker: PhantomData<V>,
}

impl<K, V, H> fmt::Debug for CacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("expire_after_write", &self.expire_after_write)
      .field("expire_after_read", &self.expire_after_read)
      .field("max_size", &self.max_size)
      .field("shards", &self.shards)
      .field("sweep_interval", &self.sweep_interval)
      .field("has_loader", &self.loader.is_some())
      .field("listeners", &self.listeners.len())
      .finish_non_exhaustive()
  }
}

impl<K, V, H> CacheBuilder<K, V, H>
where
  K: Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Overrides the cache's clock. Useful for testing, where controlling
  /// time matters; see [`MockClock`](crate::MockClock).
  pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// Expires entries a given duration after they were written. A zero
  /// duration disables write expiry.
  pub fn expire_after_write(mut self, duration: Duration) -> Self {
    self.expire_after_write = non_zero(duration);
    self
  }

  /// Expires entries a given duration after they were last read. A zero
  /// duration disables read expiry.
  pub fn expire_after_read(mut self, duration: Duration) -> Self {
    self.expire_after_read = non_zero(duration);
    self
  }

  /// Configures a loading function, called on a miss to compute the value
  /// for a key. The loader runs under its shard's write lock: loads on one
  /// shard serialize behind one another, and a hung loader blocks that
  /// shard. A failed load is returned to the caller and never cached.
  pub fn loader(
    mut self,
    loader: impl Fn(&K) -> Result<V, BoxError> + Send + Sync + 'static,
  ) -> Self {
    self.loader = Some(Arc::new(loader));
    self
  }

  /// Limits the number of entries. When the cache is sharded, the limit
  /// applies to each shard, so overall capacity is `max_size * shards`.
  /// Zero means unbounded.
  pub fn max_size(mut self, max_size: u64) -> Self {
    self.max_size = (max_size > 0).then_some(max_size);
    self
  }

  /// Registers a removal listener. Listeners can be registered repeatedly;
  /// each removal notifies all of them.
  pub fn removal_listener(mut self, listener: impl RemovalListener<K, V> + 'static) -> Self {
    self.listeners.push(Arc::new(listener));
    self
  }

  /// Sets how many independently-locked shards the cache uses. Sharding is
  /// the cache's only parallelism lever: operations on different shards
  /// never contend. Defaults to 1 (unsharded). Zero is a build error.
  pub fn shards(mut self, shards: usize) -> Self {
    self.shards = shards;
    self
  }

  /// Sets the strategy used to pick a victim when an insert would push a
  /// shard past its maximum size. Defaults to [`ArbitraryPolicy`].
  pub fn eviction_policy(mut self, policy: impl EvictionPolicy<K> + 'static) -> Self {
    self.policy = Arc::new(policy);
    self
  }

  /// Enables a background sweeper per shard that evicts expired entries on
  /// the given interval. Without one, expired entries are only removed
  /// lazily, on access or ahead of a write. Call
  /// [`Cache::close`](crate::Cache::close) to stop the sweeper threads. A
  /// zero interval disables the sweeper.
  pub fn sweep_interval(mut self, interval: Duration) -> Self {
    self.sweep_interval = non_zero(interval);
    self
  }

  /// Sets the hasher used for both the per-shard maps and shard routing.
  pub fn hasher<H2: BuildHasher>(self, hasher: H2) -> CacheBuilder<K, V, H2> {
    CacheBuilder {
      clock: self.clock,
      expire_after_write: self.expire_after_write,
      expire_after_read: self.expire_after_read,
      loader: self.loader,
      max_size: self.max_size,
      listeners: self.listeners,
      shards: self.shards,
      hasher,
      policy: self.policy,
      sweep_interval: self.sweep_interval,
      _value_marker: PhantomData,
    }
  }
}

impl<K, V> CacheBuilder<K, V, ahash::RandomState>
where
  K: Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Creates a new `CacheBuilder` with default settings: unbounded, no
  /// expiry, no loader, one shard, no sweeper, the default hasher.
  pub fn new() -> Self {
    Self {
      clock: Arc::new(SystemClock),
      expire_after_write: None,
      expire_after_read: None,
      loader: None,
      max_size: None,
      listeners: Vec::new(),
      shards: 1,
      hasher: ahash::RandomState::default(),
      policy: Arc::new(ArbitraryPolicy),
      sweep_interval: None,
      _value_marker: PhantomData,
    }
  }
}

impl<K, V> Default for CacheBuilder<K, V, ahash::RandomState>
where
  K: Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V, H> CacheBuilder<K, V, H>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
  H: BuildHasher + Clone + Send + Sync + 'static,
{
  /// Builds the cache. Invalid configuration surfaces here, not at first
  /// use.
  pub fn build(self) -> Result<Cache<K, V, H>, BuildError> {
    if self.shards == 0 {
      return Err(BuildError::ZeroShards);
    }

    let config = EngineConfig {
      clock: self.clock,
      expire_after_write: self.expire_after_write,
      expire_after_read: self.expire_after_read,
      loader: self.loader,
      max_size: self.max_size,
      listeners: self.listeners.into(),
      policy: self.policy,
      sweep_interval: self.sweep_interval,
    };

    if self.shards == 1 {
      return Ok(Cache::single(Engine::new(config, self.hasher)));
    }

    // Each shard is an independent engine built from the same base
    // configuration; max_size and the sweeper apply per shard.
    let engines = (0..self.shards)
      .map(|_| Engine::new(config.clone(), self.hasher.clone()))
      .collect();
    Ok(Cache::sharded(Router::new(engines, self.hasher)))
  }
}

#[inline]
fn non_zero(duration: Duration) -> Option<Duration> {
  (!duration.is_zero()).then_some(duration)
}
