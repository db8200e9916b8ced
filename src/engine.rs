use crate::entry::CacheEntry;
use crate::error::{BoxError, CacheError};
use crate::listener::{RemovalListener, RemovalNotification, RemovalReason};
use crate::metrics::{Metrics, Stats};
use crate::policy::EvictionPolicy;
use crate::task::sweeper::Sweeper;
use crate::time::{instant_to_nanos, Clock};

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

/// The function invoked to compute a value for a key on a cache miss.
pub(crate) type LoaderFn<K, V> = Arc<dyn Fn(&K) -> Result<V, BoxError> + Send + Sync>;

/// The per-engine configuration, assembled by the builder. When the cache is
/// sharded, every shard carries a clone of the same base configuration.
pub(crate) struct EngineConfig<K, V> {
  pub(crate) clock: Arc<dyn Clock>,
  pub(crate) expire_after_write: Option<Duration>,
  pub(crate) expire_after_read: Option<Duration>,
  pub(crate) loader: Option<LoaderFn<K, V>>,
  /// Maximum entries per engine. `None` means unbounded.
  pub(crate) max_size: Option<u64>,
  pub(crate) listeners: Arc<[Arc<dyn RemovalListener<K, V>>]>,
  pub(crate) policy: Arc<dyn EvictionPolicy<K>>,
  pub(crate) sweep_interval: Option<Duration>,
}

impl<K, V> Clone for EngineConfig<K, V> {
  fn clone(&self) -> Self {
    Self {
      clock: self.clock.clone(),
      expire_after_write: self.expire_after_write,
      expire_after_read: self.expire_after_read,
      loader: self.loader.clone(),
      max_size: self.max_size,
      listeners: self.listeners.clone(),
      policy: self.policy.clone(),
      sweep_interval: self.sweep_interval,
    }
  }
}

type Map<K, V, H> = HashMap<K, Arc<CacheEntry<V>>, H>;

/// The thread-safe core of one shard: the map, its lock, and the counters.
/// Shared with the background sweeper when one is configured.
pub(crate) struct EngineShared<K, V, H> {
  map: RwLock<Map<K, V, H>>,
  metrics: Arc<Metrics>,
  config: EngineConfig<K, V>,
}

/// A single-shard cache engine.
///
/// Owns exactly one map behind one reader-writer lock. Every mutating path
/// holds the write lock for its entire critical section, including the user
/// loader and the removal-listener fan-out; the only parallelism lever is
/// running several engines side by side (see the shard router).
pub(crate) struct Engine<K, V, H> {
  shared: Arc<EngineShared<K, V, H>>,
  sweeper: Mutex<Option<Sweeper>>,
}

impl<K, V, H> Engine<K, V, H>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
  H: BuildHasher + Send + Sync + 'static,
{
  pub(crate) fn new(config: EngineConfig<K, V>, hasher: H) -> Self {
    let shared = Arc::new(EngineShared {
      map: RwLock::new(HashMap::with_hasher(hasher)),
      metrics: Arc::new(Metrics::new()),
      config,
    });

    let sweeper = shared
      .config
      .sweep_interval
      .map(|interval| Sweeper::spawn(shared.clone(), interval));

    Self {
      shared,
      sweeper: Mutex::new(sweeper),
    }
  }

  /// Returns the value for `key`, falling through to the load path on a
  /// miss or on a lazily-detected expired entry.
  ///
  /// The read lock is held only for the existence check and the `Arc`
  /// snapshot of the value; the expiry evaluation and the last-read refresh
  /// happen after it is released.
  pub(crate) fn get(&self, key: &K) -> Result<Arc<V>, CacheError<K>> {
    let entry = {
      let guard = self.shared.map.read();
      guard.get(key).cloned()
    };

    let entry = match entry {
      Some(entry) => entry,
      None => return self.load(key),
    };

    let config = &self.shared.config;
    let now = instant_to_nanos(config.clock.now());
    if entry.is_expired(now, config.expire_after_write, config.expire_after_read) {
      self.shared.evict_if_expired(key);
      return self.load(key);
    }

    entry.touch_read(now);
    self.shared.metrics.hit();
    Ok(entry.value())
  }

  /// The load path, taken by `get` on a miss or after an expiry eviction.
  ///
  /// Holds the write lock for the whole operation, loader call included, so
  /// concurrent misses for any key on this engine collapse behind a single
  /// load. The lock also makes the double-check sound: a racing caller that
  /// loaded the key first is observed here and its value returned as a hit.
  fn load(&self, key: &K) -> Result<Arc<V>, CacheError<K>> {
    let shared = &self.shared;
    let mut guard = shared.map.write();

    if let Some(entry) = guard.get(key) {
      shared.metrics.hit();
      return Ok(entry.value());
    }

    let loader = match &shared.config.loader {
      Some(loader) => loader,
      None => {
        shared.metrics.miss();
        return Err(CacheError::NotFound);
      }
    };

    let load_start = shared.config.clock.now();
    match loader(key) {
      Ok(value) => {
        let elapsed = shared
          .config
          .clock
          .now()
          .saturating_duration_since(load_start);
        shared.metrics.load_success(elapsed);
        Ok(shared.insert_entry(&mut guard, key.clone(), value))
      }
      Err(source) => {
        shared.metrics.load_error();
        Err(CacheError::Load {
          key: key.clone(),
          source,
        })
      }
    }
  }

  /// Inserts `value` under `key`, unconditionally replacing any existing
  /// entry. The replaced entry's notification is fully delivered before the
  /// new value becomes visible.
  pub(crate) fn put(&self, key: K, value: V) {
    let shared = &self.shared;
    let mut guard = shared.map.write();
    shared.pre_write_cleanup(&mut guard);
    if guard.contains_key(&key) {
      shared.evict(&mut guard, &key, RemovalReason::Replaced);
    }
    shared.insert_entry(&mut guard, key, value);
  }

  /// Removes the given keys under a single lock acquisition. Absent keys
  /// are a no-op; present ones are announced to listeners with reason
  /// `Explicit`, but do not count as evictions.
  pub(crate) fn invalidate<'a, I>(&self, keys: I)
  where
    I: IntoIterator<Item = &'a K>,
    K: 'a,
  {
    let mut guard = self.shared.map.write();
    for key in keys {
      if let Some((key, entry)) = guard.remove_entry(key) {
        self
          .shared
          .notify(key, entry.value(), RemovalReason::Explicit);
      }
    }
  }

  /// Clears the engine under one lock acquisition, announcing each removed
  /// entry with reason `Explicit`.
  pub(crate) fn invalidate_all(&self) {
    let mut guard = self.shared.map.write();
    if self.shared.config.listeners.is_empty() {
      guard.clear();
      return;
    }
    for (key, entry) in guard.drain() {
      self
        .shared
        .notify(key, entry.value(), RemovalReason::Explicit);
    }
  }

  /// Stops the background sweeper, if any, and waits for it to finish. No
  /// sweep runs concurrently with or after a completed `close`. Calling
  /// `close` again is a no-op.
  pub(crate) fn close(&self) {
    if let Some(sweeper) = self.sweeper.lock().take() {
      sweeper.stop();
    }
  }

  pub(crate) fn stats(&self) -> Stats {
    Stats::new(vec![self.shared.metrics.clone()])
  }

  pub(crate) fn metrics(&self) -> Arc<Metrics> {
    self.shared.metrics.clone()
  }

  pub(crate) fn len(&self) -> usize {
    self.shared.map.read().len()
  }
}

impl<K, V, H> Drop for Engine<K, V, H> {
  fn drop(&mut self) {
    if let Some(sweeper) = self.sweeper.get_mut().take() {
      sweeper.stop();
    }
  }
}

impl<K, V, H> EngineShared<K, V, H>
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
  H: BuildHasher,
{
  /// Re-checks `key` under the write lock and evicts it if it is still
  /// present and still expired. The re-check guards against racing with a
  /// `put` that has just replaced the entry with a fresh one.
  fn evict_if_expired(&self, key: &K) {
    let mut guard = self.map.write();
    let now = instant_to_nanos(self.config.clock.now());
    let expired = guard.get(key).is_some_and(|entry| {
      entry.is_expired(now, self.config.expire_after_write, self.config.expire_after_read)
    });
    if expired {
      self.evict(&mut guard, key, RemovalReason::Expired);
    }
  }

  /// Saves a new entry into the map, evicting a policy-chosen victim first
  /// when the insert would exceed the configured maximum size. Assumes the
  /// write lock is held.
  fn insert_entry(&self, guard: &mut Map<K, V, H>, key: K, value: V) -> Arc<V> {
    if let Some(max_size) = self.config.max_size {
      if guard.len() as u64 >= max_size {
        let victim = {
          let mut candidates = guard.iter().map(|(key, entry)| entry.candidate(key));
          self.config.policy.select_victim(&mut candidates)
        };
        if let Some(victim) = victim {
          self.evict(guard, &victim, RemovalReason::Size);
        }
      }
    }

    let now = instant_to_nanos(self.config.clock.now());
    let entry = Arc::new(CacheEntry::new(value, now));
    let value = entry.value();
    guard.insert(key, entry);
    value
  }

  /// One pass over the map evicting every expired entry. Skipped when a
  /// background sweeper is configured, which does the same work on a
  /// schedule.
  fn pre_write_cleanup(&self, guard: &mut Map<K, V, H>) {
    if self.config.sweep_interval.is_some() {
      return;
    }
    self.evict_expired(guard);
  }

  /// Scans for and evicts expired entries. Assumes the write lock is held.
  pub(crate) fn evict_expired(&self, guard: &mut Map<K, V, H>) {
    let now = instant_to_nanos(self.config.clock.now());
    let expired: Vec<K> = guard
      .iter()
      .filter(|(_, entry)| {
        entry.is_expired(now, self.config.expire_after_write, self.config.expire_after_read)
      })
      .map(|(key, _)| key.clone())
      .collect();
    for key in expired {
      self.evict(guard, &key, RemovalReason::Expired);
    }
  }

  /// One tick of the background sweeper.
  pub(crate) fn sweep(&self) {
    let mut guard = self.map.write();
    self.evict_expired(&mut guard);
  }

  /// The single eviction path: removes the entry, counts it, and delivers
  /// one notification to every listener. Assumes the write lock is held, and
  /// holds it through the listener join, so no other mutation of this shard
  /// interleaves with a pending eviction's notification.
  fn evict(&self, guard: &mut Map<K, V, H>, key: &K, reason: RemovalReason) {
    let Some((key, entry)) = guard.remove_entry(key) else {
      return;
    };
    self.metrics.eviction();
    self.notify(key, entry.value(), reason);
  }

  /// Fans one notification out to every listener concurrently and joins
  /// them all before returning. A panicking listener is caught and logged so
  /// it can neither poison the engine nor block the other deliveries.
  fn notify(&self, key: K, value: Arc<V>, reason: RemovalReason) {
    let listeners = &self.config.listeners;
    if listeners.is_empty() {
      return;
    }
    let notification = RemovalNotification { key, value, reason };
    thread::scope(|scope| {
      for listener in listeners.iter() {
        let notification = notification.clone();
        scope.spawn(move || {
          let delivery =
            panic::catch_unwind(AssertUnwindSafe(|| listener.on_removal(notification)));
          if delivery.is_err() {
            tracing::warn!(%reason, "removal listener panicked");
          }
        });
      }
    });
  }
}
