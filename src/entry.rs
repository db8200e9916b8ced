use crate::policy::VictimCandidate;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A container for a value in the cache, holding the timestamps the expiry
/// policy needs.
///
/// Entries are replaced wholesale on overwrite, never mutated in place; the
/// only mutable field is the last-read timestamp, which is touched on a hit.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  /// The user's value, wrapped in an Arc for shared ownership.
  value: Arc<V>,
  /// Nanoseconds since the cache epoch of the write that created this entry.
  last_write: u64,
  /// Nanoseconds since the cache epoch of the most recent read.
  ///
  /// Stored atomically so a hit can refresh it after the read lock has been
  /// released, without a second lock acquisition.
  last_read: AtomicU64,
}

impl<V> CacheEntry<V> {
  pub(crate) fn new(value: V, now_nanos: u64) -> Self {
    Self {
      value: Arc::new(value),
      last_write: now_nanos,
      last_read: AtomicU64::new(now_nanos),
    }
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  /// Refreshes the last-read timestamp. A cheap atomic store.
  #[inline]
  pub(crate) fn touch_read(&self, now_nanos: u64) {
    self.last_read.store(now_nanos, Ordering::Relaxed);
  }

  /// Checks whether the entry has outlived either expiry window.
  ///
  /// A window of `None` disables that check. Expiry is strict: an entry
  /// written at `t` with a write window of `d` is still live at exactly
  /// `t + d`.
  pub(crate) fn is_expired(
    &self,
    now_nanos: u64,
    expire_after_write: Option<Duration>,
    expire_after_read: Option<Duration>,
  ) -> bool {
    if let Some(window) = expire_after_read {
      let deadline = self.last_read.load(Ordering::Relaxed) + window.as_nanos() as u64;
      if now_nanos > deadline {
        return true;
      }
    }
    if let Some(window) = expire_after_write {
      if now_nanos > self.last_write + window.as_nanos() as u64 {
        return true;
      }
    }
    false
  }

  /// Builds the metadata view handed to an eviction policy.
  pub(crate) fn candidate<'a, K>(&self, key: &'a K) -> VictimCandidate<'a, K> {
    VictimCandidate {
      key,
      last_read: self.last_read.load(Ordering::Relaxed),
      last_write: self.last_write,
    }
  }
}
