use std::fmt;
use std::sync::Arc;

/// Describes the reason an entry was removed from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
  /// The entry was explicitly invalidated by the caller.
  Explicit,
  /// The entry was replaced by a new value for the same key.
  Replaced,
  /// The entry outlived its expire-after-write or expire-after-read window.
  Expired,
  /// The entry was removed to keep the shard within its maximum size.
  Size,
}

impl fmt::Display for RemovalReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemovalReason::Explicit => write!(f, "explicitly invalidated"),
      RemovalReason::Replaced => write!(f, "replaced by a new value"),
      RemovalReason::Expired => write!(f, "expired"),
      RemovalReason::Size => write!(f, "removed due to size"),
    }
  }
}

/// The payload delivered to every removal listener, built once per removal.
#[derive(Debug)]
pub struct RemovalNotification<K, V> {
  pub key: K,
  pub value: Arc<V>,
  pub reason: RemovalReason,
}

impl<K: Clone, V> Clone for RemovalNotification<K, V> {
  fn clone(&self) -> Self {
    Self {
      key: self.key.clone(),
      value: self.value.clone(),
      reason: self.reason,
    }
  }
}

/// A listener that can be registered with the cache to receive a
/// notification each time an entry is removed.
///
/// Listeners for one removal run concurrently with each other, but the
/// removing operation does not complete until every listener has returned.
/// A slow listener therefore stalls its shard; a panicking listener is
/// isolated and does not affect the others or the cache's state.
pub trait RemovalListener<K, V>: Send + Sync {
  fn on_removal(&self, notification: RemovalNotification<K, V>);
}
