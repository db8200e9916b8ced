use std::fmt;

/// The boxed error type loaders return on failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The cache was configured with zero shards, which is not allowed.
  /// Use a shard count of 1 for an unsharded cache.
  ZeroShards,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroShards => write!(f, "shard count cannot be zero"),
    }
  }
}

impl std::error::Error for BuildError {}

/// Errors returned by cache lookups.
#[derive(Debug)]
pub enum CacheError<K> {
  /// The key is not present and no loader is configured.
  NotFound,
  /// The configured loader failed for `key`. The failed result is never
  /// cached.
  Load { key: K, source: BoxError },
}

impl<K> CacheError<K> {
  /// Returns `true` if this is a [`CacheError::NotFound`].
  pub fn is_not_found(&self) -> bool {
    matches!(self, CacheError::NotFound)
  }
}

impl<K: fmt::Debug> fmt::Display for CacheError<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheError::NotFound => write!(f, "key not found"),
      CacheError::Load { key, source } => {
        write!(f, "failed to load key {:?}: {}", key, source)
      }
    }
  }
}

impl<K: fmt::Debug> std::error::Error for CacheError<K> {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      CacheError::NotFound => None,
      CacheError::Load { source, .. } => Some(source.as_ref()),
    }
  }
}
