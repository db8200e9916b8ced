use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal counter set for one engine.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
  hits: CachePadded<AtomicU64>,
  misses: CachePadded<AtomicU64>,
  evictions: CachePadded<AtomicU64>,
  load_successes: CachePadded<AtomicU64>,
  load_errors: CachePadded<AtomicU64>,
  load_time_nanos: CachePadded<AtomicU64>,
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn hit(&self) {
    self.hits.fetch_add(1, Ordering::Relaxed);
  }

  #[inline]
  pub(crate) fn miss(&self) {
    self.misses.fetch_add(1, Ordering::Relaxed);
  }

  #[inline]
  pub(crate) fn eviction(&self) {
    self.evictions.fetch_add(1, Ordering::Relaxed);
  }

  #[inline]
  pub(crate) fn load_success(&self, elapsed: Duration) {
    self.load_successes.fetch_add(1, Ordering::Relaxed);
    self
      .load_time_nanos
      .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
  }

  #[inline]
  pub(crate) fn load_error(&self) {
    self.load_errors.fetch_add(1, Ordering::Relaxed);
  }
}

/// A live view over one or more engines' counters.
///
/// Each accessor sums a fresh atomic load from every underlying engine, so
/// a `Stats` returned by a sharded cache is always the exact sum of its
/// shards at the moment of the read. Individual field reads observe the most
/// recent state, but two reads are not atomic with respect to each other;
/// callers that need a frozen, mutually consistent set of numbers should
/// take a [`snapshot`](Stats::snapshot).
#[derive(Clone)]
pub struct Stats {
  sources: Vec<Arc<Metrics>>,
}

impl Stats {
  pub(crate) fn new(sources: Vec<Arc<Metrics>>) -> Self {
    Self { sources }
  }

  /// The number of lookups served from the cache.
  pub fn hits(&self) -> u64 {
    self
      .sources
      .iter()
      .map(|m| m.hits.load(Ordering::Relaxed))
      .sum()
  }

  /// The number of lookups that found no entry and no loader.
  pub fn misses(&self) -> u64 {
    self
      .sources
      .iter()
      .map(|m| m.misses.load(Ordering::Relaxed))
      .sum()
  }

  /// The number of entries removed by expiry, replacement, or the size bound.
  pub fn evictions(&self) -> u64 {
    self
      .sources
      .iter()
      .map(|m| m.evictions.load(Ordering::Relaxed))
      .sum()
  }

  /// The number of loader invocations that returned a value.
  pub fn load_successes(&self) -> u64 {
    self
      .sources
      .iter()
      .map(|m| m.load_successes.load(Ordering::Relaxed))
      .sum()
  }

  /// The number of loader invocations that failed.
  pub fn load_errors(&self) -> u64 {
    self
      .sources
      .iter()
      .map(|m| m.load_errors.load(Ordering::Relaxed))
      .sum()
  }

  /// The cumulative wall-clock time spent in successful loads.
  pub fn total_load_time(&self) -> Duration {
    Duration::from_nanos(
      self
        .sources
        .iter()
        .map(|m| m.load_time_nanos.load(Ordering::Relaxed))
        .sum(),
    )
  }

  /// Hits plus misses.
  pub fn request_count(&self) -> u64 {
    self.hits() + self.misses()
  }

  /// The fraction of lookups served from the cache, or 0.0 before any.
  pub fn hit_ratio(&self) -> f64 {
    let hits = self.hits();
    let total = hits + self.misses();
    if total == 0 {
      0.0
    } else {
      hits as f64 / total as f64
    }
  }

  /// Creates a point-in-time copy of the counters.
  pub fn snapshot(&self) -> StatsSnapshot {
    StatsSnapshot {
      hits: self.hits(),
      misses: self.misses(),
      evictions: self.evictions(),
      load_successes: self.load_successes(),
      load_errors: self.load_errors(),
      total_load_time: self.total_load_time(),
    }
  }
}

impl fmt::Debug for Stats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let snapshot = self.snapshot();
    f.debug_struct("Stats")
      .field("hits", &snapshot.hits)
      .field("misses", &snapshot.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio() * 100.0))
      .field("evictions", &snapshot.evictions)
      .field("load_successes", &snapshot.load_successes)
      .field("load_errors", &snapshot.load_errors)
      .field("total_load_time", &snapshot.total_load_time)
      .finish()
  }
}

/// A point-in-time, frozen copy of the cache's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
  pub hits: u64,
  pub misses: u64,
  pub evictions: u64,
  pub load_successes: u64,
  pub load_errors: u64,
  pub total_load_time: Duration,
}
