use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// The single, static reference point for all time calculations in the cache.
// It is initialized lazily on its first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Converts an `Instant` into nanoseconds since the cache's epoch, so
/// timestamps can be stored in atomics.
#[inline]
pub(crate) fn instant_to_nanos(instant: Instant) -> u64 {
  instant.saturating_duration_since(*CACHE_EPOCH).as_nanos() as u64
}

/// A source of time for the cache.
///
/// Every expiry decision consults the configured clock, which makes
/// time-based behavior fully controllable in tests via [`MockClock`].
pub trait Clock: Send + Sync {
  /// Returns the current instant.
  fn now(&self) -> Instant;
}

/// The default clock, backed by `Instant::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  #[inline]
  fn now(&self) -> Instant {
    Instant::now()
  }
}

/// A deterministic clock for testing.
///
/// It starts at a fixed point and only moves when [`MockClock::advance`] is
/// called. Keep a second handle (it is cheaply shareable behind an `Arc`)
/// to drive time from the test while the cache holds its own.
#[derive(Debug, Default)]
pub struct MockClock {
  offset_nanos: AtomicU64,
}

impl MockClock {
  pub fn new() -> Self {
    // Touch the epoch so it is anchored before any timestamps are taken.
    Lazy::force(&CACHE_EPOCH);
    Self {
      offset_nanos: AtomicU64::new(0),
    }
  }

  /// Moves the clock forward by `duration`.
  pub fn advance(&self, duration: Duration) {
    self
      .offset_nanos
      .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
  }
}

impl Clock for MockClock {
  fn now(&self) -> Instant {
    *CACHE_EPOCH + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
  }
}
