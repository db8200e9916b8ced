mod common;

use common::ChannelListener;
use loadcache::{CacheBuilder, RemovalReason};

use std::thread;
use std::time::Duration;

const TINY_TTL: Duration = Duration::from_millis(50);
const SWEEP_TICK: Duration = Duration::from_millis(10);

#[test]
fn sweeper_evicts_expired_entries_without_access() {
  let (listener, removals) = ChannelListener::new();
  let cache = CacheBuilder::new()
    .expire_after_write(TINY_TTL)
    .sweep_interval(SWEEP_TICK)
    .removal_listener(listener)
    .build()
    .unwrap();

  cache.put(1, "one".to_string());

  // No get or put happens; only the sweeper can remove the entry.
  let (key, value, reason) = removals.recv_timeout(Duration::from_secs(2)).unwrap();
  assert_eq!(key, 1);
  assert_eq!(*value, "one");
  assert_eq!(reason, RemovalReason::Expired);
  assert!(cache.is_empty());

  cache.close();
}

#[test]
fn close_stops_automatic_eviction() {
  let cache = CacheBuilder::new()
    .expire_after_write(TINY_TTL)
    .sweep_interval(SWEEP_TICK)
    .build()
    .unwrap();

  cache.put(1, "one".to_string());
  cache.close();

  // Well past both the TTL and several sweep ticks: the entry is expired
  // but still resident, because nothing sweeps anymore.
  thread::sleep(TINY_TTL + Duration::from_millis(100));
  assert_eq!(cache.len(), 1);

  // Lazy expiry on access still applies after close.
  assert!(cache.get(&1).unwrap_err().is_not_found());
}

#[test]
fn close_twice_is_a_noop() {
  let cache = CacheBuilder::<i32, String>::new()
    .expire_after_write(TINY_TTL)
    .sweep_interval(SWEEP_TICK)
    .build()
    .unwrap();

  cache.close();
  cache.close();
}

#[test]
fn close_without_sweeper_is_a_noop() {
  let cache = CacheBuilder::<i32, String>::new().build().unwrap();
  cache.close();
}

#[test]
fn writes_skip_cleanup_when_sweeper_is_enabled() {
  let cache = CacheBuilder::new()
    .expire_after_write(TINY_TTL)
    .sweep_interval(Duration::from_secs(3600))
    .build()
    .unwrap();

  cache.put(1, "one".to_string());
  thread::sleep(TINY_TTL + Duration::from_millis(20));

  // With a (slow) sweeper configured, the write path does not scan for
  // expired entries; key 1 stays resident through the put.
  cache.put(2, "two".to_string());
  assert_eq!(cache.len(), 2);

  cache.close();
}
