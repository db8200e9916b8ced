use loadcache::{CacheBuilder, CacheError};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn miss_invokes_loader_and_caches_result() {
  let calls = Arc::new(AtomicUsize::new(0));
  let loader_calls = calls.clone();

  let cache = CacheBuilder::new()
    .loader(move |key: &i32| {
      loader_calls.fetch_add(1, Ordering::SeqCst);
      Ok(format!("loaded-{key}"))
    })
    .build()
    .unwrap();

  assert_eq!(*cache.get(&1).unwrap(), "loaded-1");
  assert_eq!(*cache.get(&1).unwrap(), "loaded-1");

  assert_eq!(calls.load(Ordering::SeqCst), 1);
  let stats = cache.stats();
  assert_eq!(stats.load_successes(), 1);
  assert_eq!(stats.hits(), 1);
}

#[test]
fn loader_error_carries_key_and_is_not_cached() {
  let calls = Arc::new(AtomicUsize::new(0));
  let loader_calls = calls.clone();

  let cache = CacheBuilder::new()
    .loader(move |key: &i32| {
      if loader_calls.fetch_add(1, Ordering::SeqCst) == 0 {
        Err("backend unavailable".into())
      } else {
        Ok(format!("loaded-{key}"))
      }
    })
    .build()
    .unwrap();

  let err = cache.get(&7).unwrap_err();
  match &err {
    CacheError::Load { key, source } => {
      assert_eq!(*key, 7);
      assert_eq!(source.to_string(), "backend unavailable");
    }
    other => panic!("expected load error, got {other:?}"),
  }
  assert!(err.to_string().contains('7'));
  assert!(cache.is_empty());

  // The failure was not cached: the next get retries the loader.
  assert_eq!(*cache.get(&7).unwrap(), "loaded-7");

  let stats = cache.stats();
  assert_eq!(stats.load_errors(), 1);
  assert_eq!(stats.load_successes(), 1);
}

#[test]
fn concurrent_gets_for_one_key_observe_a_single_load() {
  let calls = Arc::new(AtomicUsize::new(0));
  let loader_calls = calls.clone();

  let cache = Arc::new(
    CacheBuilder::new()
      .loader(move |key: &i32| {
        loader_calls.fetch_add(1, Ordering::SeqCst);
        // Hold the load long enough for every thread to pile up behind it.
        thread::sleep(Duration::from_millis(50));
        Ok(format!("loaded-{key}"))
      })
      .build()
      .unwrap(),
  );

  let mut handles = Vec::new();
  for _ in 0..8 {
    let cache = cache.clone();
    handles.push(thread::spawn(move || cache.get(&1).unwrap()));
  }
  let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

  // Every caller observes the value of the one load that ran; the racing
  // callers hit the double-check under the write lock.
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert!(values.iter().all(|value| **value == "loaded-1"));
  assert_eq!(cache.stats().load_successes(), 1);
  assert_eq!(cache.stats().hits(), 7);
}

#[test]
fn load_time_accumulates() {
  let cache = CacheBuilder::new()
    .loader(|key: &i32| {
      thread::sleep(Duration::from_millis(10));
      Ok(*key)
    })
    .build()
    .unwrap();

  cache.get(&1).unwrap();
  cache.get(&2).unwrap();

  let stats = cache.stats();
  assert_eq!(stats.load_successes(), 2);
  assert!(stats.total_load_time() >= Duration::from_millis(20));
}
