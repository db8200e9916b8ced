use crate::engine::EngineShared;

use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Shutdown handshake between an engine and its sweeper thread. The condvar
/// lets `stop` interrupt a sleeping sweeper immediately instead of waiting
/// out the rest of the interval.
struct StopSignal {
  stopped: Mutex<bool>,
  condvar: Condvar,
}

/// The background task that periodically scans an engine for expired entries
/// and evicts them. One per engine, spawned only when a sweep interval is
/// configured.
pub(crate) struct Sweeper {
  handle: JoinHandle<()>,
  signal: Arc<StopSignal>,
}

impl Sweeper {
  pub(crate) fn spawn<K, V, H>(shared: Arc<EngineShared<K, V, H>>, interval: Duration) -> Self
  where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    H: BuildHasher + Send + Sync + 'static,
  {
    let signal = Arc::new(StopSignal {
      stopped: Mutex::new(false),
      condvar: Condvar::new(),
    });
    let thread_signal = signal.clone();

    let handle = thread::spawn(move || {
      tracing::debug!(?interval, "expiration sweeper started");
      loop {
        let mut stopped = thread_signal.stopped.lock();
        if !*stopped {
          thread_signal.condvar.wait_for(&mut stopped, interval);
        }
        if *stopped {
          break;
        }
        drop(stopped);
        shared.sweep();
      }
      tracing::debug!("expiration sweeper stopped");
    });

    Self { handle, signal }
  }

  /// Signals the sweeper thread to stop and joins it. After this returns, no
  /// sweep is running and none will run again.
  pub(crate) fn stop(self) {
    *self.signal.stopped.lock() = true;
    self.signal.condvar.notify_all();
    let _ = self.handle.join();
  }
}
