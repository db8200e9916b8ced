#![allow(dead_code)]

use loadcache::{RemovalListener, RemovalNotification, RemovalReason};

use std::hash::{BuildHasher, Hasher};
use std::sync::mpsc;
use std::sync::Arc;

// A custom hasher that allows us to control which shard a key is assigned to.
// It simply uses the integer value of the key as its hash.
// For a 4-shard cache:
// - key 0 -> shard 0 (0 % 4 = 0)
// - key 1 -> shard 1 (1 % 4 = 1)
// - key 4 -> shard 0 (4 % 4 = 0)
#[derive(Clone, Default)]
pub struct ShardControllingHasher;

impl BuildHasher for ShardControllingHasher {
  type Hasher = TestHasher;
  fn build_hasher(&self) -> Self::Hasher {
    TestHasher(0)
  }
}

pub struct TestHasher(u64);

impl Hasher for TestHasher {
  fn finish(&self) -> u64 {
    self.0
  }
  fn write(&mut self, _: &[u8]) {
    unimplemented!()
  }
  fn write_i32(&mut self, i: i32) {
    self.0 = i as u64;
  }
}

pub type RemovalEvent = (i32, Arc<String>, RemovalReason);

// A listener that forwards every notification into an mpsc channel so tests
// can assert on delivery order and payload.
pub struct ChannelListener {
  sender: mpsc::Sender<RemovalEvent>,
}

impl ChannelListener {
  pub fn new() -> (Self, mpsc::Receiver<RemovalEvent>) {
    let (sender, receiver) = mpsc::channel();
    (Self { sender }, receiver)
  }
}

impl RemovalListener<i32, String> for ChannelListener {
  fn on_removal(&self, notification: RemovalNotification<i32, String>) {
    self
      .sender
      .send((notification.key, notification.value, notification.reason))
      .unwrap();
  }
}
