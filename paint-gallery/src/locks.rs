use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per object key.
///
/// Writers to the same key queue up behind each other; writers to
/// different keys, and all readers, never touch the same lock. Entries are
/// dropped again once nobody holds or waits on them.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive hold on one key, released on drop
#[derive(Debug)]
pub struct KeyGuard<'a> {
    owner: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `key` is free and take it
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        // Clone out of the map first: the shard lock must not be held across the await
        let mutex = Arc::clone(&self.locks.entry(key.to_string()).or_default());
        let guard = mutex.lock_owned().await;

        KeyGuard {
            owner: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or waited on
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

impl KeyGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map itself still references the mutex: nobody is waiting
        self.owner
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
