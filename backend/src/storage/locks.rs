//! Per-key write serialization. Every read-modify-write of a record runs
//! under the lock for that record's [`RecordKey::lock_key`], so concurrent
//! mutations of one pet's data cannot clobber each other.
//!
//! [`RecordKey::lock_key`]: super::keys::RecordKey::lock_key

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct KeyLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one key, creating it on first use. The guard
    /// must be held for the whole read-modify-write cycle.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }
}
