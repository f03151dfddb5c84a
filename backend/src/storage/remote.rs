//! In-process stand-in for the remote document database. Documents live in
//! a shared map; every write is pushed to subscribers so watched views
//! update without polling. All operations run under a defensive timeout so
//! a wedged store surfaces as an error instead of a hang.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::timeout;
use tracing::debug;

use super::keys::RecordKey;
use super::traits::{DocumentStore, RecordChange, RecordWatch, StoreError};

/// Buffered changes per subscriber before a slow watcher starts lagging
const CHANNEL_CAPACITY: usize = 64;

/// Upper bound for a single store operation
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RemoteStore {
    documents: RwLock<HashMap<String, Value>>,
    sender: broadcast::Sender<RecordChange>,
}

impl RemoteStore {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            documents: RwLock::new(HashMap::new()),
            sender,
        }
    }
}

impl Default for RemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for RemoteStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<Value>, StoreError> {
        let path = key.storage_path();

        let documents = timeout(OPERATION_TIMEOUT, self.documents.read())
            .await
            .map_err(|_| StoreError::Timeout {
                path: path.clone(),
                timeout: OPERATION_TIMEOUT,
            })?;

        Ok(documents.get(&path).cloned())
    }

    async fn set(&self, key: &RecordKey, document: Value) -> Result<(), StoreError> {
        let path = key.storage_path();

        {
            let mut documents = timeout(OPERATION_TIMEOUT, self.documents.write())
                .await
                .map_err(|_| StoreError::Timeout {
                    path: path.clone(),
                    timeout: OPERATION_TIMEOUT,
                })?;
            documents.insert(path.clone(), document.clone());
        }

        // No subscribers is fine; the write already landed
        let receivers = self.sender.receiver_count();
        debug!("Pushing change on {} to {} subscribers", path, receivers);
        let _ = self.sender.send(RecordChange { path, document });

        Ok(())
    }

    fn watch(&self, key: &RecordKey) -> Option<RecordWatch> {
        Some(RecordWatch::new(
            key.storage_path(),
            self.sender.subscribe(),
        ))
    }
}
