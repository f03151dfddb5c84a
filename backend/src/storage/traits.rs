//! The persistence seam. Services speak to a [`DocumentStore`] and never
//! know whether records live in local files or in the remote document
//! database. Records travel as JSON documents; the typed layer on top is
//! [`DocumentStoreExt`].

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast;

use super::keys::RecordKey;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O failure on record {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Record {path} could not be decoded: {detail}")]
    Corrupt { path: String, detail: String },
    #[error("Record {path} could not be encoded: {detail}")]
    Encode { path: String, detail: String },
    #[error("Store operation on {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },
}

/// A change pushed for a watched record
#[derive(Debug, Clone)]
pub struct RecordChange {
    pub path: String,
    pub document: Value,
}

/// What a live subscription delivered
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// The record was rewritten; carries the full new document
    Changed(Value),
    /// The subscriber missed this many changes and should re-read the record
    Lagged(u64),
    /// The store shut down; no further events will arrive
    Closed,
}

/// Live subscription to one record, delivering the full document on every
/// external write until dropped
pub struct RecordWatch {
    path: String,
    receiver: broadcast::Receiver<RecordChange>,
}

impl RecordWatch {
    pub(crate) fn new(path: String, receiver: broadcast::Receiver<RecordChange>) -> Self {
        Self { path, receiver }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the next event on the watched record. Changes to other
    /// records on the same channel are skipped.
    pub async fn next_event(&mut self) -> WatchEvent {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.path == self.path => {
                    return WatchEvent::Changed(change.document)
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return WatchEvent::Lagged(skipped)
                }
                Err(broadcast::error::RecvError::Closed) => return WatchEvent::Closed,
            }
        }
    }
}

/// Storage for user-scoped JSON records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a record, or `None` if it was never written
    async fn get(&self, key: &RecordKey) -> Result<Option<Value>, StoreError>;

    /// Write a record, replacing any previous document
    async fn set(&self, key: &RecordKey, document: Value) -> Result<(), StoreError>;

    /// Subscribe to changes of one record. Stores without push support
    /// return `None` and callers re-read after their own writes instead.
    fn watch(&self, key: &RecordKey) -> Option<RecordWatch>;
}

/// Typed convenience layer over [`DocumentStore`]
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Read and decode a record, falling back to `T::default()` when absent
    async fn read_or_default<T>(&self, key: &RecordKey) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default + Send,
    {
        match self.get(key).await? {
            Some(document) => decode(key, document),
            None => Ok(T::default()),
        }
    }

    /// Read and decode a record that may be absent
    async fn read_opt<T>(&self, key: &RecordKey) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(document) => decode(key, document).map(Some),
            None => Ok(None),
        }
    }

    /// Encode and write a record
    async fn write<T>(&self, key: &RecordKey, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        let document = serde_json::to_value(value).map_err(|e| StoreError::Encode {
            path: key.storage_path(),
            detail: e.to_string(),
        })?;
        self.set(key, document).await
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}

fn decode<T: DeserializeOwned>(key: &RecordKey, document: Value) -> Result<T, StoreError> {
    serde_json::from_value(document).map_err(|e| StoreError::Corrupt {
        path: key.storage_path(),
        detail: e.to_string(),
    })
}
