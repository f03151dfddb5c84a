//! File-backed store. One JSON file per record under a base directory,
//! mirroring the record's storage path. No push support: callers re-read
//! after their own writes.

use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use super::keys::RecordKey;
use super::traits::{DocumentStore, RecordWatch, StoreError};

pub struct LocalStore {
    base_directory: PathBuf,
}

impl LocalStore {
    /// Open a local store rooted at the given directory, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self, StoreError> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|source| StoreError::Io {
                path: base_path.display().to_string(),
                source,
            })?;
        }

        info!("Local store ready at {}", base_path.display());

        Ok(Self {
            base_directory: base_path,
        })
    }

    fn record_file(&self, key: &RecordKey) -> PathBuf {
        let mut file = self.base_directory.join(key.storage_path());
        file.set_extension("json");
        file
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<Value>, StoreError> {
        let file = self.record_file(key);

        let bytes = match fs::read(&file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: key.storage_path(),
                    source,
                })
            }
        };

        let document = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: key.storage_path(),
            detail: e.to_string(),
        })?;

        Ok(Some(document))
    }

    async fn set(&self, key: &RecordKey, document: Value) -> Result<(), StoreError> {
        let file = self.record_file(key);

        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: key.storage_path(),
                source,
            })?;
        }

        let bytes = serde_json::to_vec_pretty(&document).map_err(|e| StoreError::Encode {
            path: key.storage_path(),
            detail: e.to_string(),
        })?;

        fs::write(&file, bytes).map_err(|source| StoreError::Io {
            path: key.storage_path(),
            source,
        })
    }

    fn watch(&self, _key: &RecordKey) -> Option<RecordWatch> {
        None
    }
}
