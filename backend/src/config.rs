//! Process configuration, read once at startup from environment variables.
//!
//! - `PAWPAL_BIND`: socket address to serve on (default `127.0.0.1:3000`)
//! - `PAWPAL_DATA_DIR`: where the local store keeps its record files
//!   (default `<home>/Documents/PawPal`)
//! - `PAWPAL_STORE`: `local` or `remote` (default `local`)
//! - `PAWPAL_USER`: stable user ID scoping all records; unset means an
//!   anonymous session with a generated ID

use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Which backend the document store runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// One JSON file per record on disk, no push notifications
    Local,
    /// In-process document map with live subscriptions
    Remote,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub data_directory: PathBuf,
    pub store_mode: StoreMode,
    /// Configured user ID; `None` runs the process as an anonymous user
    pub user_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_address = env::var("PAWPAL_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .context("PAWPAL_BIND is not a valid socket address")?;

        let data_directory = match env::var("PAWPAL_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_data_directory()?,
        };

        let store_mode = match env::var("PAWPAL_STORE") {
            Ok(mode) => parse_store_mode(&mode)?,
            Err(_) => StoreMode::Local,
        };

        let user_id = env::var("PAWPAL_USER")
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(AppConfig {
            bind_address,
            data_directory,
            store_mode,
            user_id,
        })
    }
}

fn parse_store_mode(mode: &str) -> Result<StoreMode> {
    match mode.trim().to_lowercase().as_str() {
        "local" => Ok(StoreMode::Local),
        "remote" => Ok(StoreMode::Remote),
        other => Err(anyhow!(
            "PAWPAL_STORE must be 'local' or 'remote', got '{}'",
            other
        )),
    }
}

/// Default record location: a PawPal folder in the user's Documents
fn default_data_directory() -> Result<PathBuf> {
    let home_dir = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map_err(|_| anyhow!("Could not determine home directory"))?;

    Ok(PathBuf::from(home_dir).join("Documents").join("PawPal"))
}
