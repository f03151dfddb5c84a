//! # Storage Module
//!
//! Persistence for all pet records behind one abstraction.
//!
//! The original product shipped two incompatible persistence strategies: a
//! browser-local key-value store and a remote document database with live
//! subscriptions. Here both sit behind the [`DocumentStore`] trait so the
//! domain layer never knows which one it is talking to:
//!
//! - [`LocalStore`]: one JSON file per record, no push notifications
//! - [`RemoteStore`]: in-process document map with broadcast push
//!
//! Records are addressed by [`RecordKey`] (user-scoped paths) and stored as
//! ID-keyed JSON maps, so updating one entry never depends on the position
//! of the others. Read-modify-write cycles serialize through [`KeyLocks`].

pub mod keys;
pub mod local;
pub mod locks;
pub mod remote;
pub mod traits;

// Re-export the main types that other modules need
pub use keys::{RecordKey, RecordKind};
pub use local::LocalStore;
pub use locks::KeyLocks;
pub use remote::RemoteStore;
pub use traits::{DocumentStore, DocumentStoreExt, RecordChange, RecordWatch, StoreError, WatchEvent};
