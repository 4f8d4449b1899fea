//! Local record storage.
//!
//! This module provides the embedded, versioned database behind every
//! editing session:
//! - [`LocalStore`] - transactional operations over processes, steps, and
//!   artifacts
//! - [`StorageBackend`] - where documents live ([`FileBackend`] on disk,
//!   [`MemoryBackend`] in memory)
//! - [`schema`] - the stored layout, its version, and migrations
//!
//! # Example
//!
//! ```
//! use procgather::store::LocalStore;
//!
//! let store = LocalStore::in_memory();
//! let process = store.create_process("Month-end close").unwrap();
//! assert_eq!(store.list_processes().unwrap()[0].id, process.id);
//! ```

mod backend;
mod local;
pub mod schema;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use local::{LocalStore, ProcessContents};
pub use schema::{Database, CURRENT_VERSION};
