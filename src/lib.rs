//! procgather - local-first documentation of business processes.
//!
//! A process is an ordered list of steps (who does what, with which tools,
//! how often, and where control goes next), with example files attached to
//! steps. Everything is edited against a local store; a remote service, when
//! configured, receives a copy of each save in the background.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, validation, and layering
//! - [`editor`] - The load, mutate, save cycle over one process
//! - [`error`] - Error types and result aliases
//! - [`history`] - Bounded undo/redo
//! - [`model`] - Process, step, and artifact records
//! - [`store`] - Transactional local storage
//! - [`sync`] - Background mirroring to the remote service
//! - [`transfer`] - JSON export and import
//! - [`ui`] - Terminal output and prompts
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use procgather::editor::{Editor, StepPatch};
//! use procgather::store::LocalStore;
//!
//! let mut editor = Editor::new(Arc::new(LocalStore::in_memory()));
//! editor.create_process().unwrap();
//! let first = editor.add_step().unwrap();
//! editor.update_step(first, StepPatch::new().who("AP clerk")).unwrap();
//! editor.save().unwrap();
//!
//! assert!(!editor.is_dirty());
//! assert!(editor.steps()[0].is_end);
//! ```

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod model;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod ui;

pub use error::{ProcGatherError, Result};
