//! Command-line interface for procgather.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`context`] - Settings, store, and sync wiring shared by commands
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;
pub mod context;

pub use args::{
    AttachArgs, Cli, Commands, CreateArgs, DeleteArgs, EditArgs, ExportArgs, ImportArgs,
    ListArgs, RenameArgs, ShowArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use context::AppContext;
