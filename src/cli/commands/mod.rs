//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. Commands share an
//! [`AppContext`](crate::cli::AppContext) for settings, store access, and
//! confirmation prompts.

pub mod attach;
pub mod create;
pub mod delete;
pub mod dispatcher;
pub mod display;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod rename;
pub mod reset;
pub mod show;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
