//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands, ListArgs};
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Returns a [`CommandResult`] carrying the exit code. Errors are
    /// reported by the caller.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: AppContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher sharing `context` with every command.
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = self.context.clone();
        match &cli.command {
            Some(Commands::List(args)) => super::list::ListCommand::new(ctx, args.clone()).execute(ui),
            Some(Commands::Create(args)) => {
                super::create::CreateCommand::new(ctx, args.clone()).execute(ui)
            }
            Some(Commands::Rename(args)) => {
                super::rename::RenameCommand::new(ctx, args.clone()).execute(ui)
            }
            Some(Commands::Delete(args)) => {
                super::delete::DeleteCommand::new(ctx, args.clone()).execute(ui)
            }
            Some(Commands::Show(args)) => super::show::ShowCommand::new(ctx, args.clone()).execute(ui),
            Some(Commands::Edit(args)) => super::edit::EditCommand::new(ctx, args.clone()).execute(ui),
            Some(Commands::Attach(args)) => {
                super::attach::AttachCommand::new(ctx, args.clone()).execute(ui)
            }
            Some(Commands::Export(args)) => {
                super::export::ExportCommand::new(ctx, args.clone()).execute(ui)
            }
            Some(Commands::Import(args)) => {
                super::import::ImportCommand::new(ctx, args.clone()).execute(ui)
            }
            Some(Commands::Reset) => super::reset::ResetCommand::new(ctx).execute(ui),
            None => super::list::ListCommand::new(ctx, ListArgs::default()).execute(ui),
        }
    }
}
