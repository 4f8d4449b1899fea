//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct. Steps are addressed by their
//! 1-based position as shown in `procgather show`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::{ArtifactKind, ProcessId};

/// procgather - document business processes step by step.
#[derive(Debug, Parser)]
#[command(name = "procgather")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides <config_dir>/procgather/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the local store
    #[arg(long, global = true, env = "PROCGATHER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote service base URL; empty keeps everything local
    #[arg(long, global = true, env = "PROCGATHER_API_BASE")]
    pub api_base: Option<String>,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List processes (default if no command specified)
    List(ListArgs),

    /// Create a new process
    Create(CreateArgs),

    /// Rename a process
    Rename(RenameArgs),

    /// Delete a process with its steps and attachments
    Delete(DeleteArgs),

    /// Show the steps of a process
    Show(ShowArgs),

    /// Edit a process with line commands read from stdin
    Edit(EditArgs),

    /// Attach an example file to a step
    Attach(AttachArgs),

    /// Export a process as JSON
    Export(ExportArgs),

    /// Import a process from JSON
    Import(ImportArgs),

    /// Delete every process and stored file
    Reset,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `create` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CreateArgs {
    /// Process name (defaults to "Untitled Process N")
    pub name: Option<String>,
}

/// Arguments for the `rename` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RenameArgs {
    /// Process id
    pub id: ProcessId,

    /// New name
    pub name: String,
}

/// Arguments for the `delete` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DeleteArgs {
    /// Process id
    pub id: ProcessId,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ShowArgs {
    /// Process id (defaults to the most recently updated)
    pub id: Option<ProcessId>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `edit` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EditArgs {
    /// Process id (defaults to the most recently updated, or a new one)
    pub id: Option<ProcessId>,
}

/// Arguments for the `attach` command.
#[derive(Debug, Clone, clap::Args)]
pub struct AttachArgs {
    /// Step number (1-based)
    pub step: usize,

    /// File to attach
    pub file: PathBuf,

    /// Process id (defaults to the most recently updated)
    #[arg(short, long)]
    pub process: Option<ProcessId>,

    /// Role of the file: input, output, or system
    #[arg(short = 't', long = "type")]
    pub kind: Option<ArtifactKind>,

    /// Content type (guessed from the extension when omitted)
    #[arg(long)]
    pub mime: Option<String>,
}

/// Arguments for the `export` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ExportArgs {
    /// Process id (defaults to the most recently updated)
    pub id: Option<ProcessId>,

    /// Output file (defaults to <name>.apo.json; `-` for stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `import` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ImportArgs {
    /// JSON file to import (`-` for stdin)
    pub file: PathBuf,
}
