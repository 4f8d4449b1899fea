//! Import command implementation.
//!
//! Reads an export document (or a legacy one with numeric step routes)
//! and creates it as a new process named `<name> (import)`.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::cli::args::ImportArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The import command implementation.
pub struct ImportCommand {
    context: AppContext,
    args: ImportArgs,
}

impl ImportCommand {
    pub fn new(context: AppContext, args: ImportArgs) -> Self {
        Self { context, args }
    }

    fn read_source(&self) -> Result<String> {
        if self.args.file == Path::new("-") {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json)?;
            Ok(json)
        } else {
            Ok(fs::read_to_string(&self.args.file)?)
        }
    }
}

impl Command for ImportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let json = self.read_source()?;
        let mut editor = self.context.open_editor()?;

        let process = editor.import_json(&json)?;
        let steps = editor.store().load_steps(process.id)?.len();
        ui.success(&format!(
            "Imported {} as process {} ({} steps)",
            process.name, process.id, steps
        ));
        Ok(CommandResult::success())
    }
}
