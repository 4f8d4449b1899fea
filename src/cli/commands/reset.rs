//! Reset command implementation.

use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Deletes every process, step, artifact, and stored file.
pub struct ResetCommand {
    context: AppContext,
}

impl ResetCommand {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }
}

impl Command for ResetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut editor = self.context.open_editor()?;
        let count = editor.store().process_count()?;

        let question = format!(
            "Delete all {} processes and every attached file? This cannot be undone.",
            count
        );
        if !self.context.confirm(ui, "reset", &question)? {
            ui.warning("Nothing deleted");
            return Ok(CommandResult::failure(1));
        }

        editor.reset_all()?;
        ui.success(&format!("Deleted {} processes", count));
        Ok(CommandResult::success())
    }
}
