//! Create command implementation.

use crate::cli::args::CreateArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The create command implementation.
pub struct CreateCommand {
    context: AppContext,
    args: CreateArgs,
}

impl CreateCommand {
    pub fn new(context: AppContext, args: CreateArgs) -> Self {
        Self { context, args }
    }
}

impl Command for CreateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut editor = self.context.open_editor()?;
        let mut process = editor.create_process()?;

        if let Some(name) = self.args.name.as_deref() {
            process = editor.rename_process(process.id, name)?;
        }

        ui.success(&format!("Created process {} ({})", process.id, process.name));
        ui.show_hint(&format!("Run 'procgather edit {}' to add steps.", process.id));
        editor.wait_for_sync();
        Ok(CommandResult::success())
    }
}
