//! Show command implementation.
//!
//! `procgather show [id]` renders the saved steps of a process. With
//! `--json` it prints the same document `export` writes.

use crate::cli::args::ShowArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::{show_process, show_step_detail};

/// The show command implementation.
pub struct ShowCommand {
    context: AppContext,
    args: ShowArgs,
}

impl ShowCommand {
    pub fn new(context: AppContext, args: ShowArgs) -> Self {
        Self { context, args }
    }
}

impl Command for ShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut editor = self.context.open_editor()?;
        self.context.open_process(&mut editor, self.args.id)?;

        if self.args.json {
            ui.message(&editor.export()?.to_json()?);
            return Ok(CommandResult::success());
        }

        show_process(ui, &editor);
        if ui.output_mode().shows_details() {
            for index in 0..editor.steps().len() {
                ui.message("");
                show_step_detail(ui, &editor, index)?;
            }
        }
        Ok(CommandResult::success())
    }
}
