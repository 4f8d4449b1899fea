//! List command implementation.
//!
//! The `procgather list` command lists processes, most recently updated
//! first.

use crate::cli::args::ListArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::process_table;

/// The list command implementation.
pub struct ListCommand {
    context: AppContext,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(context: AppContext, args: ListArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let editor = self.context.open_editor()?;
        let processes = editor.list_processes()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&processes)
                .map_err(|e| anyhow::anyhow!("Failed to serialize processes: {}", e))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if processes.is_empty() {
            ui.message("No processes yet.");
            ui.show_hint("Run 'procgather create' to start one.");
            return Ok(CommandResult::success());
        }

        ui.message(&process_table(&processes).render());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::store::LocalStore;
    use crate::ui::MockUI;
    use std::time::Duration;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        AppContext::new(
            Settings {
                data_dir: dir.path().to_path_buf(),
                api_base: None,
                timeout: Duration::from_secs(1),
            },
            false,
        )
    }

    #[test]
    fn empty_store_hints_at_create() {
        let dir = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = ListCommand::new(context(&dir), ListArgs::default())
            .execute(&mut ui)
            .unwrap();
        assert!(result.success);
        assert!(ui.has_message("No processes yet."));
        assert!(!ui.hints().is_empty());
    }

    #[test]
    fn lists_processes_in_a_table() {
        let dir = TempDir::new().unwrap();
        {
            let store = LocalStore::open_dir(dir.path()).unwrap();
            store.create_process("Invoice approval").unwrap();
            store.create_process("Payroll").unwrap();
        }

        let mut ui = MockUI::new();
        ListCommand::new(context(&dir), ListArgs::default())
            .execute(&mut ui)
            .unwrap();
        assert!(ui.has_message("Invoice approval"));
        assert!(ui.has_message("Payroll"));
        assert!(ui.has_message("┌"));
    }

    #[test]
    fn json_output_is_parseable() {
        let dir = TempDir::new().unwrap();
        LocalStore::open_dir(dir.path())
            .unwrap()
            .create_process("Payroll")
            .unwrap();

        let mut ui = MockUI::new();
        ListCommand::new(context(&dir), ListArgs { json: true })
            .execute(&mut ui)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(parsed[0]["name"], "Payroll");
    }
}
