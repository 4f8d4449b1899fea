//! Rename command implementation.

use crate::cli::args::RenameArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The rename command implementation.
pub struct RenameCommand {
    context: AppContext,
    args: RenameArgs,
}

impl RenameCommand {
    pub fn new(context: AppContext, args: RenameArgs) -> Self {
        Self { context, args }
    }
}

impl Command for RenameCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut editor = self.context.open_editor()?;
        let process = editor.rename_process(self.args.id, &self.args.name)?;
        ui.success(&format!("Renamed process {} to {}", process.id, process.name));
        editor.wait_for_sync();
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::ProcGatherError;
    use crate::model::ProcessId;
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
    fn renames_in_store() {
        let dir = TempDir::new().unwrap();
        let id = LocalStore::open_dir(dir.path())
            .unwrap()
            .create_process("Draft")
            .unwrap()
            .id;

        let mut ui = MockUI::new();
        RenameCommand::new(
            context(&dir),
            RenameArgs {
                id,
                name: "Expense claims".to_string(),
            },
        )
        .execute(&mut ui)
        .unwrap();

        assert!(ui.has_success("Expense claims"));
        let store = LocalStore::open_dir(dir.path()).unwrap();
        assert_eq!(store.get_process(id).unwrap().name, "Expense claims");
    }

    #[test]
    fn unknown_process_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let err = RenameCommand::new(
            context(&dir),
            RenameArgs {
                id: ProcessId::new(42),
                name: "X".to_string(),
            },
        )
        .execute(&mut ui)
        .unwrap_err();
        assert!(matches!(err, ProcGatherError::ProcessNotFound { id: 42 }));
    }
}
