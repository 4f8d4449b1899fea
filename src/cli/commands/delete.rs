//! Delete command implementation.

use crate::cli::args::DeleteArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The delete command implementation.
pub struct DeleteCommand {
    context: AppContext,
    args: DeleteArgs,
}

impl DeleteCommand {
    pub fn new(context: AppContext, args: DeleteArgs) -> Self {
        Self { context, args }
    }
}

impl Command for DeleteCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut editor = self.context.open_editor()?;
        let process = editor.store().get_process(self.args.id)?;

        let question = format!(
            "Delete '{}' with all its steps and attachments?",
            process.name
        );
        if !self.context.confirm(ui, "delete", &question)? {
            ui.warning("Nothing deleted");
            return Ok(CommandResult::failure(1));
        }

        editor.delete_process(process.id)?;
        ui.success(&format!("Deleted process {} ({})", process.id, process.name));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::model::{ArtifactKind, FileMeta, Step};
    use crate::store::LocalStore;
    use crate::ui::MockUI;
    use std::time::Duration;
    use tempfile::TempDir;

    fn context(dir: &TempDir, yes: bool) -> AppContext {
        AppContext::new(
            Settings {
                data_dir: dir.path().to_path_buf(),
                api_base: None,
                timeout: Duration::from_secs(1),
            },
            yes,
        )
    }

    #[test]
    fn declined_prompt_keeps_process() {
        let dir = TempDir::new().unwrap();
        let id = LocalStore::open_dir(dir.path())
            .unwrap()
            .create_process("Keep me")
            .unwrap()
            .id;

        let mut ui = MockUI::new();
        ui.set_prompt_response("delete", "no");
        let result = DeleteCommand::new(context(&dir, false), DeleteArgs { id })
            .execute(&mut ui)
            .unwrap();

        assert!(!result.success);
        assert!(LocalStore::open_dir(dir.path()).unwrap().get_process(id).is_ok());
    }

    #[test]
    fn confirmed_delete_cascades() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = LocalStore::open_dir(dir.path()).unwrap();
            let process = store.create_process("Gone").unwrap();
            let steps = store
                .save_steps(process.id, &[Step::new(process.id, 0)])
                .unwrap();
            let step_id = steps[0].id.unwrap();
            store
                .add_artifact(
                    process.id,
                    step_id,
                    ArtifactKind::Output,
                    FileMeta::guess("report.csv", 3),
                    b"a,b",
                )
                .unwrap();
            process.id
        };

        let mut ui = MockUI::new();
        DeleteCommand::new(context(&dir, true), DeleteArgs { id })
            .execute(&mut ui)
            .unwrap();

        let store = LocalStore::open_dir(dir.path()).unwrap();
        assert!(store.get_process(id).is_err());
        assert!(store.scan_steps().unwrap().is_empty());
        assert!(store.scan_artifacts().unwrap().is_empty());
        assert!(ui.has_success("Deleted process"));
    }
}
