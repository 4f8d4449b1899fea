//! Export command implementation.
//!
//! Writes the saved state of a process as an `.apo.json` document.
//! Attachment content stays in the local store.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::ExportArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::transfer::export_file_name;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The export command implementation.
pub struct ExportCommand {
    context: AppContext,
    args: ExportArgs,
}

impl ExportCommand {
    pub fn new(context: AppContext, args: ExportArgs) -> Self {
        Self { context, args }
    }
}

impl Command for ExportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut editor = self.context.open_editor()?;
        self.context.open_process(&mut editor, self.args.id)?;

        let document = editor.export()?;
        let json = document.to_json()?;

        let target = match &self.args.output {
            Some(path) if path == Path::new("-") => {
                println!("{}", json);
                return Ok(CommandResult::success());
            }
            Some(path) => path.clone(),
            None => PathBuf::from(export_file_name(&document.process.name)),
        };

        fs::write(&target, json)?;
        ui.success(&format!(
            "Exported {} ({} steps, {} attachments) to {}",
            document.process.name,
            document.steps.len(),
            document.artifacts.len(),
            target.display()
        ));
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

    #[test]
    fn writes_document_to_file() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        {
            let store = LocalStore::open_dir(&data).unwrap();
            let process = store.create_process("Month end").unwrap();
            let steps = store
                .save_steps(process.id, &[Step::new(process.id, 0)])
                .unwrap();
            store
                .add_artifact(
                    process.id,
                    steps[0].id.unwrap(),
                    ArtifactKind::Output,
                    FileMeta::guess("ledger.xlsx", 5),
                    b"bytes",
                )
                .unwrap();
        }

        let output = dir.path().join("out.apo.json");
        let ctx = AppContext::new(
            Settings {
                data_dir: data,
                api_base: None,
                timeout: Duration::from_secs(1),
            },
            false,
        );
        let mut ui = MockUI::new();
        ExportCommand::new(
            ctx,
            ExportArgs {
                id: None,
                output: Some(output.clone()),
            },
        )
        .execute(&mut ui)
        .unwrap();

        assert!(ui.has_success("1 steps, 1 attachments"));
        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(doc["process"]["name"], "Month end");
        assert_eq!(doc["artifacts"][0]["name"], "ledger.xlsx");
        assert!(doc["artifacts"][0].get("content").is_none());
    }
}
