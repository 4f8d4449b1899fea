//! Attach command implementation.
//!
//! `procgather attach <step> <file>` stores an example file against a step
//! of a saved process. Without `--type` the role is asked for.

use std::fs;
use std::path::Path;

use crate::cli::args::AttachArgs;
use crate::cli::context::AppContext;
use crate::error::{ProcGatherError, Result};
use crate::model::{ArtifactKind, FileMeta};
use crate::ui::{format_bytes, Prompt, PromptOption, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Read a file into attachment metadata and content. The content type is
/// guessed from the extension unless `mime` is given.
pub fn read_attachment(path: &Path, mime: Option<&str>) -> Result<(FileMeta, Vec<u8>)> {
    let content = fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ProcGatherError::InvalidInput {
            message: format!("'{}' is not a file name", path.display()),
        })?
        .to_string();

    let size = content.len() as u64;
    let meta = match mime {
        Some(mime) => FileMeta::new(name, mime, size),
        None => FileMeta::guess(name, size),
    };
    Ok((meta, content))
}

fn ask_kind(ui: &mut dyn UserInterface) -> Result<ArtifactKind> {
    let options = ArtifactKind::ALL
        .iter()
        .map(|kind| PromptOption::new(kind.to_string(), kind.to_string()))
        .collect();
    let answer = ui.prompt(&Prompt::select("artifact_type", "What is this file?", options))?;
    answer
        .as_string()
        .parse()
        .map_err(|message| ProcGatherError::InvalidInput { message })
}

/// The attach command implementation.
pub struct AttachCommand {
    context: AppContext,
    args: AttachArgs,
}

impl AttachCommand {
    pub fn new(context: AppContext, args: AttachArgs) -> Self {
        Self { context, args }
    }
}

impl Command for AttachCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let index = self
            .args
            .step
            .checked_sub(1)
            .ok_or_else(|| ProcGatherError::InvalidInput {
                message: "Steps are numbered from 1".to_string(),
            })?;

        let mut editor = self.context.open_editor()?;
        self.context.open_process(&mut editor, self.args.process)?;
        if index >= editor.steps().len() {
            ui.error(&format!(
                "There is no step {} (process has {} steps)",
                self.args.step,
                editor.steps().len()
            ));
            return Ok(CommandResult::failure(1));
        }

        let (meta, content) = read_attachment(&self.args.file, self.args.mime.as_deref())?;
        let kind = match self.args.kind {
            Some(kind) => kind,
            None => ask_kind(ui)?,
        };

        let artifact = editor.add_artifact(index, kind, meta, &content)?;
        ui.success(&format!(
            "Attached {} ({}, {}) to step {} as #{}",
            artifact.name,
            artifact.kind,
            format_bytes(artifact.size),
            self.args.step,
            artifact.id
        ));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::model::Step;
    use crate::store::LocalStore;
    use crate::ui::MockUI;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        AppContext::new(
            Settings {
                data_dir: dir.path().join("data"),
                api_base: None,
                timeout: Duration::from_secs(1),
            },
            false,
        )
    }

    fn seed(dir: &TempDir) {
        let store = LocalStore::open_dir(dir.path().join("data")).unwrap();
        let process = store.create_process("Invoices").unwrap();
        store
            .save_steps(process.id, &[Step::new(process.id, 0)])
            .unwrap();
    }

    fn args(dir: &TempDir, step: usize, file: &str, kind: Option<ArtifactKind>) -> AttachArgs {
        AttachArgs {
            step,
            file: dir.path().join(file),
            process: None,
            kind,
            mime: None,
        }
    }

    #[test]
    fn read_attachment_guesses_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("totals.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();

        let (meta, content) = read_attachment(&path, None).unwrap();
        assert_eq!(meta.name, "totals.csv");
        assert_eq!(meta.mime_type, "text/csv");
        assert_eq!(meta.size, 8);
        assert_eq!(content.len(), 8);

        let (meta, _) = read_attachment(&path, Some("application/x-custom")).unwrap();
        assert_eq!(meta.mime_type, "application/x-custom");
    }

    #[test]
    fn read_attachment_missing_file_is_io_error() {
        let err = read_attachment(&PathBuf::from("/nonexistent/file.txt"), None).unwrap_err();
        assert!(matches!(err, ProcGatherError::Io(_)));
    }

    #[test]
    fn attaches_with_explicit_type() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        fs::write(dir.path().join("invoice.pdf"), b"%PDF-1.7").unwrap();

        let mut ui = MockUI::new();
        let result = AttachCommand::new(
            context(&dir),
            args(&dir, 1, "invoice.pdf", Some(ArtifactKind::Input)),
        )
        .execute(&mut ui)
        .unwrap();
        assert!(result.success);
        assert!(ui.prompts_shown().is_empty());

        let store = LocalStore::open_dir(dir.path().join("data")).unwrap();
        let artifacts = store.scan_artifacts().unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, ArtifactKind::Input);
        assert_eq!(
            store.artifact_content(artifacts[0].id).unwrap().unwrap(),
            b"%PDF-1.7"
        );
    }

    #[test]
    fn asks_for_type_when_missing() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        fs::write(dir.path().join("out.txt"), b"done").unwrap();

        let mut ui = MockUI::new();
        ui.set_prompt_response("artifact_type", "output");
        AttachCommand::new(context(&dir), args(&dir, 1, "out.txt", None))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(ui.prompts_shown(), ["artifact_type"]);
        assert!(ui.has_success("(output, 4 B)"));
    }

    #[test]
    fn step_out_of_range_fails() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        fs::write(dir.path().join("x.txt"), b"x").unwrap();

        let mut ui = MockUI::new();
        let result = AttachCommand::new(
            context(&dir),
            args(&dir, 5, "x.txt", Some(ArtifactKind::System)),
        )
        .execute(&mut ui)
        .unwrap();
        assert!(!result.success);
        assert!(ui.has_error("There is no step 5"));
    }

    #[test]
    fn step_zero_is_invalid() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        let mut ui = MockUI::new();
        let result = AttachCommand::new(
            context(&dir),
            args(&dir, 0, "x.txt", Some(ArtifactKind::System)),
        )
        .execute(&mut ui);
        assert!(matches!(result, Err(ProcGatherError::InvalidInput { .. })));
    }
}
