//! Edit command implementation.
//!
//! `procgather edit [id]` opens a process and reads one editing command per
//! line until `quit` or end of input. Steps are numbered from 1. Lines that
//! fail are reported and the session continues.
//!
//! ```text
//! add Receive invoice
//! set 1 who AP clerk
//! set 1 tools Outlook, SAP
//! next 1 handoff Treasury
//! save
//! ```

use std::path::PathBuf;

use crate::cli::args::EditArgs;
use crate::cli::context::AppContext;
use crate::editor::{Direction, Editor, Route, StepPatch};
use crate::error::{ProcGatherError, Result};
use crate::model::{ArtifactId, ArtifactKind, Frequency};
use crate::ui::UserInterface;

use super::attach::read_attachment;
use super::dispatcher::{Command, CommandResult};
use super::display::{show_process, show_step_detail, sync_label};

const HELP: &str = "\
Commands (steps are numbered from 1):
  list                          show all steps
  show <n>                      show one step in full
  add [action]                  append a step
  set <n> <field> <value>       who, action, details, outcome, duration,
                                tools (comma separated), frequency (or none)
  end <n>                       mark step n as the end of the process
  next <n> <m>                  route step n to step m
  next <n> handoff <target>     hand off to another team or system
  next <n> end                  route step n to the end
  move <n> up|down              move step n one position
  rm <n>                        remove step n
  attach <n> <type> <file>      attach a file (input, output, system)
  detach <artifact id>          remove an attachment
  undo / redo                   step through edit history
  save                          commit changes
  rename <name>                 rename the process
  quit                          leave the editor";

/// Where a `next` command sends control.
#[derive(Debug, Clone, PartialEq)]
enum NextTarget {
    Step(usize),
    Handoff(String),
    End,
}

/// One parsed editor line.
#[derive(Debug, Clone, PartialEq)]
enum EditAction {
    Help,
    List,
    Show(usize),
    Add(Option<String>),
    Set(usize, StepPatch),
    End(usize),
    Next(usize, NextTarget),
    Move(usize, Direction),
    Remove(usize),
    Attach {
        step: usize,
        kind: ArtifactKind,
        path: PathBuf,
    },
    Detach(ArtifactId),
    Undo,
    Redo,
    Save,
    Rename(String),
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

fn invalid(message: impl Into<String>) -> ProcGatherError {
    ProcGatherError::InvalidInput {
        message: message.into(),
    }
}

/// 1-based step number to 0-based position.
fn parse_step(token: Option<&str>) -> Result<usize> {
    let token = token.ok_or_else(|| invalid("Missing step number"))?;
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(invalid(format!("'{}' is not a step number", token))),
    }
}

/// First whitespace-separated word and the trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(at) => (&s[..at], s[at..].trim()),
        None => (s, ""),
    }
}

fn parse_field(step: usize, rest: &str) -> Result<EditAction> {
    let (field, value) = split_word(rest);
    let patch = match field.to_lowercase().as_str() {
        "who" => StepPatch::new().who(value),
        "action" => StepPatch::new().action(value),
        "details" => StepPatch::new().details(value),
        "outcome" => StepPatch::new().outcome(value),
        "duration" => StepPatch::new().duration(value),
        "tools" => StepPatch::new().tools(value.split(',').map(str::trim)),
        "frequency" => {
            let frequency = match value.to_lowercase().as_str() {
                "" | "none" => None,
                _ => Some(value.parse::<Frequency>().map_err(invalid)?),
            };
            StepPatch::new().frequency(frequency)
        }
        "" => return Err(invalid("Missing field name")),
        other => return Err(invalid(format!("Unknown field '{}'", other))),
    };
    Ok(EditAction::Set(step, patch))
}

fn parse_line(line: &str) -> Result<EditAction> {
    let (command, rest) = split_word(line);
    let mut args = rest.split_whitespace();

    let action = match command.to_lowercase().as_str() {
        "help" | "?" => EditAction::Help,
        "list" | "ls" => EditAction::List,
        "show" => EditAction::Show(parse_step(args.next())?),
        "add" => EditAction::Add(Some(rest.to_string()).filter(|a| !a.is_empty())),
        "set" => {
            let (step, rest) = split_word(rest);
            parse_field(parse_step(Some(step).filter(|s| !s.is_empty()))?, rest)?
        }
        "end" => EditAction::End(parse_step(args.next())?),
        "next" => {
            let (step, rest) = split_word(rest);
            let step = parse_step(Some(step).filter(|s| !s.is_empty()))?;
            let (target, text) = split_word(rest);
            let target = match target.to_lowercase().as_str() {
                "end" => NextTarget::End,
                "handoff" if !text.is_empty() => NextTarget::Handoff(text.to_string()),
                "handoff" => return Err(invalid("Missing handoff target")),
                _ => NextTarget::Step(parse_step(Some(target).filter(|t| !t.is_empty()))?),
            };
            EditAction::Next(step, target)
        }
        "move" | "mv" => {
            let step = parse_step(args.next())?;
            let direction = match args.next().map(str::to_lowercase).as_deref() {
                Some("up") => Direction::Up,
                Some("down") => Direction::Down,
                _ => return Err(invalid("Expected 'up' or 'down'")),
            };
            EditAction::Move(step, direction)
        }
        "rm" | "remove" => EditAction::Remove(parse_step(args.next())?),
        "attach" => {
            let (step, rest) = split_word(rest);
            let step = parse_step(Some(step).filter(|s| !s.is_empty()))?;
            let (kind, path) = split_word(rest);
            let kind = kind.parse::<ArtifactKind>().map_err(invalid)?;
            if path.is_empty() {
                return Err(invalid("Missing file path"));
            }
            EditAction::Attach {
                step,
                kind,
                path: PathBuf::from(path),
            }
        }
        "detach" => {
            let id = args.next().ok_or_else(|| invalid("Missing artifact id"))?;
            EditAction::Detach(
                id.parse()
                    .map_err(|_| invalid(format!("'{}' is not an artifact id", id)))?,
            )
        }
        "undo" => EditAction::Undo,
        "redo" => EditAction::Redo,
        "save" => EditAction::Save,
        "rename" if !rest.is_empty() => EditAction::Rename(rest.to_string()),
        "rename" => return Err(invalid("Missing process name")),
        "quit" | "exit" | "q" => EditAction::Quit,
        other => {
            return Err(invalid(format!(
                "Unknown command '{}'; type 'help' for a list",
                other
            )))
        }
    };
    Ok(action)
}

/// Error text with step positions shown the way the user typed them.
fn describe_error(error: &ProcGatherError) -> String {
    match error {
        ProcGatherError::StepIndexOutOfRange { index, len } => {
            format!("There is no step {} (process has {} steps)", index + 1, len)
        }
        other => other.to_string(),
    }
}

/// The edit command implementation.
pub struct EditCommand {
    context: AppContext,
    args: EditArgs,
}

impl EditCommand {
    pub fn new(context: AppContext, args: EditArgs) -> Self {
        Self { context, args }
    }

    fn open(&self, ui: &mut dyn UserInterface, editor: &mut Editor) -> Result<()> {
        match self.args.id {
            Some(id) => editor.open_process(id),
            None => {
                if editor.open_latest()?.is_none() {
                    let process = editor.create_process()?;
                    ui.success(&format!("Created process {} ({})", process.id, process.name));
                }
                Ok(())
            }
        }
    }

    fn run(
        &self,
        ui: &mut dyn UserInterface,
        editor: &mut Editor,
        action: EditAction,
    ) -> Result<Flow> {
        match action {
            EditAction::Help => ui.message(HELP),
            EditAction::List => show_process(ui, editor),
            EditAction::Show(index) => show_step_detail(ui, editor, index)?,
            EditAction::Add(action) => {
                let patch = match action {
                    Some(action) => StepPatch::new().action(action),
                    None => StepPatch::new(),
                };
                let index = editor.add_step_with(patch)?;
                ui.success(&format!("Added step {}", index + 1));
            }
            EditAction::Set(index, patch) => {
                if editor.update_step(index, patch)? {
                    ui.success(&format!("Updated step {}", index + 1));
                } else {
                    ui.message(&format!("Step {} unchanged", index + 1));
                }
            }
            EditAction::End(index) => {
                editor.mark_end(index)?;
                ui.success(&format!("Step {} ends the process", index + 1));
            }
            EditAction::Next(index, target) => {
                match target {
                    NextTarget::Step(to) => editor.route_to_step(index, to)?,
                    NextTarget::Handoff(text) => {
                        editor.update_step(index, StepPatch::handoff(text))?
                    }
                    NextTarget::End => editor.update_step(index, StepPatch::new().route(Route::End))?,
                };
                let label = super::display::route_label(editor.step(index)?, editor.steps());
                ui.success(&format!("Step {} goes to {}", index + 1, label));
            }
            EditAction::Move(index, direction) => {
                if editor.move_step(index, direction)? {
                    let to = match direction {
                        Direction::Up => index,
                        Direction::Down => index + 2,
                    };
                    ui.success(&format!("Moved step {} to position {}", index + 1, to));
                } else {
                    ui.warning(&format!("Step {} cannot move further", index + 1));
                }
            }
            EditAction::Remove(index) => {
                if editor.step_has_artifacts(index)? {
                    let question = format!(
                        "Step {} has attachments that will be deleted on save. Remove it?",
                        index + 1
                    );
                    if !self.context.confirm(ui, "remove_step", &question)? {
                        ui.warning(&format!("Step {} kept", index + 1));
                        return Ok(Flow::Continue);
                    }
                }
                editor.remove_step(index)?;
                ui.success(&format!("Removed step {}", index + 1));
            }
            EditAction::Attach { step, kind, path } => {
                let (meta, content) = read_attachment(&path, None)?;
                let artifact = editor.add_artifact(step, kind, meta, &content)?;
                ui.success(&format!(
                    "Attached {} to step {} as #{}",
                    artifact.name,
                    step + 1,
                    artifact.id
                ));
            }
            EditAction::Detach(id) => {
                editor.remove_artifact(id)?;
                ui.success(&format!("Removed attachment #{}", id));
            }
            EditAction::Undo => {
                if editor.undo() {
                    ui.success("Undone");
                } else {
                    ui.warning("Nothing to undo");
                }
            }
            EditAction::Redo => {
                if editor.redo() {
                    ui.success("Redone");
                } else {
                    ui.warning("Nothing to redo");
                }
            }
            EditAction::Save => {
                editor.save()?;
                ui.success(&format!("Saved {} steps", editor.steps().len()));
            }
            EditAction::Rename(name) => {
                let id = editor
                    .process()
                    .map(|p| p.id)
                    .ok_or(ProcGatherError::NoActiveProcess)?;
                let renamed = editor.rename_process(id, &name)?;
                ui.success(&format!("Renamed to {}", renamed.name));
            }
            EditAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Offer to save pending edits before leaving.
    fn finish(&self, ui: &mut dyn UserInterface, editor: &mut Editor) -> Result<()> {
        if !editor.is_dirty() {
            return Ok(());
        }
        if self
            .context
            .confirm(ui, "save_on_quit", "Save changes before leaving?")?
        {
            editor.save()?;
            ui.success(&format!("Saved {} steps", editor.steps().len()));
        } else {
            ui.warning("Unsaved changes discarded");
        }
        Ok(())
    }
}

impl Command for EditCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut editor = self.context.open_editor()?;
        self.open(ui, &mut editor)?;

        show_process(ui, &editor);
        ui.show_hint("Type 'help' for commands.");

        let mut failures = 0usize;
        while let Some(line) = ui.read_line("procgather> ")? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let outcome = parse_line(line).and_then(|action| self.run(ui, &mut editor, action));
            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    failures += 1;
                    ui.error(&describe_error(&e));
                }
            }
        }

        self.finish(ui, &mut editor)?;

        if editor.sync_enabled() {
            editor.wait_for_sync();
            if let Some(status) = editor.sync_status() {
                if status.is_error() {
                    ui.warning(&format!("Sync: {}", sync_label(&status)));
                }
            }
        }

        if failures > 0 && !ui.is_interactive() {
            return Ok(CommandResult::failure(1));
        }
        Ok(CommandResult::success())
    }
}
