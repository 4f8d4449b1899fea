//! Shared rendering of processes and steps.
//!
//! Used by `list`, `show`, and the `edit` session so every command
//! describes routes and steps the same way.

use crate::editor::Editor;
use crate::error::Result;
use crate::model::{NextRef, NextType, Process, Step};
use crate::sync::SyncStatus;
use crate::ui::theme::ProcGatherTheme;
use crate::ui::{format_bytes, format_relative_time, Table, UserInterface};

/// "end", "step 3", "handoff: Treasury", relative to `steps`.
pub fn route_label(step: &Step, steps: &[Step]) -> String {
    match (&step.next_type, &step.next_ref) {
        (NextType::Step, Some(NextRef::Step(key))) => {
            match steps.iter().position(|s| s.key == *key) {
                Some(position) => format!("step {}", position + 1),
                None => "step ?".to_string(),
            }
        }
        (NextType::Handoff, Some(NextRef::Handoff(target))) => format!("handoff: {}", target),
        _ => "end".to_string(),
    }
}

/// Table of processes for `list`.
pub fn process_table(processes: &[Process]) -> Table {
    let mut table = Table::new(vec!["ID", "Name", "Updated", "Cloud"]);
    for process in processes {
        table.add_row(vec![
            process.id.to_string(),
            process.name.clone(),
            format_relative_time(process.updated_at),
            process.cloud_id.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

/// Table of the editor's current steps.
pub fn step_table(editor: &Editor) -> Table {
    let steps = editor.steps();
    let mut table = Table::new(vec!["#", "Who", "Action", "Frequency", "Next", "Files"]);
    for (position, step) in steps.iter().enumerate() {
        let marker = if step.is_end { " ■" } else { "" };
        let files = editor
            .artifacts_of(position)
            .map(|a| a.len())
            .unwrap_or_default();
        table.add_row(vec![
            format!("{}{}", position + 1, marker),
            step.who.clone(),
            step.action.clone(),
            step.frequency.map(|f| f.to_string()).unwrap_or_default(),
            route_label(step, steps),
            if files == 0 {
                String::new()
            } else {
                files.to_string()
            },
        ]);
    }
    table
}

/// Header line plus step table for the open process.
pub fn show_process(ui: &mut dyn UserInterface, editor: &Editor) {
    let Some(process) = editor.process() else {
        ui.message("No process is open.");
        return;
    };

    ui.show_header(&process.name);
    if !process.description.is_empty() {
        ui.message(&process.description);
    }

    if editor.steps().is_empty() {
        ui.message("No steps yet.");
    } else {
        ui.message(&step_table(editor).render());
    }

    if editor.is_dirty() {
        ui.warning("Unsaved changes");
    }
    if ui.output_mode().shows_details() {
        if let Some(status) = editor.sync_status() {
            ui.show_hint(&format!("Sync: {}", sync_label(&status)));
        }
    }
}

/// Every field and attachment of one step.
pub fn show_step_detail(ui: &mut dyn UserInterface, editor: &Editor, index: usize) -> Result<()> {
    let theme = ProcGatherTheme::new();
    let step = editor.step(index)?;

    let title = if step.action.is_empty() {
        format!("Step {}", index + 1)
    } else {
        format!("Step {}: {}", index + 1, step.action)
    };
    ui.message(&format!("{}", theme.highlight.apply_to(title)));

    let fields = [
        ("Who", step.who.clone()),
        ("Tools", step.tools.join(", ")),
        ("Details", step.details.clone()),
        (
            "Frequency",
            step.frequency.map(|f| f.to_string()).unwrap_or_default(),
        ),
        ("Outcome", step.outcome.clone()),
        ("Duration", step.duration.clone()),
        ("Next", route_label(step, editor.steps())),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            ui.message(&format!("  {:<10} {}", theme.dim.apply_to(label), value));
        }
    }
    if step.is_end {
        ui.message(&format!("  {}", theme.end_marker.apply_to("■ End of process")));
    }

    for artifact in editor.artifacts_of(index)? {
        ui.message(&format!(
            "  {} [{}] {} {} {}",
            theme.dim.apply_to(format!("#{}", artifact.id)),
            artifact.kind,
            artifact.name,
            theme.dim.apply_to(&artifact.mime_type),
            theme.dim.apply_to(format_bytes(artifact.size)),
        ));
    }
    Ok(())
}

pub fn sync_label(status: &SyncStatus) -> String {
    match status {
        SyncStatus::Idle => "up to date".to_string(),
        SyncStatus::Syncing => "syncing".to_string(),
        SyncStatus::Error(message) => format!("offline ({})", message),
    }
}
