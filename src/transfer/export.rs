//! Export of a persisted process.

use serde::{Deserialize, Serialize};

use crate::error::{ProcGatherError, Result};
use crate::model::{Artifact, Process, ProcessId, Step};
use crate::store::LocalStore;

/// File extension of export documents.
pub const EXPORT_EXTENSION: &str = ".apo.json";

/// Portable snapshot of one process.
///
/// Artifacts are metadata only; their content stays in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub process: Process,
    pub steps: Vec<Step>,
    pub artifacts: Vec<Artifact>,
}

impl ExportDocument {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ProcGatherError::storage(format!("Failed to serialize export: {}", e)))
    }
}

/// Snapshot the persisted state of a process. Unsaved edits are not included.
pub fn export_process(store: &LocalStore, id: ProcessId) -> Result<ExportDocument> {
    let process = store.get_process(id)?;
    let contents = store.load_steps_and_artifacts(id)?;

    let mut artifacts = Vec::new();
    for step in &contents.steps {
        if let Some(attached) = step.id.and_then(|sid| contents.artifacts.get(&sid)) {
            artifacts.extend(attached.iter().cloned());
        }
    }

    tracing::debug!(
        "Exported process {} with {} steps and {} artifacts",
        id,
        contents.steps.len(),
        artifacts.len()
    );

    Ok(ExportDocument {
        process,
        steps: contents.steps,
        artifacts,
    })
}

/// Suggested file name for an export: whitespace runs become `_`.
pub fn export_file_name(process_name: &str) -> String {
    let stem = process_name.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "process".to_string() } else { stem };
    format!("{}{}", stem, EXPORT_EXTENSION)
}
