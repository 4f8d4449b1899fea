//! Import of export documents as new processes.
//!
//! Documents are parsed leniently (missing or null text fields become empty)
//! but validated strictly before anything is written. Both current documents
//! (step routes by key) and legacy ones (step routes by target index) are
//! accepted.

use chrono::Utc;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::error::{ProcGatherError, Result};
use crate::model::{
    Artifact, ArtifactKind, FileMeta, Frequency, NextRef, NextType, Process, ProcessId, Step,
    StepKey,
};
use crate::store::LocalStore;

/// Appended to the name of every imported process.
pub const IMPORT_SUFFIX: &str = " (import)";

/// Name used when the document carries none.
pub const DEFAULT_IMPORT_NAME: &str = "Imported Process";

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    process: Option<RawProcess>,
    #[serde(default)]
    steps: Vec<RawStep>,
    #[serde(default)]
    artifacts: Vec<RawArtifact>,
}

#[derive(Deserialize)]
struct RawProcess {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRef {
    Index(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    key: Option<StepKey>,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    who: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    tools: Option<Vec<String>>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(default)]
    outcome: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    is_end: Option<bool>,
    #[serde(default)]
    next_type: Option<NextType>,
    #[serde(default)]
    next_ref: Option<RawRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    step_id: Option<u64>,
    #[serde(rename = "type")]
    kind: ArtifactKind,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    size: Option<u64>,
}

/// Artifact metadata of an import, tied to a step by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedArtifact {
    pub step: usize,
    pub kind: ArtifactKind,
    pub meta: FileMeta,
}

/// A validated import, ready to be written.
///
/// Steps are in display order with fresh keys and no ids; routes point at
/// the fresh keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDocument {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
    pub artifacts: Vec<ImportedArtifact>,
}

impl ImportDocument {
    /// Name the imported process will get.
    pub fn import_name(&self) -> String {
        let base = if self.name.trim().is_empty() {
            DEFAULT_IMPORT_NAME
        } else {
            self.name.as_str()
        };
        format!("{}{}", base, IMPORT_SUFFIX)
    }
}

/// Parse and validate an export document.
pub fn parse_document(json: &str) -> Result<ImportDocument> {
    let raw: RawDocument = serde_json::from_str(json)
        .map_err(|e| ProcGatherError::invalid_document(format!("Malformed JSON: {}", e)))?;
    validate(raw)
}

fn validate(raw: RawDocument) -> Result<ImportDocument> {
    let (name, description) = match raw.process {
        Some(p) => (p.name.unwrap_or_default(), p.description.unwrap_or_default()),
        None => (String::new(), String::new()),
    };

    let mut ids = HashSet::new();
    let mut indexes = HashSet::new();
    for (position, step) in raw.steps.iter().enumerate() {
        if let Some(id) = step.id {
            if !ids.insert(id) {
                return Err(ProcGatherError::invalid_document(format!(
                    "Duplicate step id {}",
                    id
                )));
            }
        }
        let index = step.index.unwrap_or(position);
        if !indexes.insert(index) {
            return Err(ProcGatherError::invalid_document(format!(
                "Duplicate step index {}",
                index
            )));
        }
    }

    let ends = raw.steps.iter().filter(|s| s.is_end == Some(true)).count();
    if ends > 1 {
        return Err(ProcGatherError::invalid_document(format!(
            "{} steps are marked as end; at most one is allowed",
            ends
        )));
    }

    // Display order, then fresh keys indexed by every way a route may name a step.
    let mut order: Vec<usize> = (0..raw.steps.len()).collect();
    order.sort_by_key(|&i| raw.steps[i].index.unwrap_or(i));

    let fresh: Vec<StepKey> = order.iter().map(|_| StepKey::new()).collect();
    let mut by_old_key = HashMap::new();
    let mut by_old_index = HashMap::new();
    let mut by_old_id = HashMap::new();
    for (position, &i) in order.iter().enumerate() {
        let step = &raw.steps[i];
        if let Some(key) = step.key {
            by_old_key.insert(key, fresh[position]);
        }
        by_old_index.insert(step.index.unwrap_or(i) as u64, fresh[position]);
        if let Some(id) = step.id {
            by_old_id.insert(id, position);
        }
    }

    let mut steps = Vec::with_capacity(order.len());
    for (position, &i) in order.iter().enumerate() {
        let raw_step = &raw.steps[i];
        let mut step = Step::new(ProcessId::new(0), position);
        step.key = fresh[position];
        step.who = raw_step.who.clone().unwrap_or_default();
        step.action = raw_step.action.clone().unwrap_or_default();
        step.set_tools(raw_step.tools.iter().flatten());
        step.details = raw_step.details.clone().unwrap_or_default();
        step.outcome = raw_step.outcome.clone().unwrap_or_default();
        step.duration = raw_step.duration.clone().unwrap_or_default();
        step.frequency = match raw_step.frequency.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(
                label
                    .parse::<Frequency>()
                    .map_err(ProcGatherError::invalid_document)?,
            ),
        };

        // Legacy index routes may point past the end after a removal; those
        // are dropped. Key routes must resolve.
        let mut next_type = raw_step.next_type.unwrap_or_default();
        let next_ref = match (next_type, &raw_step.next_ref) {
            (_, None) | (NextType::End, _) => None,
            (NextType::Step, Some(RawRef::Index(index))) => match by_old_index.get(index) {
                Some(&target) => Some(NextRef::Step(target)),
                None => {
                    tracing::warn!(
                        "Step {} routes to missing step index {}; route dropped",
                        position,
                        index
                    );
                    next_type = NextType::End;
                    None
                }
            },
            (NextType::Step, Some(RawRef::Text(text))) => {
                let target = text
                    .parse::<StepKey>()
                    .ok()
                    .and_then(|key| by_old_key.get(&key).copied())
                    .ok_or_else(|| {
                        ProcGatherError::invalid_document(format!(
                            "Step {} routes to unknown step {}",
                            position, text
                        ))
                    })?;
                Some(NextRef::Step(target))
            }
            (NextType::Handoff, Some(RawRef::Text(text))) => Some(NextRef::Handoff(text.clone())),
            (NextType::Handoff, Some(RawRef::Index(n))) => Some(NextRef::Handoff(n.to_string())),
        };
        step.next_type = next_type;
        step.next_ref = next_ref;

        if raw_step.is_end == Some(true) {
            step.mark_end();
        }
        steps.push(step);
    }

    let mut artifacts = Vec::with_capacity(raw.artifacts.len());
    for artifact in raw.artifacts {
        let step = artifact
            .step_id
            .and_then(|id| by_old_id.get(&id).copied())
            .ok_or_else(|| {
                ProcGatherError::invalid_document(format!(
                    "Artifact {} references an unknown step",
                    artifact.name.as_deref().unwrap_or("(unnamed)")
                ))
            })?;
        artifacts.push(ImportedArtifact {
            step,
            kind: artifact.kind,
            meta: FileMeta::new(
                artifact.name.unwrap_or_default(),
                artifact.mime_type.unwrap_or_default(),
                artifact.size.unwrap_or(0),
            ),
        });
    }

    Ok(ImportDocument {
        name,
        description,
        steps,
        artifacts,
    })
}

/// Write a validated import as a new process, in one transaction.
///
/// Imported artifacts are metadata only.
pub fn import_document(store: &LocalStore, doc: &ImportDocument) -> Result<Process> {
    let name = doc.import_name();
    let process = store.transaction(|db| {
        let pid = db.next_process_id();
        let mut process = Process::new(pid, name.as_str(), Utc::now());
        process.description = doc.description.clone();
        db.processes.insert(pid, process.clone());

        let mut step_ids = Vec::with_capacity(doc.steps.len());
        for step in &doc.steps {
            let id = db.next_step_id();
            let mut row = step.clone();
            row.id = Some(id);
            row.process_id = pid;
            db.steps.insert(id, row);
            step_ids.push(id);
        }

        for artifact in &doc.artifacts {
            let step_id = *step_ids.get(artifact.step).ok_or_else(|| {
                ProcGatherError::invalid_document(format!(
                    "Artifact {} references step {} of {}",
                    artifact.meta.name,
                    artifact.step,
                    step_ids.len()
                ))
            })?;
            let id = db.next_artifact_id();
            db.artifacts.insert(
                id,
                Artifact {
                    id,
                    process_id: pid,
                    step_id,
                    kind: artifact.kind,
                    name: artifact.meta.name.clone(),
                    mime_type: artifact.meta.mime_type.clone(),
                    size: artifact.meta.size,
                },
            );
        }
        Ok(process)
    })?;

    tracing::info!(
        "Imported process {} ({}) with {} steps and {} artifacts",
        process.id,
        process.name,
        doc.steps.len(),
        doc.artifacts.len()
    );
    Ok(process)
}

/// Parse, validate, and import in one go.
pub fn import_json(store: &LocalStore, json: &str) -> Result<Process> {
    let doc = parse_document(json)?;
    import_document(store, &doc)
}
