//! On-disk layout of the record database and its migrations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::error::{ProcGatherError, Result};
use crate::model::{Artifact, ArtifactId, Process, ProcessId, Step, StepId, StepKey};

/// Current schema version.
///
/// Version history:
/// - 1: step routes stored the target's array index, steps had no key
/// - 2: steps carry a stable `key`, step routes store the target key
pub const CURRENT_VERSION: u32 = 2;

/// The three record collections plus id counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    /// Schema version for migration.
    pub version: u32,

    #[serde(default)]
    last_process_id: u64,

    #[serde(default)]
    last_step_id: u64,

    #[serde(default)]
    last_artifact_id: u64,

    #[serde(default)]
    pub processes: BTreeMap<ProcessId, Process>,

    #[serde(default)]
    pub steps: BTreeMap<StepId, Step>,

    #[serde(default)]
    pub artifacts: BTreeMap<ArtifactId, Artifact>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// An empty database at the current version.
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            last_process_id: 0,
            last_step_id: 0,
            last_artifact_id: 0,
            processes: BTreeMap::new(),
            steps: BTreeMap::new(),
            artifacts: BTreeMap::new(),
        }
    }

    /// Allocate a process id.
    pub fn next_process_id(&mut self) -> ProcessId {
        self.last_process_id += 1;
        ProcessId::new(self.last_process_id)
    }

    /// Allocate a step id.
    pub fn next_step_id(&mut self) -> StepId {
        self.last_step_id += 1;
        StepId::new(self.last_step_id)
    }

    /// Allocate an artifact id.
    pub fn next_artifact_id(&mut self) -> ArtifactId {
        self.last_artifact_id += 1;
        ArtifactId::new(self.last_artifact_id)
    }

    /// Make sure an externally supplied step id is never handed out again.
    pub fn reserve_step_id(&mut self, id: StepId) {
        self.last_step_id = self.last_step_id.max(id.get());
    }

    pub fn process(&self, id: ProcessId) -> Result<&Process> {
        self.processes
            .get(&id)
            .ok_or(ProcGatherError::ProcessNotFound { id: id.get() })
    }

    pub fn process_mut(&mut self, id: ProcessId) -> Result<&mut Process> {
        self.processes
            .get_mut(&id)
            .ok_or(ProcGatherError::ProcessNotFound { id: id.get() })
    }

    /// Steps of a process, ordered by index.
    pub fn steps_of(&self, process_id: ProcessId) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self
            .steps
            .values()
            .filter(|s| s.process_id == process_id)
            .collect();
        steps.sort_by_key(|s| s.index);
        steps
    }

    /// Artifacts of a process, in id order.
    pub fn artifacts_of(&self, process_id: ProcessId) -> Vec<&Artifact> {
        self.artifacts
            .values()
            .filter(|a| a.process_id == process_id)
            .collect()
    }

    /// Remove every artifact matching `predicate`, returning the removed ids.
    pub fn remove_artifacts_where(
        &mut self,
        predicate: impl Fn(&Artifact) -> bool,
    ) -> Vec<ArtifactId> {
        let doomed: Vec<ArtifactId> = self
            .artifacts
            .values()
            .filter(|a| predicate(a))
            .map(|a| a.id)
            .collect();
        for id in &doomed {
            self.artifacts.remove(id);
        }
        doomed
    }
}

/// Turn a raw stored document into a [`Database`], migrating older
/// versions forward.
///
/// Returns the database and whether a migration ran.
pub fn decode(mut raw: Value) -> Result<(Database, bool)> {
    let found = match raw.get("version").and_then(Value::as_u64) {
        None => 1,
        Some(v) => u32::try_from(v).map_err(|_| ProcGatherError::UnsupportedSchema {
            found: u32::MAX,
            supported: CURRENT_VERSION,
        })?,
    };

    if found > CURRENT_VERSION {
        return Err(ProcGatherError::UnsupportedSchema {
            found,
            supported: CURRENT_VERSION,
        });
    }

    for version in found..CURRENT_VERSION {
        migrate(version, &mut raw)?;
    }

    if let Some(doc) = raw.as_object_mut() {
        doc.insert("version".to_string(), Value::from(CURRENT_VERSION));
    }

    let db = serde_json::from_value(raw)
        .map_err(|e| ProcGatherError::storage(format!("Failed to decode store: {}", e)))?;
    Ok((db, found != CURRENT_VERSION))
}

/// Migration hook: upgrade a document from `from` to `from + 1`.
fn migrate(from: u32, doc: &mut Value) -> Result<()> {
    tracing::info!("Migrating store schema from version {} to {}", from, from + 1);
    match from {
        1 => keys_for_step_routes(doc),
        other => Err(ProcGatherError::storage(format!(
            "No migration from schema version {}",
            other
        ))),
    }
}

/// v1 → v2: give every step a key and rewrite index routes as key routes.
fn keys_for_step_routes(doc: &mut Value) -> Result<()> {
    let Some(steps) = doc.get_mut("steps").and_then(Value::as_object_mut) else {
        return Ok(());
    };

    let mut by_position: HashMap<(u64, u64), String> = HashMap::new();
    for row in steps.values_mut() {
        let row = as_row(row)?;
        let key = match row.get("key").and_then(Value::as_str) {
            Some(existing) => existing.to_string(),
            None => {
                let fresh = StepKey::new().to_string();
                row.insert("key".to_string(), Value::from(fresh.clone()));
                fresh
            }
        };
        let process = row.get("processId").and_then(Value::as_u64).unwrap_or(0);
        let index = row.get("index").and_then(Value::as_u64).unwrap_or(0);
        by_position.insert((process, index), key);
    }

    for row in steps.values_mut() {
        let row = as_row(row)?;
        let routes_to_step = row.get("nextType").and_then(Value::as_str) == Some("step");
        let Some(target) = row.get("nextRef").and_then(Value::as_u64) else {
            continue;
        };
        let process = row.get("processId").and_then(Value::as_u64).unwrap_or(0);
        match by_position.get(&(process, target)) {
            Some(key) if routes_to_step => {
                row.insert("nextRef".to_string(), Value::from(key.clone()));
            }
            _ => {
                row.remove("nextRef");
                if routes_to_step {
                    row.insert("nextType".to_string(), Value::from("end"));
                }
            }
        }
    }

    Ok(())
}

fn as_row(value: &mut Value) -> Result<&mut Map<String, Value>> {
    value
        .as_object_mut()
        .ok_or_else(|| ProcGatherError::storage("Step row is not an object"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NextRef, NextType};
    use serde_json::json;

    fn v1_document() -> Value {
        json!({
            "version": 1,
            "lastProcessId": 1,
            "lastStepId": 2,
            "processes": {
                "1": {
                    "id": 1,
                    "name": "Invoices",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-01T00:00:00Z"
                }
            },
            "steps": {
                "1": {
                    "id": 1, "processId": 1, "index": 0, "action": "Receive",
                    "tools": [], "frequency": "", "isEnd": false,
                    "nextType": "step", "nextRef": 1
                },
                "2": {
                    "id": 2, "processId": 1, "index": 1, "action": "Approve",
                    "tools": [], "frequency": "Daily", "isEnd": true,
                    "nextType": "end"
                }
            }
        })
    }

    #[test]
    fn new_database_is_current_and_empty() {
        let db = Database::new();
        assert_eq!(db.version, CURRENT_VERSION);
        assert!(db.processes.is_empty());
        assert!(db.steps.is_empty());
        assert!(db.artifacts.is_empty());
    }

    #[test]
    fn id_allocation_is_monotonic() {
        let mut db = Database::new();
        assert_eq!(db.next_step_id(), StepId::new(1));
        assert_eq!(db.next_step_id(), StepId::new(2));
        db.reserve_step_id(StepId::new(10));
        assert_eq!(db.next_step_id(), StepId::new(11));
        db.reserve_step_id(StepId::new(3));
        assert_eq!(db.next_step_id(), StepId::new(12));
    }

    #[test]
    fn current_document_decodes_without_migration() {
        let raw = serde_json::to_value(Database::new()).unwrap();
        let (db, migrated) = decode(raw).unwrap();
        assert!(!migrated);
        assert_eq!(db, Database::new());
    }

    #[test]
    fn newer_document_is_rejected() {
        let raw = json!({ "version": CURRENT_VERSION + 1 });
        let err = decode(raw).unwrap_err();
        assert!(matches!(err, ProcGatherError::UnsupportedSchema { .. }));
    }

    #[test]
    fn oversized_version_is_rejected() {
        let raw = json!({ "version": (1u64 << 32) + 1 });
        let err = decode(raw).unwrap_err();
        assert!(matches!(err, ProcGatherError::UnsupportedSchema { .. }));
    }

    #[test]
    fn v1_index_routes_become_key_routes() {
        let (db, migrated) = decode(v1_document()).unwrap();
        assert!(migrated);
        assert_eq!(db.version, CURRENT_VERSION);

        let first = &db.steps[&StepId::new(1)];
        let second = &db.steps[&StepId::new(2)];
        assert_eq!(first.next_type, NextType::Step);
        assert_eq!(first.next_ref, Some(NextRef::Step(second.key)));
        assert!(second.next_ref.is_none());
        assert_ne!(first.key, second.key);
    }

    #[test]
    fn v1_dangling_index_route_is_dropped() {
        let mut doc = v1_document();
        doc["steps"]["1"]["nextRef"] = json!(9);
        let (db, _) = decode(doc).unwrap();
        let step = &db.steps[&StepId::new(1)];
        assert!(step.next_ref.is_none());
        assert_eq!(step.next_type, NextType::End);
    }

    #[test]
    fn counters_survive_decoding() {
        let (mut db, _) = decode(v1_document()).unwrap();
        assert_eq!(db.next_step_id(), StepId::new(3));
        assert_eq!(db.next_process_id(), ProcessId::new(2));
    }

    #[test]
    fn steps_of_orders_by_index() {
        let (db, _) = decode(v1_document()).unwrap();
        let steps = db.steps_of(ProcessId::new(1));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].action, "Receive");
        assert_eq!(steps[1].action, "Approve");
    }
}
