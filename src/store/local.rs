//! The transactional record store.

use chrono::Utc;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ProcGatherError, Result};
use crate::model::{
    Artifact, ArtifactId, ArtifactKind, FileMeta, Process, ProcessId, Step, StepId,
};

use super::backend::{FileBackend, MemoryBackend, StorageBackend};
use super::schema::{self, Database};

/// Steps of a process plus their artifacts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessContents {
    /// Steps ordered by index.
    pub steps: Vec<Step>,
    /// Artifacts grouped by owning step.
    pub artifacts: BTreeMap<StepId, Vec<Artifact>>,
}

/// Durable store for processes, steps, and artifacts.
///
/// Every write runs as a copy-on-write transaction: the operation edits a
/// draft of the tables, the draft is committed to the backend, and only
/// then is it published to readers. A failure at any point leaves both the
/// persisted and the published state exactly as they were.
pub struct LocalStore {
    backend: Box<dyn StorageBackend>,
    tables: RwLock<Database>,
}

impl LocalStore {
    /// Open a store over `backend`, migrating older documents.
    pub fn open(backend: impl StorageBackend + 'static) -> Result<Self> {
        let db = match backend.load()? {
            Some(raw) => {
                let (db, migrated) = schema::decode(raw)?;
                if migrated {
                    backend.commit(&db)?;
                }
                db
            }
            None => Database::new(),
        };

        tracing::debug!(
            "Opened store: {} processes, {} steps, {} artifacts",
            db.processes.len(),
            db.steps.len(),
            db.artifacts.len()
        );

        Ok(Self {
            backend: Box::new(backend),
            tables: RwLock::new(db),
        })
    }

    /// Open a file-backed store rooted at `dir`.
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open(FileBackend::new(dir))
    }

    /// A fresh store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            tables: RwLock::new(Database::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Database>> {
        self.tables
            .read()
            .map_err(|_| ProcGatherError::storage("Store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Database>> {
        self.tables
            .write()
            .map_err(|_| ProcGatherError::storage("Store lock poisoned"))
    }

    /// Run `op` as one atomic transaction.
    ///
    /// `op` works on a draft copy of all tables. The draft replaces the
    /// current state only if `op` succeeds and the backend commit succeeds.
    pub fn transaction<T>(&self, op: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut tables = self.write()?;
        let mut draft = tables.clone();
        let out = op(&mut draft)?;
        self.backend.commit(&draft)?;
        *tables = draft;
        Ok(out)
    }

    /// Best-effort removal of artifact content after its record is gone.
    fn discard_blobs(&self, ids: &[ArtifactId]) {
        for id in ids {
            if let Err(e) = self.backend.remove_blob(*id) {
                tracing::warn!("Failed to remove content of artifact {}: {}", id, e);
            }
        }
    }

    // --- Processes ---

    /// Create an empty process.
    pub fn create_process(&self, name: &str) -> Result<Process> {
        let process = self.transaction(|db| {
            let id = db.next_process_id();
            let process = Process::new(id, name, Utc::now());
            db.processes.insert(id, process.clone());
            Ok(process)
        })?;
        tracing::info!("Created process {} ({})", process.id, process.name);
        Ok(process)
    }

    /// Rename a process, bumping its update time.
    pub fn rename_process(&self, id: ProcessId, name: &str) -> Result<Process> {
        self.transaction(|db| {
            let process = db.process_mut(id)?;
            process.name = name.to_string();
            process.touch(Utc::now());
            Ok(process.clone())
        })
    }

    /// Record the remote identity of a process. Does not change `updatedAt`.
    pub fn set_cloud_id(&self, id: ProcessId, cloud_id: &str) -> Result<()> {
        self.transaction(|db| {
            db.process_mut(id)?.cloud_id = Some(cloud_id.to_string());
            Ok(())
        })
    }

    /// Get a process by id.
    pub fn get_process(&self, id: ProcessId) -> Result<Process> {
        self.read()?.process(id).cloned()
    }

    /// All processes, most recently updated first.
    pub fn list_processes(&self) -> Result<Vec<Process>> {
        let mut processes: Vec<Process> = self.read()?.processes.values().cloned().collect();
        processes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(processes)
    }

    /// Delete a process together with all of its steps and artifacts.
    pub fn delete_process(&self, id: ProcessId) -> Result<()> {
        let removed = self.transaction(|db| {
            db.process(id)?;
            let removed = db.remove_artifacts_where(|a| a.process_id == id);
            db.steps.retain(|_, s| s.process_id != id);
            db.processes.remove(&id);
            Ok(removed)
        })?;
        self.discard_blobs(&removed);
        tracing::info!(
            "Deleted process {} and {} artifacts",
            id,
            removed.len()
        );
        Ok(())
    }

    // --- Steps ---

    /// Persisted steps of a process ordered by index, with their artifacts.
    pub fn load_steps_and_artifacts(&self, process_id: ProcessId) -> Result<ProcessContents> {
        let db = self.read()?;
        db.process(process_id)?;

        let steps = db.steps_of(process_id).into_iter().cloned().collect();
        let mut artifacts: BTreeMap<StepId, Vec<Artifact>> = BTreeMap::new();
        for artifact in db.artifacts_of(process_id) {
            artifacts
                .entry(artifact.step_id)
                .or_default()
                .push(artifact.clone());
        }

        Ok(ProcessContents { steps, artifacts })
    }

    /// Persisted steps of a process ordered by index.
    pub fn load_steps(&self, process_id: ProcessId) -> Result<Vec<Step>> {
        Ok(self.load_steps_and_artifacts(process_id)?.steps)
    }

    /// Replace the persisted step list of a process.
    ///
    /// Steps carrying an id are overwritten in place; steps without one are
    /// inserted under a new id; persisted steps missing from `steps` are
    /// deleted along with their artifacts. Each step is stored with its
    /// array position as `index`. Returns the stored steps, ids assigned,
    /// so saving the returned list again changes nothing.
    pub fn save_steps(&self, process_id: ProcessId, steps: &[Step]) -> Result<Vec<Step>> {
        let (saved, removed) = self.transaction(|db| {
            db.process(process_id)?;

            let mut keep = BTreeSet::new();
            let mut saved = Vec::with_capacity(steps.len());
            for (position, step) in steps.iter().enumerate() {
                let mut row = step.clone();
                row.process_id = process_id;
                row.index = position;

                let id = match row.id {
                    Some(id) => {
                        if db
                            .steps
                            .get(&id)
                            .is_some_and(|existing| existing.process_id != process_id)
                        {
                            return Err(ProcGatherError::InvalidInput {
                                message: format!(
                                    "Step {} belongs to another process",
                                    id
                                ),
                            });
                        }
                        db.reserve_step_id(id);
                        id
                    }
                    None => db.next_step_id(),
                };

                if !keep.insert(id) {
                    return Err(ProcGatherError::InvalidInput {
                        message: format!("Step {} appears twice", id),
                    });
                }

                row.id = Some(id);
                db.steps.insert(id, row.clone());
                saved.push(row);
            }

            let stale: Vec<StepId> = db
                .steps
                .values()
                .filter(|s| s.process_id == process_id)
                .filter_map(|s| s.id)
                .filter(|id| !keep.contains(id))
                .collect();
            for id in &stale {
                db.steps.remove(id);
            }
            let removed = db.remove_artifacts_where(|a| stale.contains(&a.step_id));

            db.process_mut(process_id)?.touch(Utc::now());
            Ok((saved, removed))
        })?;

        self.discard_blobs(&removed);
        tracing::debug!("Saved {} steps for process {}", saved.len(), process_id);
        Ok(saved)
    }

    // --- Artifacts ---

    /// Attach a file to a persisted step.
    pub fn add_artifact(
        &self,
        process_id: ProcessId,
        step_id: StepId,
        kind: ArtifactKind,
        meta: FileMeta,
        content: &[u8],
    ) -> Result<Artifact> {
        let written = Cell::new(None);
        let result = self.transaction(|db| {
            db.process(process_id)?;
            if !db
                .steps
                .get(&step_id)
                .is_some_and(|s| s.process_id == process_id)
            {
                return Err(ProcGatherError::InvalidInput {
                    message: format!(
                        "Step {} is not a saved step of process {}",
                        step_id, process_id
                    ),
                });
            }

            let id = db.next_artifact_id();
            let artifact = Artifact {
                id,
                process_id,
                step_id,
                kind,
                name: meta.name,
                mime_type: meta.mime_type,
                size: meta.size,
            };
            self.backend.write_blob(id, content)?;
            written.set(Some(id));
            db.artifacts.insert(id, artifact.clone());
            Ok(artifact)
        });

        if result.is_err() {
            if let Some(id) = written.get() {
                self.discard_blobs(&[id]);
            }
        }
        result
    }

    /// Content of an artifact; `None` for metadata-only records.
    pub fn artifact_content(&self, id: ArtifactId) -> Result<Option<Vec<u8>>> {
        if !self.read()?.artifacts.contains_key(&id) {
            return Err(ProcGatherError::ArtifactNotFound { id: id.get() });
        }
        self.backend.read_blob(id)
    }

    /// Get an artifact record by id.
    pub fn get_artifact(&self, id: ArtifactId) -> Result<Artifact> {
        self.read()?
            .artifacts
            .get(&id)
            .cloned()
            .ok_or(ProcGatherError::ArtifactNotFound { id: id.get() })
    }

    /// Delete one artifact and its content.
    pub fn delete_artifact(&self, id: ArtifactId) -> Result<()> {
        self.transaction(|db| {
            db.artifacts
                .remove(&id)
                .map(|_| ())
                .ok_or(ProcGatherError::ArtifactNotFound { id: id.get() })
        })?;
        self.discard_blobs(&[id]);
        Ok(())
    }

    // --- Whole store ---

    /// Delete every process, step, artifact, and stored file.
    pub fn reset(&self) -> Result<()> {
        let mut tables = self.write()?;
        self.backend.destroy()?;
        *tables = Database::new();
        tracing::info!("Store reset");
        Ok(())
    }

    /// Every step row, across all processes.
    pub fn scan_steps(&self) -> Result<Vec<Step>> {
        Ok(self.read()?.steps.values().cloned().collect())
    }

    /// Every artifact row, across all processes.
    pub fn scan_artifacts(&self) -> Result<Vec<Artifact>> {
        Ok(self.read()?.artifacts.values().cloned().collect())
    }

    /// Number of processes.
    pub fn process_count(&self) -> Result<usize> {
        Ok(self.read()?.processes.len())
    }
}
