//! The editing session over one active process.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{ProcGatherError, Result};
use crate::history::History;
use crate::model::{
    reindex, Artifact, ArtifactId, ArtifactKind, FileMeta, NextType, Process, ProcessId, Step,
    StepId, StepKey,
};
use crate::store::LocalStore;
use crate::sync::{SyncJob, SyncQueue, SyncStatus};
use crate::transfer::{self, ExportDocument};

use super::patch::{Route, StepPatch};

/// Direction of a one-position move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Load a process, mutate its steps in memory, commit on [`save`](Self::save).
///
/// Every structural change to the step list is recorded in a bounded undo
/// history first. Artifact operations write through to the store
/// immediately and are not undoable. Saves are mirrored to the remote
/// service in the background when a [`SyncQueue`] is attached.
pub struct Editor {
    store: Arc<LocalStore>,
    sync: Option<SyncQueue>,
    process: Option<Process>,
    steps: Vec<Step>,
    artifacts: BTreeMap<StepId, Vec<Artifact>>,
    history: History<Vec<Step>>,
    dirty: bool,
}

impl Editor {
    /// Create an offline editor with no process open.
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            store,
            sync: None,
            process: None,
            steps: Vec::new(),
            artifacts: BTreeMap::new(),
            history: History::new(),
            dirty: false,
        }
    }

    /// Mirror saves through `queue`.
    pub fn with_sync(mut self, queue: SyncQueue) -> Self {
        self.sync = Some(queue);
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync.is_some()
    }

    /// Sync status of the open process; `None` when offline or nothing is open.
    pub fn sync_status(&self) -> Option<SyncStatus> {
        let queue = self.sync.as_ref()?;
        Some(queue.status(self.process.as_ref()?.id))
    }

    /// Block until background sync has caught up. Returns at once when offline.
    pub fn wait_for_sync(&self) {
        if let Some(queue) = &self.sync {
            queue.wait_idle();
        }
    }

    // --- Session state ---

    pub fn process(&self) -> Option<&Process> {
        self.process.as_ref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at `index`.
    pub fn step(&self, index: usize) -> Result<&Step> {
        self.steps.get(index).ok_or(ProcGatherError::StepIndexOutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    /// Artifacts attached to the step at `index`. Unsaved steps have none.
    pub fn artifacts_of(&self, index: usize) -> Result<&[Artifact]> {
        let step = self.step(index)?;
        Ok(step
            .id
            .and_then(|id| self.artifacts.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    pub fn step_has_artifacts(&self, index: usize) -> Result<bool> {
        Ok(!self.artifacts_of(index)?.is_empty())
    }

    /// Position of the end step, if one is marked.
    pub fn end_step_index(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.is_end)
    }

    /// Whether in-memory steps differ from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn active_id(&self) -> Result<ProcessId> {
        self.process
            .as_ref()
            .map(|p| p.id)
            .ok_or(ProcGatherError::NoActiveProcess)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        self.step(index).map(|_| ())
    }

    // --- Processes ---

    /// All processes, most recently updated first.
    pub fn list_processes(&self) -> Result<Vec<Process>> {
        self.store.list_processes()
    }

    /// Open the most recently updated process, if any.
    pub fn open_latest(&mut self) -> Result<Option<ProcessId>> {
        match self.store.list_processes()?.first() {
            Some(process) => {
                let id = process.id;
                self.open_process(id)?;
                Ok(Some(id))
            }
            None => {
                self.close();
                Ok(None)
            }
        }
    }

    /// Create `Untitled Process N` and open it.
    pub fn create_process(&mut self) -> Result<Process> {
        let name = format!("Untitled Process {}", self.store.process_count()? + 1);
        let process = self.store.create_process(&name)?;
        self.open_process(process.id)?;
        Ok(process)
    }

    /// Make `id` the active process. Unsaved edits to the previous one are
    /// discarded and the undo history is cleared.
    pub fn open_process(&mut self, id: ProcessId) -> Result<()> {
        let process = self.store.get_process(id)?;
        let contents = self.store.load_steps_and_artifacts(id)?;

        if self.dirty {
            if let Some(previous) = &self.process {
                tracing::debug!("Discarding unsaved edits to process {}", previous.id);
            }
        }

        self.process = Some(process);
        self.steps = contents.steps;
        self.artifacts = contents.artifacts;
        self.history.clear();
        self.dirty = false;
        Ok(())
    }

    /// Forget the active process.
    pub fn close(&mut self) {
        self.process = None;
        self.steps.clear();
        self.artifacts.clear();
        self.history.clear();
        self.dirty = false;
    }

    /// Rename any process. Processes already known remotely get a metadata
    /// update queued.
    pub fn rename_process(&mut self, id: ProcessId, name: &str) -> Result<Process> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProcGatherError::InvalidInput {
                message: "Process name cannot be empty".to_string(),
            });
        }

        let renamed = self.store.rename_process(id, name)?;
        if let Some(active) = self.process.as_mut().filter(|p| p.id == id) {
            *active = renamed.clone();
        }
        if let (Some(queue), Some(_)) = (&self.sync, &renamed.cloud_id) {
            queue.enqueue(SyncJob::Metadata(id));
        }
        Ok(renamed)
    }

    /// Delete a process with its steps and artifacts. Deleting the active
    /// process opens the most recently updated remaining one.
    pub fn delete_process(&mut self, id: ProcessId) -> Result<()> {
        self.store.delete_process(id)?;
        if self.process.as_ref().is_some_and(|p| p.id == id) {
            self.open_latest()?;
        }
        Ok(())
    }

    /// Delete every process and stored file.
    pub fn reset_all(&mut self) -> Result<()> {
        self.store.reset()?;
        self.close();
        Ok(())
    }

    // --- Steps ---

    /// Append a blank step and return its index. The first step of a
    /// process starts out as its end.
    pub fn add_step(&mut self) -> Result<usize> {
        self.add_step_with(StepPatch::new())
    }

    /// Append a step with `patch` applied, as a single undoable edit.
    pub fn add_step_with(&mut self, patch: StepPatch) -> Result<usize> {
        let id = self.active_id()?;
        if let Some(Route::Step(target)) = &patch.route {
            if !self.steps.iter().any(|s| s.key == *target) {
                return Err(ProcGatherError::InvalidInput {
                    message: "New step routes to a step that does not exist".to_string(),
                });
            }
        }

        let index = self.steps.len();
        let mut step = Step::new(id, index);
        step.is_end = index == 0;
        patch.apply_to(&mut step);

        let mut updated = self.steps.clone();
        updated.push(step);
        keep_single_end(&mut updated, index);

        self.history.record(&self.steps);
        self.steps = updated;
        self.dirty = true;
        Ok(index)
    }

    /// Apply `patch` to the step at `index`.
    ///
    /// Marking a step as end clears the end flag of every other step.
    /// Returns `false`, recording nothing, when the patch changes nothing.
    pub fn update_step(&mut self, index: usize, patch: StepPatch) -> Result<bool> {
        self.check_index(index)?;
        if let Some(Route::Step(target)) = &patch.route {
            self.validate_target(index, *target)?;
        }

        let mut updated = self.steps.clone();
        patch.apply_to(&mut updated[index]);
        keep_single_end(&mut updated, index);

        if updated == self.steps {
            return Ok(false);
        }
        self.history.record(&self.steps);
        self.steps = updated;
        self.dirty = true;
        Ok(true)
    }

    fn validate_target(&self, index: usize, target: StepKey) -> Result<()> {
        if self.steps[index].key == target {
            return Err(ProcGatherError::InvalidInput {
                message: format!("Step {} cannot route to itself", index + 1),
            });
        }
        if !self.steps.iter().any(|s| s.key == target) {
            return Err(ProcGatherError::InvalidInput {
                message: format!("Step {} routes to a step that does not exist", index + 1),
            });
        }
        Ok(())
    }

    /// Mark the step at `index` as the end of the process.
    pub fn mark_end(&mut self, index: usize) -> Result<bool> {
        self.update_step(index, StepPatch::end())
    }

    /// Route the step at `from` to the step at `to`.
    pub fn route_to_step(&mut self, from: usize, to: usize) -> Result<bool> {
        let target = self.step(to)?.key;
        self.update_step(from, StepPatch::next_step(target))
    }

    /// Swap the step at `index` with its neighbour. Moving past either end
    /// is a no-op and returns `false`.
    pub fn move_step(&mut self, index: usize, direction: Direction) -> Result<bool> {
        self.check_index(index)?;
        let other = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&j| j < self.steps.len()),
        };
        let Some(other) = other else {
            return Ok(false);
        };

        self.history.record(&self.steps);
        self.steps.swap(index, other);
        reindex(&mut self.steps);
        self.dirty = true;
        Ok(true)
    }

    /// Remove the step at `index`.
    ///
    /// Routes that pointed at the removed step fall back to `end`. The end
    /// flag of the remaining steps is left as it was. Artifacts of a saved
    /// step are deleted by the next save.
    pub fn remove_step(&mut self, index: usize) -> Result<Step> {
        self.check_index(index)?;
        self.history.record(&self.steps);

        let removed = self.steps.remove(index);
        reindex(&mut self.steps);
        for step in &mut self.steps {
            if step.routes_to(removed.key) {
                step.next_type = NextType::End;
                step.next_ref = None;
            }
        }
        self.dirty = true;
        Ok(removed)
    }

    /// Restore the step list from before the last mutation.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.steps) {
            Some(previous) => {
                self.steps = previous;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone mutation.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.steps) {
            Some(next) => {
                self.steps = next;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Commit the in-memory steps, then queue a background sync.
    pub fn save(&mut self) -> Result<()> {
        let id = self.active_id()?;
        let saved = self.store.save_steps(id, &self.steps)?;

        // Snapshots taken before the save must refer to the same rows.
        let assigned: HashMap<StepKey, StepId> = saved
            .iter()
            .filter_map(|s| s.id.map(|sid| (s.key, sid)))
            .collect();
        self.history.for_each_mut(|snapshot| {
            for step in snapshot.iter_mut().filter(|s| s.id.is_none()) {
                step.id = assigned.get(&step.key).copied();
            }
        });

        self.steps = saved;
        self.artifacts = self.store.load_steps_and_artifacts(id)?.artifacts;
        self.process = Some(self.store.get_process(id)?);
        self.dirty = false;

        if let Some(queue) = &self.sync {
            queue.enqueue(SyncJob::Save(id));
        }
        Ok(())
    }

    // --- Artifacts ---

    /// Attach a file to the step at `index`. A step that was never saved
    /// forces a save first so it has a durable id.
    pub fn add_artifact(
        &mut self,
        index: usize,
        kind: ArtifactKind,
        meta: FileMeta,
        content: &[u8],
    ) -> Result<Artifact> {
        let process_id = self.active_id()?;
        if self.step(index)?.is_new() {
            tracing::debug!("Saving before attaching to unsaved step {}", index);
            self.save()?;
        }
        let step_id = self
            .step(index)?
            .id
            .ok_or_else(|| ProcGatherError::storage("Saved step has no id"))?;

        let artifact = self
            .store
            .add_artifact(process_id, step_id, kind, meta, content)?;
        self.artifacts
            .entry(step_id)
            .or_default()
            .push(artifact.clone());
        Ok(artifact)
    }

    /// Delete one artifact.
    pub fn remove_artifact(&mut self, id: ArtifactId) -> Result<()> {
        self.store.delete_artifact(id)?;
        for attached in self.artifacts.values_mut() {
            attached.retain(|a| a.id != id);
        }
        self.artifacts.retain(|_, attached| !attached.is_empty());
        Ok(())
    }

    // --- Transfer ---

    /// Export the persisted state of the active process.
    pub fn export(&self) -> Result<ExportDocument> {
        transfer::export_process(&self.store, self.active_id()?)
    }

    /// Import a document as a new process. The active process is unchanged.
    pub fn import_json(&mut self, json: &str) -> Result<Process> {
        transfer::import_json(&self.store, json)
    }
}

/// If the step at `index` is the end, no other step is.
fn keep_single_end(steps: &mut [Step], index: usize) {
    if steps[index].is_end {
        for (i, step) in steps.iter_mut().enumerate() {
            if i != index {
                step.is_end = false;
            }
        }
    }
}
