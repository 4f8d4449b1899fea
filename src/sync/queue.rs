//! Background sync worker.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::model::ProcessId;
use crate::store::LocalStore;

use super::client::SyncClient;

/// Sync state of one process as seen by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Nothing pending, and the last attempt (if any) succeeded.
    #[default]
    Idle,
    /// A sync is queued or running.
    Syncing,
    /// The last attempt failed; local data is intact.
    Error(String),
}

impl SyncStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Work item for the sync worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncJob {
    /// Push metadata and the full step list.
    Save(ProcessId),
    /// Push metadata only.
    Metadata(ProcessId),
}

impl SyncJob {
    pub fn process_id(&self) -> ProcessId {
        match self {
            Self::Save(id) | Self::Metadata(id) => *id,
        }
    }
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<SyncJob>,
    in_flight: Option<ProcessId>,
    statuses: HashMap<ProcessId, SyncStatus>,
    shutdown: bool,
}

impl QueueState {
    /// Add a job unless an equal or stronger one is already waiting.
    fn push(&mut self, job: SyncJob) -> bool {
        let id = job.process_id();
        match job {
            SyncJob::Save(_) => {
                if self.pending.contains(&job) {
                    return false;
                }
                self.pending.retain(|j| *j != SyncJob::Metadata(id));
            }
            SyncJob::Metadata(_) => {
                if self.pending.iter().any(|j| j.process_id() == id) {
                    return false;
                }
            }
        }
        self.pending.push_back(job);
        true
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }
}

struct Shared {
    state: Mutex<QueueState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs sync jobs one at a time on a dedicated thread.
///
/// Enqueueing never blocks on the network. Jobs for a process that is
/// already waiting are coalesced, and because a single worker runs them
/// in order, a second save can only start after the first has recorded
/// the remote id; a process is never created remotely twice.
///
/// Dropping the queue lets the worker finish what is pending, then joins it.
pub struct SyncQueue {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SyncQueue {
    /// Start the worker.
    pub fn start(store: Arc<LocalStore>, client: SyncClient) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            changed: Condvar::new(),
        });

        let worker = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || run(&shared, &store, &client))
        };

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Queue a job.
    pub fn enqueue(&self, job: SyncJob) {
        let mut state = self.shared.lock();
        if state.push(job) {
            tracing::debug!("Queued sync job {:?}", job);
            self.shared.changed.notify_all();
        }
    }

    /// Current status of a process.
    pub fn status(&self, id: ProcessId) -> SyncStatus {
        let state = self.shared.lock();
        if state.in_flight == Some(id) || state.pending.iter().any(|j| j.process_id() == id) {
            return SyncStatus::Syncing;
        }
        state.statuses.get(&id).cloned().unwrap_or_default()
    }

    /// Whether no job is queued or running.
    pub fn is_idle(&self) -> bool {
        self.shared.lock().is_idle()
    }

    /// Block until every queued job has run.
    pub fn wait_idle(&self) {
        let mut state = self.shared.lock();
        while !state.is_idle() {
            state = self
                .shared
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for SyncQueue {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.changed.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Sync worker panicked");
            }
        }
    }
}

fn run(shared: &Shared, store: &LocalStore, client: &SyncClient) {
    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if let Some(job) = state.pending.pop_front() {
                    state.in_flight = Some(job.process_id());
                    break job;
                }
                if state.shutdown {
                    return;
                }
                state = shared
                    .changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let id = job.process_id();
        let result = match job {
            SyncJob::Save(_) => client.sync_process(store, id),
            SyncJob::Metadata(_) => client.push_metadata(store, id),
        };
        let status = match result {
            Ok(outcome) => {
                tracing::debug!("Sync of process {} finished: {:?}", id, outcome);
                SyncStatus::Idle
            }
            Err(e) => {
                tracing::warn!("Cloud sync failed for process {}; working offline: {:#}", id, e);
                SyncStatus::Error(format!("{:#}", e))
            }
        };

        let mut state = shared.lock();
        state.in_flight = None;
        state.statuses.insert(id, status);
        shared.changed.notify_all();
    }
}
