//! Reconciles one local process with its remote counterpart.

use anyhow::Result;
use std::sync::Arc;

use crate::error::ProcGatherError;
use crate::model::ProcessId;
use crate::store::LocalStore;

use super::remote::{ProcessPatch, RemoteApi, StepPayload};

/// What a sync pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A remote process was provisioned and its id recorded locally.
    Created { cloud_id: String },
    /// An existing remote process was updated.
    Updated,
    /// Nothing was sent: the process is gone, or has no remote identity yet.
    Skipped,
}

/// Pushes local processes to a [`RemoteApi`].
///
/// The remote step list is always replaced wholesale with the locally
/// persisted one, so a later pass repairs anything an earlier failed pass
/// left behind.
#[derive(Clone)]
pub struct SyncClient {
    remote: Arc<dyn RemoteApi>,
}

impl SyncClient {
    pub fn new(remote: Arc<dyn RemoteApi>) -> Self {
        Self { remote }
    }

    /// Push a process and its persisted steps.
    ///
    /// Without a cloud id the remote process is created first and the new id
    /// recorded. Otherwise its metadata is updated. The step list is
    /// replaced either way.
    pub fn sync_process(&self, store: &LocalStore, id: ProcessId) -> Result<SyncOutcome> {
        let process = match store.get_process(id) {
            Ok(process) => process,
            Err(ProcGatherError::ProcessNotFound { .. }) => {
                tracing::debug!("Process {} no longer exists; skipping sync", id);
                return Ok(SyncOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };
        let steps = store.load_steps(id)?;

        let (cloud_id, outcome) = match process.cloud_id {
            Some(cloud_id) => {
                self.remote.update_process(
                    &cloud_id,
                    &ProcessPatch {
                        name: Some(process.name.clone()),
                        description: Some(process.description.clone()),
                    },
                )?;
                (cloud_id, SyncOutcome::Updated)
            }
            None => {
                let cloud_id = self.remote.create_process(&process.name)?;
                store.set_cloud_id(id, &cloud_id)?;
                tracing::info!("Process {} linked to remote {}", id, cloud_id);
                (
                    cloud_id.clone(),
                    SyncOutcome::Created { cloud_id },
                )
            }
        };

        self.remote
            .replace_steps(&cloud_id, &StepPayload::from_steps(&steps))?;
        tracing::debug!("Synced {} steps of process {}", steps.len(), id);
        Ok(outcome)
    }

    /// Push only the process name and description. Processes without a
    /// remote identity are skipped; their next save will create them.
    pub fn push_metadata(&self, store: &LocalStore, id: ProcessId) -> Result<SyncOutcome> {
        let process = match store.get_process(id) {
            Ok(process) => process,
            Err(ProcGatherError::ProcessNotFound { .. }) => return Ok(SyncOutcome::Skipped),
            Err(e) => return Err(e.into()),
        };
        let Some(cloud_id) = process.cloud_id else {
            return Ok(SyncOutcome::Skipped);
        };

        self.remote.update_process(
            &cloud_id,
            &ProcessPatch {
                name: Some(process.name),
                description: Some(process.description),
            },
        )?;
        Ok(SyncOutcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;
    use crate::sync::fake::{Call, RecordingRemote};

    fn store_with_steps(n: usize) -> (LocalStore, ProcessId) {
        let store = LocalStore::in_memory();
        let p = store.create_process("Invoices").unwrap();
        let steps: Vec<Step> = (0..n).map(|i| Step::new(p.id, i)).collect();
        store.save_steps(p.id, &steps).unwrap();
        (store, p.id)
    }

    #[test]
    fn first_sync_creates_then_replaces() {
        let (store, id) = store_with_steps(2);
        let remote = Arc::new(RecordingRemote::new());
        let client = SyncClient::new(remote.clone());

        let outcome = client.sync_process(&store, id).unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Created {
                cloud_id: "cloud-1".into()
            }
        );
        assert_eq!(
            store.get_process(id).unwrap().cloud_id.as_deref(),
            Some("cloud-1")
        );
        assert_eq!(
            remote.calls(),
            vec![
                Call::Create("Invoices".into()),
                Call::Replace("cloud-1".into(), 2)
            ]
        );
    }

    #[test]
    fn later_syncs_update_instead_of_create() {
        let (store, id) = store_with_steps(1);
        let remote = Arc::new(RecordingRemote::new());
        let client = SyncClient::new(remote.clone());

        client.sync_process(&store, id).unwrap();
        store.rename_process(id, "Invoices v2").unwrap();
        assert_eq!(client.sync_process(&store, id).unwrap(), SyncOutcome::Updated);

        let calls = remote.calls();
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::Create(_))).count(), 1);
        assert_eq!(
            &calls[2..],
            &[
                Call::Update("cloud-1".into(), Some("Invoices v2".into())),
                Call::Replace("cloud-1".into(), 1)
            ]
        );
    }

    #[test]
    fn failed_create_leaves_no_cloud_id() {
        let (store, id) = store_with_steps(1);
        let remote = Arc::new(RecordingRemote::failing());
        let client = SyncClient::new(remote);

        assert!(client.sync_process(&store, id).is_err());
        assert!(store.get_process(id).unwrap().cloud_id.is_none());
    }

    #[test]
    fn deleted_process_is_skipped() {
        let (store, id) = store_with_steps(0);
        store.delete_process(id).unwrap();
        let remote = Arc::new(RecordingRemote::new());
        let client = SyncClient::new(remote.clone());

        assert_eq!(client.sync_process(&store, id).unwrap(), SyncOutcome::Skipped);
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn metadata_push_needs_cloud_id() {
        let (store, id) = store_with_steps(0);
        let remote = Arc::new(RecordingRemote::new());
        let client = SyncClient::new(remote.clone());

        assert_eq!(client.push_metadata(&store, id).unwrap(), SyncOutcome::Skipped);
        assert!(remote.calls().is_empty());

        store.set_cloud_id(id, "abc").unwrap();
        assert_eq!(client.push_metadata(&store, id).unwrap(), SyncOutcome::Updated);
        assert_eq!(
            remote.calls(),
            vec![Call::Update("abc".into(), Some("Invoices".into()))]
        );
    }
}
