//! Cloud synchronization.
//!
//! Local data is authoritative. Saves are pushed to the remote service in
//! the background by a [`SyncQueue`]; failures are logged and surfaced as a
//! [`SyncStatus`] but never roll back or block local work.
//!
//! - [`RemoteApi`] / [`HttpRemote`] - the remote endpoints
//! - [`SyncClient`] - reconcile one process (create lazily, then replace steps)
//! - [`SyncQueue`] - fire-and-forget worker with per-process coalescing

mod client;
mod queue;
mod remote;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{SyncClient, SyncOutcome};
pub use queue::{SyncJob, SyncQueue, SyncStatus};
pub use remote::{HttpRemote, PayloadRef, ProcessPatch, RemoteApi, StepPayload};
