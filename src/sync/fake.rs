//! In-memory [`RemoteApi`] that records every call.

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::remote::{ProcessPatch, RemoteApi, StepPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Update(String, Option<String>),
    /// Cloud id and number of steps sent.
    Replace(String, usize),
}

#[derive(Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    fail: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote that rejects every call until [`set_failing`](Self::set_failing)
    /// turns it back on.
    pub fn failing() -> Self {
        let remote = Self::default();
        remote.set_failing(true);
        remote
    }

    /// A remote that sleeps before answering each call.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail.load(Ordering::SeqCst) {
            bail!("remote unreachable");
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl RemoteApi for RecordingRemote {
    fn create_process(&self, name: &str) -> Result<String> {
        self.record(Call::Create(name.to_string()))?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("cloud-{}", n))
    }

    fn update_process(&self, cloud_id: &str, patch: &ProcessPatch) -> Result<()> {
        self.record(Call::Update(cloud_id.to_string(), patch.name.clone()))
    }

    fn replace_steps(&self, cloud_id: &str, steps: &[StepPayload]) -> Result<()> {
        self.record(Call::Replace(cloud_id.to_string(), steps.len()))
    }
}
