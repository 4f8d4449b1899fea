//! Remote process API.
//!
//! Three calls, JSON over HTTP:
//! - `POST {base}/processes` with `{name}` returns `{processId}`
//! - `PUT {base}/processes/{id}` with `{name?, description?}`
//! - `PUT {base}/processes/{id}/steps` with `{steps: [...]}`

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::model::{NextRef, NextType, Step, StepKey};

/// Metadata fields sent on update. Absent fields are left unchanged remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Route target as the remote service understands it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayloadRef {
    /// Position of the target step in the submitted list.
    Index(usize),
    /// Handoff description.
    Text(String),
}

/// One step as sent to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    pub index: usize,
    pub who: String,
    pub action: String,
    pub tools: Vec<String>,
    pub details: String,
    pub frequency: String,
    pub outcome: String,
    pub duration: String,
    pub is_end: bool,
    pub next_type: NextType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_ref: Option<PayloadRef>,
}

impl StepPayload {
    /// Convert an ordered step list. Step routes are sent as the target's
    /// current index; routes to steps not in the list are dropped.
    pub fn from_steps(steps: &[Step]) -> Vec<StepPayload> {
        let positions: HashMap<StepKey, usize> = steps
            .iter()
            .enumerate()
            .map(|(position, step)| (step.key, position))
            .collect();

        steps
            .iter()
            .map(|step| StepPayload {
                index: step.index,
                who: step.who.clone(),
                action: step.action.clone(),
                tools: step.tools.clone(),
                details: step.details.clone(),
                frequency: step
                    .frequency
                    .map(|f| f.label().to_string())
                    .unwrap_or_default(),
                outcome: step.outcome.clone(),
                duration: step.duration.clone(),
                is_end: step.is_end,
                next_type: step.next_type,
                next_ref: match &step.next_ref {
                    Some(NextRef::Step(key)) => positions.get(key).copied().map(PayloadRef::Index),
                    Some(NextRef::Handoff(text)) => Some(PayloadRef::Text(text.clone())),
                    None => None,
                },
            })
            .collect()
    }
}

/// The remote counterpart of the local store.
pub trait RemoteApi: Send + Sync {
    /// Provision a remote process, returning its id.
    fn create_process(&self, name: &str) -> Result<String>;

    /// Update remote process metadata.
    fn update_process(&self, cloud_id: &str, patch: &ProcessPatch) -> Result<()>;

    /// Overwrite the remote step list.
    fn replace_steps(&self, cloud_id: &str, steps: &[StepPayload]) -> Result<()>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedProcess {
    process_id: Value,
}

#[derive(Serialize)]
struct StepsBody<'a> {
    steps: &'a [StepPayload],
}

#[derive(Serialize)]
struct CreateBody<'a> {
    name: &'a str,
}

/// [`RemoteApi`] over HTTP.
pub struct HttpRemote {
    base: String,
    client: Client,
    timeout: Duration,
}

impl HttpRemote {
    /// Create a client for the API rooted at `base`.
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("procgather/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    /// Get the API base URL.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{base}/<segments>`, with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base)
            .with_context(|| format!("Invalid API base URL: {}", self.base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot have a path: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<reqwest::blocking::Response> {
        let response = request
            .send()
            .with_context(|| format!("Failed to {}", what))?;

        if !response.status().is_success() {
            bail!("HTTP {} trying to {}", response.status(), what);
        }
        Ok(response)
    }
}

impl RemoteApi for HttpRemote {
    fn create_process(&self, name: &str) -> Result<String> {
        let url = self.endpoint(&["processes"])?;
        let response = self.send(
            self.client.post(url).json(&CreateBody { name }),
            "create remote process",
        )?;

        let created: CreatedProcess = response
            .json()
            .context("Failed to read remote process id")?;
        match created.process_id {
            Value::String(id) if !id.is_empty() => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(anyhow!("Unexpected remote process id: {}", other)),
        }
    }

    fn update_process(&self, cloud_id: &str, patch: &ProcessPatch) -> Result<()> {
        let url = self.endpoint(&["processes", cloud_id])?;
        self.send(self.client.put(url).json(patch), "update remote process")?;
        Ok(())
    }

    fn replace_steps(&self, cloud_id: &str, steps: &[StepPayload]) -> Result<()> {
        let url = self.endpoint(&["processes", cloud_id, "steps"])?;
        self.send(
            self.client.put(url).json(&StepsBody { steps }),
            "replace remote steps",
        )?;
        Ok(())
    }
}
