//! Process records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProcessId;

/// A documented business process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Local identity.
    pub id: ProcessId,

    /// Display name.
    pub name: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// When the process was created.
    pub created_at: DateTime<Utc>,

    /// When the process was last renamed or saved.
    pub updated_at: DateTime<Utc>,

    /// Identity assigned by the remote service, once provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,
}

impl Process {
    /// Create an empty process shell.
    pub fn new(id: ProcessId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            cloud_id: None,
        }
    }

    /// Record a structural change.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
