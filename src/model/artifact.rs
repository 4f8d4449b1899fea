//! Artifact records (example files attached to a step).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::{ArtifactId, ProcessId, StepId};

/// Fallback content type for files of unknown type.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Role an attached file plays for its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Input,
    Output,
    System,
}

impl ArtifactKind {
    /// Every kind, in display order.
    pub const ALL: [ArtifactKind; 3] = [Self::Input, Self::Output, Self::System];
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::System => "system",
        })
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            "system" => Ok(Self::System),
            _ => Err(format!("unknown artifact type: {}", s)),
        }
    }
}

/// Descriptive metadata of a dropped file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileMeta {
    /// Metadata with an explicit content type. An empty type falls back to
    /// [`DEFAULT_MIME_TYPE`].
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        let mime_type = mime_type.into();
        Self {
            name: name.into(),
            mime_type: if mime_type.trim().is_empty() {
                DEFAULT_MIME_TYPE.to_string()
            } else {
                mime_type
            },
            size,
        }
    }

    /// Metadata with the content type guessed from the file extension.
    pub fn guess(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let mime = guess_mime_type(&name);
        Self::new(name, mime, size)
    }
}

fn guess_mime_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "json" => "application/json",
        "csv" => "text/csv",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "zip" => "application/zip",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// An example file attached to a step.
///
/// The binary content is stored separately from the record and is never
/// part of an export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: ArtifactId,
    pub process_id: ProcessId,
    pub step_id: StepId,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_and_displays() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.to_string().parse::<ArtifactKind>().unwrap(), kind);
        }
        assert!("attachment".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn empty_mime_type_falls_back() {
        let meta = FileMeta::new("blob", "", 3);
        assert_eq!(meta.mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn guess_uses_extension() {
        assert_eq!(FileMeta::guess("report.PDF", 10).mime_type, "application/pdf");
        assert_eq!(FileMeta::guess("rows.csv", 10).mime_type, "text/csv");
        assert_eq!(FileMeta::guess("noext", 10).mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn artifact_serializes_kind_as_type() {
        let artifact = Artifact {
            id: ArtifactId::new(1),
            process_id: ProcessId::new(2),
            step_id: StepId::new(3),
            kind: ArtifactKind::Output,
            name: "out.json".into(),
            mime_type: "application/json".into(),
            size: 12,
        };
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["type"], "output");
        assert_eq!(json["stepId"], 3);
        assert_eq!(json["mimeType"], "application/json");
    }
}
