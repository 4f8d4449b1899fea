//! Error types for procgather operations.
//!
//! This module defines [`ProcGatherError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Local storage failures abort the attempted operation and leave the
//!   previously committed state untouched
//! - Remote sync failures never surface here; the sync layer logs them and
//!   keeps working offline
//! - Invalid input is rejected before anything is written
//! - Use `anyhow::Error` (via `ProcGatherError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for procgather operations.
#[derive(Debug, Error)]
pub enum ProcGatherError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// No process with the given id exists.
    #[error("Process {id} not found")]
    ProcessNotFound { id: u64 },

    /// No artifact with the given id exists.
    #[error("Artifact {id} not found")]
    ArtifactNotFound { id: u64 },

    /// A step position outside the current step list.
    #[error("Step {index} does not exist (process has {len} steps)")]
    StepIndexOutOfRange { index: usize, len: usize },

    /// An editing command was issued with no process open.
    #[error("No process is open")]
    NoActiveProcess,

    /// User-supplied value that cannot be accepted.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// An import document failed validation.
    #[error("Invalid import document: {message}")]
    InvalidDocument { message: String },

    /// The record database could not be read, migrated, or committed.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// The record database was written by a newer version.
    #[error("Store schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// The user declined a destructive operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProcGatherError {
    /// Build a storage error from anything displayable.
    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: message.to_string(),
        }
    }

    /// Build an invalid-document error from anything displayable.
    pub fn invalid_document(message: impl std::fmt::Display) -> Self {
        Self::InvalidDocument {
            message: message.to_string(),
        }
    }
}

/// Result type alias for procgather operations.
pub type Result<T> = std::result::Result<T, ProcGatherError>;
