//! Configuration validation rules.
//!
//! - `sync.api_base`, when set, must be an http(s) URL
//! - `sync.timeout_secs` must be positive

use crate::config::schema::ProcGatherConfig;
use crate::error::{ProcGatherError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &ProcGatherConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(base) = config.sync.api_base.as_deref().map(str::trim) {
        if !base.is_empty() && !(base.starts_with("http://") || base.starts_with("https://")) {
            errors.push(ValidationError {
                rule: "invalid-api-base".to_string(),
                message: format!("sync.api_base '{}' must start with http:// or https://", base),
            });
        }
    }

    if config.sync.timeout_secs == 0 {
        errors.push(ValidationError {
            rule: "invalid-timeout".to_string(),
            message: "sync.timeout_secs must be greater than zero".to_string(),
        });
    }

    if config
        .data_dir
        .as_ref()
        .is_some_and(|dir| dir.as_os_str().is_empty())
    {
        errors.push(ValidationError {
            rule: "empty-data-dir".to_string(),
            message: "data_dir cannot be empty".to_string(),
        });
    }

    errors
}

/// Validate and return Result.
pub fn validate(config: &ProcGatherConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(ProcGatherError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
