//! Effective settings after layering file config, environment, and flags.

use crate::config::schema::ProcGatherConfig;
use crate::error::{ProcGatherError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Values supplied on the command line or through the environment.
/// These win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub api_base: Option<String>,
}

/// Settings the application runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Store directory
    pub data_dir: PathBuf,

    /// Remote API base without trailing `/`; `None` keeps everything local
    pub api_base: Option<String>,

    /// HTTP timeout for remote calls
    pub timeout: Duration,
}

impl Settings {
    /// Layer `overrides` over `config` and fill in defaults.
    pub fn resolve(config: &ProcGatherConfig, overrides: &Overrides) -> Result<Self> {
        let data_dir = match overrides.data_dir.clone().or_else(|| config.data_dir.clone()) {
            Some(dir) => dir,
            None => default_data_dir().ok_or_else(|| ProcGatherError::ConfigValidationError {
                message: "Cannot determine a data directory; set data_dir or PROCGATHER_DATA_DIR"
                    .to_string(),
            })?,
        };

        let api_base = overrides
            .api_base
            .as_deref()
            .or(config.sync.api_base.as_deref())
            .and_then(normalize_api_base);

        Ok(Self {
            data_dir,
            api_base,
            timeout: Duration::from_secs(config.sync.timeout_secs),
        })
    }

    /// Whether saves are mirrored to a remote service.
    pub fn sync_enabled(&self) -> bool {
        self.api_base.is_some()
    }
}

/// `<data_local_dir>/procgather`
pub fn default_data_dir() -> Option<PathBuf> {
    Some(dirs::data_local_dir()?.join("procgather"))
}

fn normalize_api_base(raw: &str) -> Option<String> {
    let base = raw.trim().trim_end_matches('/');
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}
