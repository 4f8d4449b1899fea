//! Configuration file discovery and loading.

use crate::config::schema::ProcGatherConfig;
use crate::error::{ProcGatherError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where configuration may come from.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Explicit `--config` path, which must exist
    pub explicit: Option<PathBuf>,

    /// User config: <config_dir>/procgather/config.yml
    pub user: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files, honouring an explicit override.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            user: Self::find_user_config(),
        }
    }

    /// Default location of the user config, whether or not it exists.
    pub fn user_config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("procgather").join("config.yml"))
    }

    fn find_user_config() -> Option<PathBuf> {
        Self::user_config_path().filter(|path| path.exists())
    }

    /// The file that will be loaded, if any.
    pub fn selected(&self) -> Option<&PathBuf> {
        self.explicit.as_ref().or(self.user.as_ref())
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ProcGatherConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProcGatherError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProcGatherError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into ProcGatherConfig.
///
/// An empty file is a valid, empty configuration.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ProcGatherConfig> {
    if content.trim().is_empty() {
        return Ok(ProcGatherConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| ProcGatherError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// An explicit path must exist. Without one, the user config is loaded
/// when present, and defaults are used otherwise.
pub fn load_config(config_override: Option<&Path>) -> Result<ProcGatherConfig> {
    let paths = ConfigPaths::discover(config_override);
    match paths.selected() {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(path)
        }
        None => Ok(ProcGatherConfig::default()),
    }
}
