//! Configuration loading, parsing, and validation for procgather.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//! - Layering with environment and flags in [`settings`]
//!
//! # Example
//!
//! ```
//! use procgather::config::{load_config, validate, Overrides, Settings};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "data_dir: /tmp/pg\nsync:\n  api_base: https://api.example.com/").unwrap();
//!
//! let config = load_config(Some(&path)).unwrap();
//! validate(&config).unwrap();
//! let settings = Settings::resolve(&config, &Overrides::default()).unwrap();
//! assert_eq!(settings.api_base.as_deref(), Some("https://api.example.com"));
//! ```
//!
//! # Configuration File Location
//!
//! `--config <path>` if given, otherwise `<config_dir>/procgather/config.yml`
//! when it exists. `PROCGATHER_DATA_DIR` and `PROCGATHER_API_BASE` (or the
//! matching flags) override the file.

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validator;

pub use loader::{load_config, load_config_file, parse_config, ConfigPaths};
pub use schema::{ProcGatherConfig, SyncSettings};
pub use settings::{default_data_dir, Overrides, Settings};
pub use validator::{validate, validate_config, ValidationError};
