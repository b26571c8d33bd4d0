//! Shell configuration.
//!
//! Values are layered, later sources winning: built-in defaults, an optional
//! TOML file, then environment variables prefixed with `PRIMDB__` (a `.env`
//! file in the working directory is loaded first). Command-line flags are
//! applied on top by the caller.
//!
//! ```toml
//! data_path = "data/db.json"
//! autosave = true
//! cache = true
//! confirm_destructive = true
//! timer = false
//! log_level = "info"
//! ```

use config::{Config, Environment, File, FileFormat};
use getset::{Getters, Setters};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use typed_builder::TypedBuilder;

/// Name of the configuration file looked up in the working directory when no
/// explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "primdb.toml";

/// Store used when neither the configuration nor the command line names one.
pub const DEFAULT_DATA_PATH: &str = "db.json";

pub const ENV_PREFIX: &str = "PRIMDB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, Setters, TypedBuilder,
)]
#[getset(get = "pub", set = "pub")]
pub struct ShellConfig {
    /// JSON store holding every table.
    data_path: PathBuf,
    /// Write the store after every mutating command.
    autosave: bool,
    /// Memoize `select` results until the table changes.
    cache: bool,
    /// Ask before `drop_table` and `delete`.
    confirm_destructive: bool,
    /// Report how long each command took.
    timer: bool,
    history_file: PathBuf,
    history_size: usize,
    /// Default `tracing` filter, overridden by `RUST_LOG`.
    log_level: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig::builder()
            .data_path(PathBuf::from(DEFAULT_DATA_PATH))
            .autosave(true)
            .cache(true)
            .confirm_destructive(true)
            .timer(true)
            .history_file(PathBuf::from(".primdb_history"))
            .history_size(100)
            .log_level("warn".to_string())
            .build()
    }
}

impl ShellConfig {
    /// Loads the configuration from `file` (or [`DEFAULT_CONFIG_FILE`]) and the environment.
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let (path, required) = match file {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let defaults = ShellConfig::default();

        let config = Config::builder()
            .set_default("data_path", DEFAULT_DATA_PATH)?
            .set_default("autosave", defaults.autosave)?
            .set_default("cache", defaults.cache)?
            .set_default("confirm_destructive", defaults.confirm_destructive)?
            .set_default("timer", defaults.timer)?
            .set_default("history_file", defaults.history_file.to_string_lossy().into_owned())?
            .set_default("history_size", defaults.history_size as i64)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded = config.try_deserialize::<ShellConfig>()?;
        debug!(?loaded, "configuration loaded");
        Ok(loaded)
    }
}
