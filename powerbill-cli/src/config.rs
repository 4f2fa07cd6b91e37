//! Layered configuration for the `powerbill` command.
//!
//! Values are resolved in order of precedence: command-line flags, then the
//! optional TOML file, then built-in defaults.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "usage.db"
//!
//! [logging]
//! level = "debug"
//! file = "powerbill.log"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use powerbill_core::db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BACKEND: &str = "sqlite";
pub const DEFAULT_DATABASE: &str = "usage.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl ConfigFile {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub db: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DbConfig,

    /// Explicit log filter. `None` keeps `RUST_LOG` or the built-in default.
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn resolve(
        file: ConfigFile,
        overrides: Overrides,
    ) -> Self {
        let backend = overrides
            .backend
            .or(file.database.backend)
            .unwrap_or_else(|| DEFAULT_BACKEND.to_string());
        let connection_string = overrides
            .db
            .or(file.database.connection_string)
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Self {
            database: DbConfig {
                backend,
                connection_string,
            },
            log_level: overrides.log_level.or(file.logging.level),
            log_file: overrides.log_file.or(file.logging.file),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::resolve(ConfigFile::default(), Overrides::default())
    }
}
