//! Reading and seeding `config.toml`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::AppConfig;

/// File name of the configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no per-user configuration directory.
    #[error("no configuration directory available on this platform")]
    NoConfigDir,

    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration could not be encoded as TOML.
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// How [`ConfigStore::load`] arrived at its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file was read and parsed.
    Parsed,
    /// No file existed; the defaults were written.
    Seeded,
    /// The file did not parse and was ignored. Holds the parse error.
    Malformed(String),
}

/// Result of loading the configuration file.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Effective file configuration.
    pub config: AppConfig,
    /// File that was consulted.
    pub path: PathBuf,
    /// What happened while loading.
    pub outcome: LoadOutcome,
}

impl LoadedConfig {
    /// Logs the outcome. Call once a subscriber is installed.
    pub fn report(&self) {
        let path = self.path.display();
        match &self.outcome {
            LoadOutcome::Parsed => debug!(path = %path, "Configuration loaded"),
            LoadOutcome::Seeded => info!(path = %path, "Wrote default configuration"),
            LoadOutcome::Malformed(error) => {
                warn!(path = %path, error = %error, "Ignoring malformed configuration");
            }
        }
    }
}

/// Location of the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Uses the file at `path`.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `path_override` if given, else `config.toml` in the platform
    /// config directory.
    ///
    /// # Errors
    /// Returns `ConfigError::NoConfigDir` if no override is given and the
    /// platform config directory is unknown.
    pub fn locate(path_override: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path_override {
            return Ok(Self::at(path));
        }
        AppConfig::default_config_dir()
            .map(|dir| Self::at(dir.join(CONFIG_FILE_NAME)))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// A missing file is seeded with the defaults. A file that does not parse
    /// is left untouched and the defaults are used for this run. Which of
    /// these happened is reported in [`LoadedConfig::outcome`], since loading
    /// usually runs before logging is set up.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or seeded.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = AppConfig::default();
                self.save(&config)?;
                return Ok(self.loaded(config, LoadOutcome::Seeded));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(match toml::from_str::<AppConfig>(&content) {
            Ok(config) => self.loaded(config, LoadOutcome::Parsed),
            Err(e) => self.loaded(
                AppConfig::default(),
                LoadOutcome::Malformed(e.to_string()),
            ),
        })
    }

    fn loaded(&self, config: AppConfig, outcome: LoadOutcome) -> LoadedConfig {
        LoadedConfig {
            config,
            path: self.path.clone(),
            outcome,
        }
    }

    /// Writes `config`, replacing the file atomically.
    ///
    /// # Errors
    /// Returns `ConfigError` if encoding or writing fails.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)?;
        let write_error = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_error)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
        temp_file.write_all(content.as_bytes()).map_err(write_error)?;
        temp_file
            .persist(&self.path)
            .map_err(|e| write_error(e.error))?;

        Ok(())
    }
}
