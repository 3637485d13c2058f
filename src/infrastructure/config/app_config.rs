//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use crate::infrastructure::image::{
    CoverCacheConfig, DEFAULT_ART_BASE_URL, DEFAULT_AVATAR_BASE_URL, DEFAULT_TIMEOUT_SECS,
};

const APP_QUALIFIER: &str = "org";
const APP_ORGANIZATION: &str = "gamecover";
const APP_NAME: &str = "gamecover";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by
/// command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory holding cached covers.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding user profiles.
    #[serde(default)]
    pub users_dir: Option<PathBuf>,

    /// Artwork host.
    #[serde(default = "default_art_base_url")]
    pub art_base_url: String,

    /// Avatar host.
    #[serde(default = "default_avatar_base_url")]
    pub avatar_base_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Share one download between concurrent requests for the same cover.
    #[serde(default = "default_true")]
    pub coalesce_in_flight: bool,
}

fn default_art_base_url() -> String {
    DEFAULT_ART_BASE_URL.to_string()
}

fn default_avatar_base_url() -> String {
    DEFAULT_AVATAR_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache_dir = Some(cache_dir.clone());
        }
        if let Some(users_dir) = &args.users_dir {
            self.users_dir = Some(users_dir.clone());
        }
        if let Some(art_base_url) = &args.art_base_url {
            self.art_base_url.clone_from(art_base_url);
        }
        if let Some(timeout) = args.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if args.no_coalesce {
            self.coalesce_in_flight = false;
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("gamecover.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }

    /// Returns the cover cache directory, falling back to a temp directory
    /// when the platform cache directory is unknown.
    #[must_use]
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            Self::project_dirs().map_or_else(
                || std::env::temp_dir().join(APP_NAME).join("covers"),
                |dirs| dirs.cache_dir().join("covers"),
            )
        })
    }

    /// Returns the avatar cache directory.
    #[must_use]
    pub fn effective_avatar_dir(&self) -> PathBuf {
        self.effective_cache_dir()
            .parent()
            .map_or_else(|| PathBuf::from("avatars"), |dir| dir.join("avatars"))
    }

    /// Returns the profile directory.
    #[must_use]
    pub fn effective_users_dir(&self) -> PathBuf {
        self.users_dir.clone().unwrap_or_else(|| {
            Self::project_dirs().map_or_else(
                || std::env::temp_dir().join(APP_NAME).join("users"),
                |dirs| dirs.data_dir().join("users"),
            )
        })
    }

    /// Returns the HTTP request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the cover cache configuration.
    #[must_use]
    pub fn cover_cache_config(&self) -> CoverCacheConfig {
        CoverCacheConfig::new(self.effective_cache_dir())
            .with_art_base_url(self.art_base_url.clone())
            .with_coalescing(self.coalesce_in_flight)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            cache_dir: None,
            users_dir: None,
            art_base_url: default_art_base_url(),
            avatar_base_url: default_avatar_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            coalesce_in_flight: true,
        }
    }
}
