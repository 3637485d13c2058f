//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, LogLevel};
pub use args::{CliArgs, Command, ProfileCommand};
pub use storage::{CONFIG_FILE_NAME, ConfigError, ConfigStore, LoadOutcome, LoadedConfig};
