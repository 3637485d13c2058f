use super::app_config::LogLevel;
use crate::domain::entities::CoverKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gamecover",
    version,
    about = "Resolve, download and cache game cover art",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Cover cache directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// User profile directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub users_dir: Option<PathBuf>,

    /// Artwork host.
    #[arg(long, value_name = "URL", global = true)]
    pub art_base_url: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, value_name = "SECS", global = true)]
    pub request_timeout_secs: Option<u64>,

    /// Let concurrent requests for one cover download separately.
    #[arg(long, global = true)]
    pub no_coalesce: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the descriptor and artwork URL for a game.
    Resolve {
        /// Game identifier.
        game: String,
        /// Region preference (two letters).
        #[arg(long)]
        region: Option<String>,
        /// User whose stored region preference applies.
        #[arg(long)]
        user: Option<String>,
        /// Cover kind (cover, cover3D, disc, box).
        #[arg(long)]
        kind: Option<CoverKind>,
    },
    /// Load a cover, downloading it into the cache if needed.
    Fetch {
        /// Game identifier.
        game: String,
        /// Region preference (two letters).
        #[arg(long)]
        region: Option<String>,
        /// User whose stored region preference applies.
        #[arg(long)]
        user: Option<String>,
        /// Cover kind (cover, cover3D, disc, box).
        #[arg(long)]
        kind: Option<CoverKind>,
        /// Also copy the normalized PNG here.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Manage user profiles.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Download and store a user's avatar.
    Avatar {
        /// User id.
        user: String,
        /// Avatar hash.
        hash: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Create a profile and print the user's access key.
    Create {
        /// User id.
        user: String,
        /// Display name.
        name: String,
    },
    /// Print a profile as JSON.
    Get {
        /// User id.
        user: String,
    },
    /// Set the user's cover region preference.
    SetRegion {
        /// User id.
        user: String,
        /// Two-letter region.
        region: String,
    },
}
