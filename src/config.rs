use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::members::DEFAULT_API_BASE;
use crate::roster::DEFAULT_SHEET;

pub const DEFAULT_ENV_FILE: &str = ".env.local";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        path: String,
        source: dotenvy::Error,
    },
}

/// Import the instructor roster and link each instructor to a guild member.
#[derive(Parser, Debug)]
#[command(name = "instructor-import")]
#[command(version)]
pub struct Args {
    /// Roster spreadsheet (xlsx, xls, xlsb or ods)
    pub roster: PathBuf,

    /// Sheet holding the roster
    #[arg(long, default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// SQLite database shared with the bot
    #[arg(long, env = "DB_FILENAME", default_value = "data.db")]
    pub db: PathBuf,

    /// Bot token used for the member list request
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Guild whose members are matched
    #[arg(long, env = "DEBUG_GUILD")]
    pub guild: String,

    #[arg(long, env = "DISCORD_API_BASE", default_value = DEFAULT_API_BASE, hide = true)]
    pub api_base: String,

    /// KEY=value file loaded before reading the environment
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Leave unmatched instructors for a later run instead of prompting
    #[arg(long)]
    pub skip_manual: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::Empty("DISCORD_TOKEN"));
        }
        if self.guild.trim().is_empty() {
            return Err(ConfigError::Empty("DEBUG_GUILD"));
        }
        Ok(())
    }
}

/// Finds `--env-file` on the raw command line so the file can be loaded
/// before clap resolves `env` defaults.
pub fn env_file_from_args<I: IntoIterator<Item = String>>(args: I) -> PathBuf {
    let mut it = args.into_iter();
    while let Some(a) = it.next() {
        if a == "--env-file" {
            if let Some(v) = it.next() {
                return PathBuf::from(v);
            }
        } else if let Some(v) = a.strip_prefix("--env-file=") {
            return PathBuf::from(v);
        }
    }
    PathBuf::from(DEFAULT_ENV_FILE)
}

/// Loads `path` into the process environment. Variables that are already
/// set are left alone. A missing file is not an error.
pub fn load_env_file(path: &Path) -> Result<bool, ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ConfigError::EnvFile {
            path: path.to_string_lossy().to_string(),
            source: e,
        }),
    }
}
