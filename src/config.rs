//! Server settings: built-in defaults, then environment, then flags.

use crate::core::constants::{AUTOSAVE_INTERVAL_TICKS, DEFAULT_PORT, TICK_INTERVAL_MS};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "MOONDUST_DATA_DIR";

pub const USAGE: &str = "\
Moondust - multiplayer idle space game server

Usage: moondust [options]

Options:
  --port=N             Listen port (default 3000, env PORT)
  --data-dir=PATH      Player save directory (env MOONDUST_DATA_DIR)
  --tick-ms=N          Milliseconds between ticks (default 1000)
  --autosave-ticks=N   Ticks between autosaves (default 15)
  --version, -v        Show version information
  --help, -h           Show this help message";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: String, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("could not determine a data directory; set MOONDUST_DATA_DIR or --data-dir")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub tick_interval_ms: u64,
    pub autosave_ticks: u64,
    pub data_dir: PathBuf,
}

impl ServerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Serve(ServerConfig),
    Help,
    Version,
}

/// Platform data directory, e.g. `~/.local/share/moondust` on Linux.
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "moondust").map(|dirs| dirs.data_dir().to_path_buf())
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parses command-line arguments (without the program name). `env` looks up
/// environment variables so tests can supply their own.
pub fn parse_args<I, F>(args: I, env: F) -> Result<CliCommand, ConfigError>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut port: u16 = DEFAULT_PORT;
    let mut tick_interval_ms = TICK_INTERVAL_MS;
    let mut autosave_ticks = AUTOSAVE_INTERVAL_TICKS;
    let mut data_dir = env(DATA_DIR_ENV).filter(|d| !d.is_empty()).map(PathBuf::from);

    if let Some(value) = env(PORT_ENV).filter(|p| !p.is_empty()) {
        port = parse_number(PORT_ENV, &value)?;
    }

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--version" | "-v" => return Ok(CliCommand::Version),
            _ => {}
        }

        let (flag, value) = match arg.split_once('=') {
            Some((flag, value)) => (flag, value),
            None => return Err(ConfigError::UnknownOption(arg.clone())),
        };
        match flag {
            "--port" => port = parse_number(flag, value)?,
            "--tick-ms" => tick_interval_ms = parse_number(flag, value)?,
            "--autosave-ticks" => autosave_ticks = parse_number(flag, value)?,
            "--data-dir" => data_dir = Some(PathBuf::from(value)),
            _ => return Err(ConfigError::UnknownOption(arg.clone())),
        }
    }

    if tick_interval_ms == 0 {
        return Err(ConfigError::Zero("--tick-ms"));
    }
    if autosave_ticks == 0 {
        return Err(ConfigError::Zero("--autosave-ticks"));
    }

    let data_dir = match data_dir {
        Some(dir) => dir,
        None => default_data_dir().ok_or(ConfigError::NoDataDir)?,
    };

    Ok(CliCommand::Serve(ServerConfig {
        port,
        tick_interval_ms,
        autosave_ticks,
        data_dir,
    }))
}
