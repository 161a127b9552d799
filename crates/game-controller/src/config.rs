//! Configuration file loading.
//!
//! Settings live in a TOML file with an `[engine]` and a `[game]` table.
//! Every key is optional; a missing file means all defaults.

use chess_core::Side;
use engine_session::{EngineConfig, SearchLimit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Which side, if any, the engine plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputerSide {
    White,
    #[default]
    Black,
    None,
}

impl ComputerSide {
    pub fn side(self) -> Option<Side> {
        match self {
            ComputerSide::White => Some(Side::White),
            ComputerSide::Black => Some(Side::Black),
            ComputerSide::None => None,
        }
    }
}

/// The `[engine]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub command: String,
    pub args: Vec<String>,
    /// Search depth. Ignored when `movetime_ms` is set.
    pub depth: u32,
    pub movetime_ms: Option<u64>,
    pub handshake_timeout_ms: u64,
    pub move_timeout_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        let depth = match defaults.limit {
            SearchLimit::Depth(depth) => depth,
            SearchLimit::MoveTime(_) => 8,
        };
        Self {
            command: defaults.command,
            args: defaults.args,
            depth,
            movetime_ms: None,
            handshake_timeout_ms: defaults.handshake_timeout.as_millis() as u64,
            move_timeout_ms: defaults.move_timeout.as_millis() as u64,
        }
    }
}

impl EngineSection {
    pub fn to_engine_config(&self) -> EngineConfig {
        let limit = match self.movetime_ms {
            Some(ms) => SearchLimit::MoveTime(Duration::from_millis(ms)),
            None => SearchLimit::Depth(self.depth),
        };
        EngineConfig {
            command: self.command.clone(),
            args: self.args.clone(),
            limit,
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            move_timeout: Duration::from_millis(self.move_timeout_ms),
        }
    }
}

/// The `[game]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSection {
    pub computer_side: ComputerSide,
    pub white_name: String,
    pub black_name: String,
    pub event: String,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            computer_side: ComputerSide::default(),
            white_name: "-".to_string(),
            black_name: "-".to_string(),
            event: "-".to_string(),
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSection,
    pub game: GameSection,
}

impl Config {
    /// Default file name looked up in the working directory.
    pub const FILE_NAME: &'static str = "chess-play.toml";

    /// Loads `path` if given, else `chess-play.toml` when it exists, else
    /// defaults. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(Self::FILE_NAME);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}
