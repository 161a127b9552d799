//! Engine launch and search settings.

use std::time::Duration;
use uci::GoOptions;

/// How long the engine may think about one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    Depth(u32),
    MoveTime(Duration),
}

impl SearchLimit {
    pub fn go_options(self) -> GoOptions {
        match self {
            SearchLimit::Depth(depth) => GoOptions::depth(depth),
            SearchLimit::MoveTime(time) => GoOptions::movetime(time.as_millis() as u64),
        }
    }
}

/// Settings for launching and driving one engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Program to run. Looked up on `PATH` when not a path.
    pub command: String,
    pub args: Vec<String>,
    pub limit: SearchLimit,
    /// Bound on the `uci`/`isready` exchange after launch.
    pub handshake_timeout: Duration,
    /// Bound on a move request, on top of any requested move time.
    pub move_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "bot-random".to_string(),
            args: Vec::new(),
            limit: SearchLimit::Depth(8),
            handshake_timeout: Duration::from_secs(10),
            move_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Time allowed between sending `go` and receiving `bestmove`.
    pub fn move_deadline(&self) -> Duration {
        match self.limit {
            SearchLimit::MoveTime(time) => time + self.move_timeout,
            SearchLimit::Depth(_) => self.move_timeout,
        }
    }
}
