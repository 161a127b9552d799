//! Turn-taking between a human and an optional engine over one chess game.
//!
//! [`GameController`] owns the [`Game`](chess_rules::Game) and, when computer
//! play is enabled, one [`EngineSession`](engine_session::EngineSession).
//! Human input and engine answers pass through the same rules check before
//! they touch the game. Everything the presentation layer needs to know is
//! published as a [`ControllerEvent`].

pub mod config;
mod controller;

pub use config::{ComputerSide, Config, ConfigError};
pub use controller::{GameController, Launcher};

use chess_rules::{GameError, GameResult, InvalidMove, PgnError, Position};
use engine_session::FaultReason;
use thiserror::Error;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A move was applied, undone, or a game was started or loaded.
    PositionChanged(Position),
    /// A human move was refused; the game is unchanged.
    MoveRejected(MoveError),
    GameEnded(GameResult),
    /// Computer play has been switched off because of this fault.
    EngineFaulted(FaultReason),
}

/// Why a human move was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("it is the engine's turn")]
    NotYourTurn,

    #[error("cannot read move '{0}'")]
    Unparseable(String),

    #[error(transparent)]
    Rejected(InvalidMove),

    #[error("the game is over")]
    GameOver,
}

/// Errors from controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Persistence(#[from] PgnError),

    #[error(transparent)]
    Engine(#[from] FaultReason),
}
