use std::fmt;
use thiserror::Error;

/// Why a session stopped serving requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultReason {
    #[error("engine failed to initialize: {0}")]
    InitializationFailed(String),

    #[error("engine process terminated unexpectedly")]
    Crashed,

    #[error("engine sent a malformed response: {0}")]
    MalformedResponse(String),

    #[error("engine did not respond in time")]
    Timeout,

    #[error("engine proposed an illegal move: {0}")]
    IllegalMoveProposed(String),
}

/// Lifecycle of an engine session.
///
/// `NotStarted -> Starting -> Ready <-> AwaitingMove`, and from any state to
/// `Faulted` or `Stopped`. `Faulted` never returns to `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Starting,
    Ready,
    AwaitingMove,
    Faulted(FaultReason),
    Stopped,
}

impl SessionState {
    /// True once the session can no longer serve move requests.
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionState::Faulted(_) | SessionState::Stopped)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::Starting => write!(f, "starting"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::AwaitingMove => write!(f, "thinking"),
            SessionState::Faulted(reason) => write!(f, "faulted ({})", reason),
            SessionState::Stopped => write!(f, "stopped"),
        }
    }
}
