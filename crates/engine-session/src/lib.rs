//! Session with one external chess engine speaking UCI.
//!
//! An [`EngineSession`] is a handle to a background task that owns the engine
//! process. Requests go to the task over a channel and answers come back as
//! [`SessionEvent`]s, so waiting for the engine never blocks the caller. The
//! task publishes its [`SessionState`] on a watch channel:
//!
//! ```text
//! NotStarted -> Starting -> Ready <-> AwaitingMove
//!                   \          \          /
//!                    +--------> Faulted -> Stopped
//! ```
//!
//! A faulted session is finished. Callers that want to retry create a new
//! session.
//!
//! Every move request carries a [`RequestId`]. After [`EngineSession::cancel`]
//! the engine is told to `stop` and its reply to the cancelled request is
//! dropped, so it can never be mistaken for the answer to a later request.

mod actor;
mod config;
mod state;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{EngineConfig, SearchLimit};
pub use state::{FaultReason, SessionState};

use actor::{Actor, Command};
use chess_core::CoordMove;
use chess_rules::{Game, Position};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uci::PositionSpec;

/// How long [`EngineSession::shutdown`] waits for the task before aborting it.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Identifies one move request of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// Notifications from the session task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The handshake finished.
    Ready { name: Option<String> },
    /// The engine's answer to a request. Not yet checked against the rules.
    BestMove { request: RequestId, mv: CoordMove },
    /// The session faulted and its process has been terminated.
    Faulted(FaultReason),
}

/// Errors from calling into a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("engine session cannot take a request while {0}")]
    NotAccepting(SessionState),

    #[error("engine session task has ended")]
    Closed,
}

/// Handle to a running engine session.
///
/// Dropping the handle ends the session. The process is spawned with
/// `kill_on_drop`, so it does not outlive the handle even if the runtime
/// shuts down first.
pub struct EngineSession {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
    next_request: u64,
    outstanding: Option<RequestId>,
}

impl EngineSession {
    /// Launches the configured engine and starts the handshake.
    ///
    /// Returns immediately; readiness is reported by [`SessionEvent::Ready`].
    /// Failing to launch the program is an initialization failure.
    pub fn spawn(config: EngineConfig) -> Result<Self, FaultReason> {
        tracing::info!("Spawning engine: {} {:?}", config.command, config.args);
        let mut child = tokio::process::Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FaultReason::InitializationFailed(format!("cannot run '{}': {}", config.command, e))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(FaultReason::InitializationFailed(
                "engine pipes unavailable".to_string(),
            ));
        };
        Ok(Self::start(BufReader::new(stdout), stdin, Some(child), config))
    }

    /// Runs a session over an already connected byte stream instead of a
    /// child process.
    pub fn from_transport<R, W>(reader: R, writer: W, config: EngineConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::start(BufReader::new(reader), writer, None, config)
    }

    fn start<R, W>(
        reader: BufReader<R>,
        writer: W,
        child: Option<tokio::process::Child>,
        config: EngineConfig,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::NotStarted);

        let actor = Actor::new(reader, writer, child, config, state_tx, event_tx, command_rx);
        let task = tokio::spawn(actor.run());

        Self {
            commands: command_tx,
            events: event_rx,
            state: state_rx,
            task,
            next_request: 0,
            outstanding: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// True while a request has been sent and not yet answered or cancelled.
    pub fn is_awaiting_move(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Asks the engine for a move in the game's current position.
    ///
    /// Requests made before the handshake finishes are sent once it does.
    pub fn request_move(&mut self, game: &Game) -> Result<RequestId, SessionError> {
        let state = self.state();
        if state.is_finished() {
            return Err(SessionError::NotAccepting(state));
        }
        if self.outstanding.is_some() {
            return Err(SessionError::NotAccepting(SessionState::AwaitingMove));
        }

        let start = game.start_position();
        let position = if *start == Position::startpos() {
            PositionSpec::StartPos
        } else {
            PositionSpec::Fen(start.to_fen())
        };
        let moves = game.record().iter().map(|p| p.mov.to_uci()).collect();

        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.commands
            .send(Command::Request {
                id,
                position,
                moves,
            })
            .map_err(|_| SessionError::Closed)?;
        self.outstanding = Some(id);
        Ok(id)
    }

    /// Abandons the outstanding request, if any. Its reply is discarded.
    pub fn cancel(&mut self) {
        if let Some(id) = self.outstanding.take() {
            let _ = self.commands.send(Command::Cancel(id));
        }
    }

    /// Cancels any outstanding request and tells the engine a new game starts.
    pub fn new_game(&mut self) -> Result<(), SessionError> {
        self.cancel();
        self.commands
            .send(Command::NewGame)
            .map_err(|_| SessionError::Closed)
    }

    /// Waits for the next event. Replies to cancelled requests never appear.
    ///
    /// Returns `None` once the session task has ended.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            let event = self.events.recv().await?;
            match &event {
                SessionEvent::BestMove { request, .. } if Some(*request) != self.outstanding => {
                    tracing::debug!("Dropping reply to stale request {:?}", request);
                    continue;
                }
                SessionEvent::BestMove { .. } | SessionEvent::Faulted(_) => {
                    self.outstanding = None;
                }
                SessionEvent::Ready { .. } => {}
            }
            return Some(event);
        }
    }

    /// Sends `quit`, waits for the engine to exit and releases the process.
    pub async fn shutdown(self) {
        let Self {
            commands, mut task, ..
        } = self;
        let _ = commands.send(Command::Quit);
        drop(commands);
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await.is_err() {
            tracing::warn!("Engine session did not stop in time; aborting");
            task.abort();
        }
    }
}

impl std::fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSession")
            .field("state", &*self.state.borrow())
            .field("outstanding", &self.outstanding)
            .finish()
    }
}
