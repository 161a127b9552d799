//! The task that owns the engine's pipes and process handle.

use crate::{EngineConfig, FaultReason, RequestId, SessionEvent, SessionState};
use chess_core::CoordMove;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::process::Child;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, timeout, Instant};
use uci::{EngineMessage, GuiCommand, PositionSpec};

/// How long a healthy engine gets to exit after `quit`.
const QUIT_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub(crate) enum Command {
    Request {
        id: RequestId,
        position: PositionSpec,
        moves: Vec<String>,
    },
    Cancel(RequestId),
    NewGame,
    Quit,
}

struct Pending {
    id: RequestId,
    deadline: Instant,
    /// A `stop` was sent; the reply is read and dropped.
    cancelled: bool,
}

enum Step {
    Command(Option<Command>),
    Line(std::io::Result<Option<String>>),
    Deadline,
}

pub(crate) struct Actor<R, W> {
    lines: Lines<R>,
    writer: W,
    child: Option<Child>,
    config: EngineConfig,
    state: watch::Sender<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
    queued: VecDeque<Command>,
    pending: Option<Pending>,
}

impl<R, W> Actor<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(
        reader: R,
        writer: W,
        child: Option<Child>,
        config: EngineConfig,
        state: watch::Sender<SessionState>,
        events: mpsc::UnboundedSender<SessionEvent>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            lines: reader.lines(),
            writer,
            child,
            config,
            state,
            events,
            commands,
            queued: VecDeque::new(),
            pending: None,
        }
    }

    pub(crate) async fn run(mut self) {
        self.set_state(SessionState::Starting);

        let served = match self.handshake().await {
            Ok(name) => {
                self.set_state(SessionState::Ready);
                let _ = self.events.send(SessionEvent::Ready { name });
                self.serve().await
            }
            Err(reason) => Err(reason),
        };

        match served {
            Ok(()) => self.quit().await,
            Err(reason) => {
                self.fault(reason).await;
                self.drain_until_quit().await;
            }
        }
        self.set_state(SessionState::Stopped);
    }

    fn set_state(&self, state: SessionState) {
        tracing::info!(state = %state, "engine session state");
        self.state.send_replace(state);
    }

    async fn send(&mut self, cmd: &GuiCommand) -> Result<(), FaultReason> {
        let line = cmd.to_uci();
        tracing::debug!("-> engine: {}", line);
        let written = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await
        };
        written.await.map_err(|e| {
            tracing::warn!("Failed to write to engine: {}", e);
            FaultReason::Crashed
        })
    }

    async fn handshake(&mut self) -> Result<Option<String>, FaultReason> {
        let limit = self.config.handshake_timeout;
        match timeout(limit, self.exchange_handshake()).await {
            Ok(result) => result,
            Err(_) => Err(FaultReason::InitializationFailed(format!(
                "no reply within {} ms",
                limit.as_millis()
            ))),
        }
    }

    async fn exchange_handshake(&mut self) -> Result<Option<String>, FaultReason> {
        let init_failed = |reason: &str| FaultReason::InitializationFailed(reason.to_string());

        self.send(&GuiCommand::Uci)
            .await
            .map_err(|_| init_failed("could not write to the engine"))?;
        let mut name = None;
        loop {
            match self.read_handshake_line().await? {
                Ok(EngineMessage::IdName(n)) => name = Some(n),
                Ok(EngineMessage::UciOk) => break,
                _ => {}
            }
        }

        self.send(&GuiCommand::IsReady)
            .await
            .map_err(|_| init_failed("could not write to the engine"))?;
        loop {
            if let Ok(EngineMessage::ReadyOk) = self.read_handshake_line().await? {
                break;
            }
        }
        tracing::info!("Engine ready: {}", name.as_deref().unwrap_or("(unnamed)"));
        Ok(name)
    }

    async fn read_handshake_line(
        &mut self,
    ) -> Result<Result<EngineMessage, uci::UciError>, FaultReason> {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                tracing::debug!("<- engine: {}", line);
                Ok(EngineMessage::parse(&line))
            }
            Ok(None) => Err(FaultReason::InitializationFailed(
                "engine exited during the handshake".to_string(),
            )),
            Err(e) => Err(FaultReason::InitializationFailed(e.to_string())),
        }
    }

    /// Runs until the handle asks to quit or the engine faults.
    async fn serve(&mut self) -> Result<(), FaultReason> {
        loop {
            if self.pending.is_none() {
                self.start_queued().await?;
            }

            let deadline = self.pending.as_ref().map(|p| p.deadline);
            let step = tokio::select! {
                cmd = self.commands.recv() => Step::Command(cmd),
                line = self.lines.next_line() => Step::Line(line),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    Step::Deadline
                }
            };

            match step {
                Step::Command(None) | Step::Command(Some(Command::Quit)) => return Ok(()),
                Step::Command(Some(Command::Cancel(id))) => self.cancel(id).await?,
                Step::Command(Some(cmd)) => self.queued.push_back(cmd),
                Step::Line(Ok(Some(line))) => self.on_line(&line)?,
                Step::Line(Ok(None)) => return Err(FaultReason::Crashed),
                Step::Line(Err(e)) => {
                    tracing::warn!("Failed to read from engine: {}", e);
                    return Err(FaultReason::Crashed);
                }
                Step::Deadline => return Err(FaultReason::Timeout),
            }
        }
    }

    /// Sends queued work until a move request is in flight.
    async fn start_queued(&mut self) -> Result<(), FaultReason> {
        while let Some(cmd) = self.queued.pop_front() {
            match cmd {
                Command::NewGame => self.send(&GuiCommand::UciNewGame).await?,
                Command::Request { id, position, moves } => {
                    self.send(&GuiCommand::Position { position, moves }).await?;
                    let go = GuiCommand::Go(self.config.limit.go_options());
                    self.send(&go).await?;
                    self.pending = Some(Pending {
                        id,
                        deadline: Instant::now() + self.config.move_deadline(),
                        cancelled: false,
                    });
                    self.set_state(SessionState::AwaitingMove);
                    return Ok(());
                }
                Command::Cancel(_) | Command::Quit => {}
            }
        }
        Ok(())
    }

    async fn cancel(&mut self, id: RequestId) -> Result<(), FaultReason> {
        let before = self.queued.len();
        self.queued
            .retain(|cmd| !matches!(cmd, Command::Request { id: req, .. } if *req == id));
        if self.queued.len() != before {
            tracing::debug!("Dropped queued request {:?}", id);
            return Ok(());
        }

        let in_flight = match self.pending.as_mut() {
            Some(pending) if pending.id == id && !pending.cancelled => pending,
            _ => return Ok(()),
        };
        in_flight.cancelled = true;
        tracing::info!("Cancelling move request {:?}", id);
        self.send(&GuiCommand::Stop).await
    }

    fn on_line(&mut self, line: &str) -> Result<(), FaultReason> {
        tracing::debug!("<- engine: {}", line);

        let expecting = self.pending.as_ref().is_some_and(|p| !p.cancelled);
        let message = match EngineMessage::parse(line) {
            Ok(message) => message,
            Err(_) if expecting => return Err(FaultReason::MalformedResponse(line.to_string())),
            Err(_) => return Ok(()),
        };

        let EngineMessage::BestMove { mv, .. } = message else {
            return Ok(());
        };
        let Some(pending) = self.pending.take() else {
            tracing::debug!("Ignoring unsolicited bestmove {}", mv);
            return Ok(());
        };
        self.set_state(SessionState::Ready);

        if pending.cancelled {
            tracing::debug!("Discarding reply {} to cancelled request {:?}", mv, pending.id);
            return Ok(());
        }
        let coord =
            CoordMove::from_uci(&mv).ok_or_else(|| FaultReason::MalformedResponse(line.to_string()))?;
        tracing::info!("Engine proposes {}", coord);
        let _ = self.events.send(SessionEvent::BestMove {
            request: pending.id,
            mv: coord,
        });
        Ok(())
    }

    async fn fault(&mut self, reason: FaultReason) {
        tracing::warn!("Engine fault: {}", reason);
        self.pending = None;
        self.queued.clear();
        self.set_state(SessionState::Faulted(reason.clone()));
        let _ = self.events.send(SessionEvent::Faulted(reason));
        self.kill().await;
    }

    async fn drain_until_quit(&mut self) {
        while let Some(cmd) = self.commands.recv().await {
            if matches!(cmd, Command::Quit) {
                break;
            }
        }
    }

    async fn quit(&mut self) {
        let _ = self.send(&GuiCommand::Quit).await;
        let _ = self.writer.shutdown().await;
        if let Some(child) = self.child.as_mut() {
            match timeout(QUIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => {
                    tracing::info!("Engine exited: {}", status);
                    self.child = None;
                }
                _ => self.kill().await,
            }
        }
    }

    async fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill engine process: {}", e);
            } else {
                tracing::info!("Engine process terminated");
            }
        }
    }
}
