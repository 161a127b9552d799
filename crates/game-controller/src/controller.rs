use crate::{ControllerError, ControllerEvent, MoveError};
use chess_core::{CoordMove, PieceType, Side};
use chess_rules::pgn::{self, PgnTags, PlayerType};
use chess_rules::{san_to_move, Game, GameError, InvalidMove, Position};
use engine_session::{EngineConfig, EngineSession, FaultReason, SessionError, SessionEvent, SessionState};
use std::path::Path;
use tokio::sync::mpsc;

/// Starts a fresh engine session. Called on enable and whenever a busy
/// session has to be replaced.
pub type Launcher = Box<dyn Fn() -> Result<EngineSession, FaultReason> + Send>;

struct Computer {
    side: Side,
    session: EngineSession,
    launcher: Launcher,
}

/// Owns the game and drives turns between the human and the engine.
pub struct GameController {
    game: Game,
    tags: PgnTags,
    computer: Option<Computer>,
    events: mpsc::UnboundedSender<ControllerEvent>,
}

impl GameController {
    /// Creates a controller for a human-vs-human game from the standard
    /// position, with the receiver for its events.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            game: Game::new(),
            tags: PgnTags::default(),
            computer: None,
            events,
        };
        (controller, rx)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn tags(&self) -> &PgnTags {
        &self.tags
    }

    pub fn set_player_names(&mut self, white: impl Into<String>, black: impl Into<String>) {
        self.tags.white = white.into();
        self.tags.black = black.into();
    }

    pub fn set_event_name(&mut self, event: impl Into<String>) {
        self.tags.event = event.into();
    }

    /// The side the engine plays, if computer play is on.
    pub fn computer_side(&self) -> Option<Side> {
        self.computer.as_ref().map(|c| c.side)
    }

    pub fn engine_state(&self) -> Option<SessionState> {
        self.computer.as_ref().map(|c| c.session.state())
    }

    /// True while the engine is expected to produce the next move.
    pub fn is_engine_turn(&self) -> bool {
        self.game.is_active() && self.computer_side() == Some(self.game.side_to_move())
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }

    /// Replaces the game with a fresh one from the standard position.
    pub async fn new_game(&mut self) {
        self.new_game_from(Position::startpos()).await;
    }

    /// Replaces the game with a fresh one from `start`.
    pub async fn new_game_from(&mut self, start: Position) {
        self.reset_engine().await;
        self.game = Game::from_position(start);
        self.tags.date = PgnTags::default().date;
        tracing::info!("New game from {}", self.game.start_position().to_fen());
        self.after_reset();
    }

    /// Makes the engine forget the current game. A session busy with a move
    /// request is shut down and replaced, so its answer can never arrive.
    async fn reset_engine(&mut self) {
        let Some(computer) = self.computer.as_mut() else {
            return;
        };
        if !computer.session.is_awaiting_move() {
            if computer.session.new_game().is_err() {
                tracing::debug!("Engine session already closed");
            }
            return;
        }

        let Some(Computer {
            side,
            session,
            launcher,
        }) = self.computer.take()
        else {
            return;
        };
        tracing::info!("Replacing busy engine session");
        session.shutdown().await;
        match launcher() {
            Ok(session) => {
                self.computer = Some(Computer {
                    side,
                    session,
                    launcher,
                })
            }
            Err(reason) => self.engine_lost(reason),
        }
    }

    fn after_reset(&mut self) {
        self.emit(ControllerEvent::PositionChanged(self.game.position().clone()));
        if !self.game.is_active() {
            self.emit(ControllerEvent::GameEnded(self.game.result()));
        }
        self.request_engine_move_if_due();
    }

    /// Turns on computer play for `side` with an engine process launched
    /// from `config`.
    pub async fn enable_computer(
        &mut self,
        side: Side,
        config: EngineConfig,
    ) -> Result<(), ControllerError> {
        self.enable_computer_with(side, move || EngineSession::spawn(config.clone()))
            .await
    }

    /// Turns on computer play for `side` using sessions from `launcher`.
    pub async fn enable_computer_with<F>(
        &mut self,
        side: Side,
        launcher: F,
    ) -> Result<(), ControllerError>
    where
        F: Fn() -> Result<EngineSession, FaultReason> + Send + 'static,
    {
        self.disable_computer().await;
        let session = match launcher() {
            Ok(session) => session,
            Err(reason) => {
                self.engine_lost(reason.clone());
                return Err(ControllerError::Engine(reason));
            }
        };
        tracing::info!("Computer plays {}", side);
        self.computer = Some(Computer {
            side,
            session,
            launcher: Box::new(launcher),
        });
        self.sync_player_types();
        self.request_engine_move_if_due();
        Ok(())
    }

    /// Turns off computer play, terminating the engine process.
    pub async fn disable_computer(&mut self) {
        if let Some(computer) = self.computer.take() {
            tracing::info!("Computer play disabled");
            computer.session.shutdown().await;
        }
        self.sync_player_types();
    }

    fn sync_player_types(&mut self) {
        for side in Side::ALL {
            let player = if self.computer_side() == Some(side) {
                PlayerType::Program
            } else {
                PlayerType::Human
            };
            self.tags.set_player_type(side, player);
        }
    }

    fn request_engine_move_if_due(&mut self) {
        if !self.is_engine_turn() {
            return;
        }
        let Some(computer) = self.computer.as_mut() else {
            return;
        };
        if computer.session.is_awaiting_move() {
            return;
        }
        match computer.session.request_move(&self.game) {
            Ok(id) => tracing::debug!("Requested engine move {:?}", id),
            // The fault itself arrives as a session event.
            Err(SessionError::NotAccepting(state)) => {
                tracing::debug!("Engine not accepting requests: {}", state)
            }
            Err(SessionError::Closed) => tracing::warn!("Engine session task has ended"),
        }
    }

    fn reject(&self, error: MoveError) -> Result<(), ControllerError> {
        tracing::debug!("Rejected move: {}", error);
        self.emit(ControllerEvent::MoveRejected(error.clone()));
        Err(ControllerError::Move(error))
    }

    /// Reads a human move in coordinate notation or SAN and plays it.
    ///
    /// A coordinate move to the last rank without a piece promotes to a
    /// queen.
    pub fn submit_human_move(&mut self, text: &str) -> Result<(), ControllerError> {
        let text = text.trim();
        if !self.game.is_active() {
            return self.reject(MoveError::GameOver);
        }
        if self.is_engine_turn() {
            return self.reject(MoveError::NotYourTurn);
        }

        let proposal = match CoordMove::from_uci(text) {
            Some(coord) => coord,
            None => match san_to_move(self.game.position(), text) {
                Ok(m) => m.coord(),
                Err(e) => {
                    tracing::debug!("Cannot read '{}': {}", text, e);
                    return self.reject(MoveError::Unparseable(text.to_string()));
                }
            },
        };

        let proposal = match self.game.validate(proposal) {
            Err(GameError::Invalid(InvalidMove::PromotionRequired)) => {
                CoordMove::with_promotion(proposal.from, proposal.to, PieceType::Queen)
            }
            _ => proposal,
        };

        match self.game.apply_move(proposal) {
            Ok(played) => {
                tracing::info!("Human plays {}", played.san);
                self.after_move();
                Ok(())
            }
            Err(GameError::Invalid(reason)) => self.reject(MoveError::Rejected(reason)),
            Err(_) => self.reject(MoveError::GameOver),
        }
    }

    fn after_move(&mut self) {
        self.emit(ControllerEvent::PositionChanged(self.game.position().clone()));
        if self.game.is_active() {
            self.request_engine_move_if_due();
        } else {
            tracing::info!("Game over: {}", self.game.result());
            self.emit(ControllerEvent::GameEnded(self.game.result()));
        }
    }

    fn cancel_engine_request(&mut self) {
        if let Some(computer) = self.computer.as_mut() {
            computer.session.cancel();
        }
    }

    /// Takes back the last move, or the last move pair in a game against
    /// the engine, so that the human is to move afterwards.
    pub fn undo(&mut self) -> Result<(), ControllerError> {
        let plies = match self.computer.as_ref() {
            None => 1,
            Some(c) if c.session.is_awaiting_move() => 1,
            Some(_) => 2,
        };
        if !self.game.is_active() {
            return Err(GameError::GameOver(self.game.result()).into());
        }
        if self.game.ply_count() < plies {
            return Err(GameError::NothingToUndo.into());
        }

        self.cancel_engine_request();
        for _ in 0..plies {
            let undone = self.game.undo()?;
            tracing::info!("Took back {}", undone.san);
        }
        self.emit(ControllerEvent::PositionChanged(self.game.position().clone()));
        self.request_engine_move_if_due();
        Ok(())
    }

    /// The human resigns: the side to move, or the human's side in a game
    /// against the engine.
    pub fn resign(&mut self) -> Result<(), ControllerError> {
        let side = match self.computer_side() {
            Some(engine) => engine.opposite(),
            None => self.game.side_to_move(),
        };
        self.game.resign(side)?;
        self.finish_early();
        Ok(())
    }

    pub fn agree_draw(&mut self) -> Result<(), ControllerError> {
        self.game.agree_draw()?;
        self.finish_early();
        Ok(())
    }

    fn finish_early(&mut self) {
        self.cancel_engine_request();
        tracing::info!("Game over: {}", self.game.result());
        self.emit(ControllerEvent::GameEnded(self.game.result()));
    }

    /// Writes the game as PGN.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        pgn::save(path.as_ref(), &self.game, &self.tags)?;
        tracing::info!("Saved game to {}", path.as_ref().display());
        Ok(())
    }

    /// Replaces the game with one read from a PGN file. On error the current
    /// game is kept.
    ///
    /// If computer play is on and the file names exactly one side as played
    /// by a program, the engine takes over that side.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        let loaded = pgn::load(path.as_ref())?;
        tracing::info!(
            "Loaded {} plies from {}",
            loaded.game.ply_count(),
            path.as_ref().display()
        );

        self.reset_engine().await;
        let program_sides: Vec<Side> = Side::ALL
            .into_iter()
            .filter(|&side| loaded.tags.player_type(side) == PlayerType::Program)
            .collect();
        if let (Some(computer), [side]) = (self.computer.as_mut(), program_sides.as_slice()) {
            computer.side = *side;
        }

        self.game = loaded.game;
        self.tags = loaded.tags;
        self.sync_player_types();
        self.after_reset();
        Ok(())
    }

    /// Waits for the next engine event. Pending forever without an engine,
    /// which makes it safe to use in a `select!` loop.
    pub async fn next_engine_event(&mut self) -> SessionEvent {
        if let Some(computer) = self.computer.as_mut() {
            if let Some(event) = computer.session.next_event().await {
                return event;
            }
        }
        std::future::pending().await
    }

    /// Applies an engine event to the game.
    pub async fn handle_engine_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Ready { name } => {
                let (Some(name), Some(side)) = (name, self.computer_side()) else {
                    return;
                };
                tracing::info!("Engine '{}' ready", name);
                let tag = match side {
                    Side::White => &mut self.tags.white,
                    Side::Black => &mut self.tags.black,
                };
                if *tag == "-" {
                    *tag = name;
                }
            }
            SessionEvent::BestMove { mv, .. } => self.play_engine_move(mv).await,
            SessionEvent::Faulted(reason) => {
                self.disable_computer().await;
                self.engine_lost(reason);
            }
        }
    }

    /// Waits for one engine event and applies it.
    pub async fn pump(&mut self) {
        let event = self.next_engine_event().await;
        self.handle_engine_event(event).await;
    }

    async fn play_engine_move(&mut self, mv: CoordMove) {
        if !self.is_engine_turn() {
            tracing::debug!("Ignoring engine move {} outside its turn", mv);
            return;
        }
        match self.game.apply_move(mv) {
            Ok(played) => {
                tracing::info!("Engine plays {}", played.san);
                self.after_move();
            }
            Err(e) => {
                tracing::warn!("Engine proposed illegal move {}: {}", mv, e);
                self.disable_computer().await;
                self.engine_lost(FaultReason::IllegalMoveProposed(mv.to_uci()));
            }
        }
    }

    fn engine_lost(&self, reason: FaultReason) {
        tracing::warn!("Computer play stopped: {}", reason);
        self.emit(ControllerEvent::EngineFaulted(reason));
    }
}
