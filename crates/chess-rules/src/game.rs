//! Game state machine: move record, undo, and result detection.
//!
//! A [`Game`] is `Active` while its result is [`GameResult::InProgress`] and
//! becomes terminal, permanently, once a result is reached. Every applied
//! move is validated against the current position and recorded together
//! with the position it produced, so undo restores history exactly instead
//! of computing an inverse move.

use crate::movegen::make_move;
use crate::rules::{GameResult, InvalidMove, RuleSet, StandardChess};
use crate::san::{move_to_san, san_to_move, SanError};
use crate::{MoveList, Position, PositionError};
use chess_core::{CoordMove, Move, Side};
use thiserror::Error;

/// One entry of the game record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub mov: Move,
    /// SAN of the move, rendered in the position it was played from.
    pub san: String,
    /// The position the move produced.
    pub position: Position,
}

/// Errors from game operations. The game is unchanged when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Invalid(#[from] InvalidMove),

    #[error(transparent)]
    Notation(#[from] SanError),

    #[error("the game is over ({0})")]
    GameOver(GameResult),

    #[error("there is no move to undo")]
    NothingToUndo,
}

/// A single game from its start position to its result.
#[derive(Debug, Clone)]
pub struct Game {
    start: Position,
    record: Vec<PlayedMove>,
    result: GameResult,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(StandardChess.initial_position())
    }

    /// Creates a game from an arbitrary position, which may already be
    /// terminal.
    pub fn from_position(start: Position) -> Self {
        let result = StandardChess.status(&start);
        Game {
            start,
            record: Vec::new(),
            result,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        self.record.last().map_or(&self.start, |played| &played.position)
    }

    pub fn start_position(&self) -> &Position {
        &self.start
    }

    /// Returns the moves played so far, oldest first.
    pub fn record(&self) -> &[PlayedMove] {
        &self.record
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Returns true until the game reaches a result.
    pub fn is_active(&self) -> bool {
        !self.result.is_terminal()
    }

    pub fn side_to_move(&self) -> Side {
        self.position().side_to_move()
    }

    pub fn ply_count(&self) -> usize {
        self.record.len()
    }

    pub fn legal_moves(&self) -> MoveList {
        StandardChess.legal_moves(self.position())
    }

    pub fn is_check(&self) -> bool {
        StandardChess.is_check(self.position())
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(GameError::GameOver(self.result))
        }
    }

    /// Validates a proposed move without applying it.
    pub fn validate(&self, proposal: CoordMove) -> Result<Move, GameError> {
        self.ensure_active()?;
        Ok(StandardChess.validate(self.position(), proposal)?)
    }

    /// Validates and applies a proposed move, then classifies the new
    /// position.
    pub fn apply_move(&mut self, proposal: CoordMove) -> Result<&PlayedMove, GameError> {
        let m = self.validate(proposal)?;
        Ok(self.push(m))
    }

    /// Applies a move given in SAN.
    pub fn apply_san(&mut self, san: &str) -> Result<&PlayedMove, GameError> {
        self.ensure_active()?;
        let m = san_to_move(self.position(), san)?;
        Ok(self.push(m))
    }

    fn push(&mut self, m: Move) -> &PlayedMove {
        let before = self.position();
        let san = move_to_san(before, &m);
        let position = make_move(before, &m);
        self.result = StandardChess.status(&position);
        self.record.push(PlayedMove {
            mov: m,
            san,
            position,
        });
        &self.record[self.record.len() - 1]
    }

    /// Takes back the last move, restoring the previous position from the
    /// record. Not available once the game has a result.
    pub fn undo(&mut self) -> Result<PlayedMove, GameError> {
        self.ensure_active()?;
        self.record.pop().ok_or(GameError::NothingToUndo)
    }

    /// Ends the game with `side` resigning.
    pub fn resign(&mut self, side: Side) -> Result<(), GameError> {
        self.ensure_active()?;
        self.result = GameResult::Resignation(side);
        Ok(())
    }

    /// Ends the game as a draw by agreement.
    pub fn agree_draw(&mut self) -> Result<(), GameError> {
        self.ensure_active()?;
        self.result = GameResult::DrawAgreement;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{CastleWing, PieceType};

    fn coord(uci: &str) -> CoordMove {
        CoordMove::from_uci(uci).unwrap()
    }

    fn play(game: &mut Game, moves: &[&str]) {
        for uci in moves {
            game.apply_move(coord(uci)).unwrap();
        }
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert!(game.is_active());
        assert_eq!(game.ply_count(), 0);
        assert_eq!(game.side_to_move(), Side::White);
        assert_eq!(game.legal_moves().len(), 20);
    }

    #[test]
    fn apply_records_san_and_position() {
        let mut game = Game::new();
        let played = game.apply_move(coord("g1f3")).unwrap();
        assert_eq!(played.san, "Nf3");
        assert_eq!(played.position.side_to_move(), Side::Black);
        assert_eq!(game.side_to_move(), Side::Black);

        game.apply_san("d5").unwrap();
        assert_eq!(game.record()[1].mov.to_uci(), "d7d5");
    }

    #[test]
    fn rejected_move_leaves_game_unchanged() {
        let mut game = Game::new();
        let before = game.position().clone();
        assert!(matches!(
            game.apply_move(coord("e2e5")),
            Err(GameError::Invalid(InvalidMove::IllegalShape { .. }))
        ));
        assert!(matches!(
            game.apply_san("Ke2"),
            Err(GameError::Notation(SanError::NoMatchingMove(_)))
        ));
        assert_eq!(game.position(), &before);
        assert_eq!(game.ply_count(), 0);
    }

    #[test]
    fn fools_mate() {
        let mut game = Game::new();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(game.result(), GameResult::CheckmateBy(Side::Black));
        assert!(!game.is_active());
        assert_eq!(game.record()[3].san, "Qh4#");
    }

    #[test]
    fn terminal_game_is_frozen() {
        let mut game = Game::new();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let over = GameError::GameOver(GameResult::CheckmateBy(Side::Black));
        assert_eq!(game.apply_move(coord("e1f2")).unwrap_err(), over);
        assert_eq!(game.undo().unwrap_err(), over);
        assert_eq!(game.resign(Side::White).unwrap_err(), over);
        assert_eq!(game.ply_count(), 4);
    }

    #[test]
    fn stalemate_from_position() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.result(), GameResult::DrawStalemate);
    }

    #[test]
    fn stalemate_after_move() {
        let mut game = Game::from_fen("7k/4Q3/6K1/8/8/8/8/8 w - - 0 1").unwrap();
        play(&mut game, &["e7f7"]);
        assert_eq!(game.result(), GameResult::DrawStalemate);
    }

    #[test]
    fn capture_down_to_bare_kings() {
        let mut game = Game::from_fen("8/8/8/8/8/8/3qK3/7k w - - 0 1").unwrap();
        play(&mut game, &["e2d2"]);
        assert_eq!(game.result(), GameResult::DrawInsufficientMaterial);
    }

    #[test]
    fn undo_restores_previous_position() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "e7e5"]);
        let before = game.position().clone();
        play(&mut game, &["g1f3"]);
        let undone = game.undo().unwrap();
        assert_eq!(undone.mov.to_uci(), "g1f3");
        assert_eq!(game.position(), &before);

        game.undo().unwrap();
        game.undo().unwrap();
        assert_eq!(game.position(), &Position::startpos());
        assert_eq!(game.undo().unwrap_err(), GameError::NothingToUndo);
    }

    #[test]
    fn castling_through_game() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"]);
        let last = &game.record()[6];
        assert_eq!(last.mov.castle_wing(), Some(CastleWing::Kingside));
        assert_eq!(last.san, "O-O");
    }

    #[test]
    fn promotion_through_game() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(matches!(
            game.apply_move(coord("a7a8")),
            Err(GameError::Invalid(InvalidMove::PromotionRequired))
        ));
        play(&mut game, &["a7a8q"]);
        assert_eq!(game.record()[0].mov.promotion, Some(PieceType::Queen));
    }

    #[test]
    fn resign_and_agree_draw() {
        let mut game = Game::new();
        game.resign(Side::White).unwrap();
        assert_eq!(game.result(), GameResult::Resignation(Side::White));
        assert_eq!(game.result().winner(), Some(Side::Black));

        let mut game = Game::new();
        game.agree_draw().unwrap();
        assert_eq!(game.result(), GameResult::DrawAgreement);
        assert!(game.agree_draw().is_err());
    }
}
