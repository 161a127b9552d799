//! Rules validation and terminal-state classification.
//!
//! The [`RuleSet`] trait is the seam between the game state machine and the
//! concrete rules. [`StandardChess`] implements orthodox chess on top of the
//! pseudo-legal generator in [`crate::movegen`].

mod error;
mod material;
mod standard;

pub use error::{CastlingError, InvalidMove};
pub use material::is_insufficient_material;
pub use standard::StandardChess;

use crate::{MoveList, Position};
use chess_core::{CoordMove, Move, Side};
use std::fmt;

/// State of a game: still running, or how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    InProgress,
    /// Checkmate delivered by the given side.
    CheckmateBy(Side),
    /// The given side resigned.
    Resignation(Side),
    DrawStalemate,
    DrawInsufficientMaterial,
    DrawAgreement,
}

impl GameResult {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    /// Returns the winning side, if the game was decisive.
    pub const fn winner(self) -> Option<Side> {
        match self {
            GameResult::CheckmateBy(side) => Some(side),
            GameResult::Resignation(side) => Some(side.opposite()),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            GameResult::DrawStalemate | GameResult::DrawInsufficientMaterial | GameResult::DrawAgreement
        )
    }

    /// Returns the PGN result token ("1-0", "0-1", "1/2-1/2" or "*").
    pub const fn pgn_token(self) -> &'static str {
        match self.winner() {
            Some(Side::White) => "1-0",
            Some(Side::Black) => "0-1",
            None if self.is_draw() => "1/2-1/2",
            None => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::InProgress => write!(f, "game in progress"),
            GameResult::CheckmateBy(side) => write!(f, "{side} wins by checkmate"),
            GameResult::Resignation(side) => {
                write!(f, "{} resigns, {} wins", side, side.opposite())
            }
            GameResult::DrawStalemate => write!(f, "draw by stalemate"),
            GameResult::DrawInsufficientMaterial => write!(f, "draw by insufficient material"),
            GameResult::DrawAgreement => write!(f, "draw by agreement"),
        }
    }
}

/// Rules of a chess variant.
///
/// # Example
///
/// ```
/// use chess_core::CoordMove;
/// use chess_rules::rules::{GameResult, RuleSet, StandardChess};
///
/// let position = StandardChess.initial_position();
/// assert_eq!(StandardChess.legal_moves(&position).len(), 20);
///
/// let proposal = CoordMove::from_uci("e2e4").unwrap();
/// let m = StandardChess.validate(&position, proposal).unwrap();
/// assert!(m.captured.is_none());
/// assert_eq!(StandardChess.status(&position), GameResult::InProgress);
/// ```
pub trait RuleSet {
    fn initial_position(&self) -> Position;

    /// Moves obeying movement rules and occupancy, ignoring king safety.
    fn pseudo_legal_moves(&self, position: &Position) -> MoveList;

    /// Moves that do not leave the mover's king attacked.
    fn legal_moves(&self, position: &Position) -> MoveList;

    /// Checks a proposed move against the position.
    ///
    /// Returns the fully described move on success, or the specific reason the
    /// proposal is rejected. The position is never modified.
    fn validate(&self, position: &Position, proposal: CoordMove) -> Result<Move, InvalidMove>;

    /// Returns true if `m` is one of the legal moves of the position.
    fn is_legal(&self, position: &Position, m: &Move) -> bool {
        self.validate(position, m.coord())
            .is_ok_and(|validated| validated == *m)
    }

    /// Returns true if the side to move is in check.
    fn is_check(&self, position: &Position) -> bool;

    /// Classifies the position: checkmate, stalemate, insufficient material,
    /// or still in progress.
    fn status(&self, position: &Position) -> GameResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_and_tokens() {
        assert_eq!(GameResult::CheckmateBy(Side::Black).winner(), Some(Side::Black));
        assert_eq!(GameResult::Resignation(Side::Black).winner(), Some(Side::White));
        assert_eq!(GameResult::Resignation(Side::White).pgn_token(), "0-1");
        assert_eq!(GameResult::CheckmateBy(Side::White).pgn_token(), "1-0");
        assert_eq!(GameResult::DrawStalemate.pgn_token(), "1/2-1/2");
        assert_eq!(GameResult::DrawAgreement.pgn_token(), "1/2-1/2");
        assert_eq!(GameResult::InProgress.pgn_token(), "*");
    }

    #[test]
    fn terminal_states() {
        assert!(!GameResult::InProgress.is_terminal());
        assert!(GameResult::DrawInsufficientMaterial.is_terminal());
        assert!(GameResult::Resignation(Side::White).is_terminal());
    }

    #[test]
    fn display() {
        assert_eq!(
            GameResult::CheckmateBy(Side::Black).to_string(),
            "Black wins by checkmate"
        );
        assert_eq!(
            GameResult::Resignation(Side::White).to_string(),
            "White resigns, Black wins"
        );
    }
}
