//! Rejection reasons for proposed moves.

use chess_core::Square;
use thiserror::Error;

/// Why a proposed move was rejected.
///
/// Each variant renders a distinct message suitable for showing to a player.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("there is no piece on {0}")]
    NoPiece(Square),

    #[error("the piece on {0} belongs to your opponent")]
    NotYourPiece(Square),

    #[error("that piece cannot move from {from} to {to}")]
    IllegalShape { from: Square, to: Square },

    #[error("a pawn reaching the last rank must promote; choose a piece")]
    PromotionRequired,

    #[error("your king is in check and that move does not get it out")]
    LeavesKingInCheck,

    #[error("that move would put your own king in check")]
    PutsKingInCheck,

    #[error(transparent)]
    Castling(#[from] CastlingError),
}

/// Why a castling attempt was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CastlingError {
    #[error("cannot castle: the king has already moved")]
    KingMoved,

    #[error("cannot castle: that rook has already moved")]
    RookMoved,

    #[error("cannot castle: there are pieces between the king and the rook")]
    PathBlocked,

    #[error("cannot castle while in check")]
    KingInCheck,

    #[error("cannot castle: the king would cross or land on {0}, which is attacked")]
    SquareAttacked(Square),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_distinct() {
        let reasons = [
            InvalidMove::LeavesKingInCheck.to_string(),
            InvalidMove::PutsKingInCheck.to_string(),
            InvalidMove::from(CastlingError::KingMoved).to_string(),
            InvalidMove::from(CastlingError::RookMoved).to_string(),
            InvalidMove::from(CastlingError::KingInCheck).to_string(),
            InvalidMove::from(CastlingError::SquareAttacked(Square::F1)).to_string(),
        ];
        for (i, a) in reasons.iter().enumerate() {
            for b in &reasons[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(reasons[5].contains("f1"));
    }
}
