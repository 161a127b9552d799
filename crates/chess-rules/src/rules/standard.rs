//! Standard chess rules.

use super::{is_insufficient_material, CastlingError, GameResult, InvalidMove, RuleSet};
use crate::movegen::{
    castling_move, castling_path, castling_target, generate_pseudo_legal, is_in_check,
    is_square_attacked, make_move,
};
use crate::position::home_squares;
use crate::{MoveList, Position};
use chess_core::{CastleWing, CoordMove, Move, PieceType, Side};

/// Orthodox chess.
///
/// Legal moves are the pseudo-legal moves that leave the mover's king
/// unattacked; castling additionally requires that the king is not in check
/// and does not cross or land on an attacked square. Draws are stalemate and
/// insufficient material only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl StandardChess {
    fn castle_wing_for(side: Side, proposal: CoordMove) -> Option<CastleWing> {
        [CastleWing::Kingside, CastleWing::Queenside]
            .into_iter()
            .find(|&wing| {
                let (king_home, _) = home_squares(side, wing);
                proposal.from == king_home && proposal.to == castling_target(side, wing)
            })
    }

    /// Checks every castling condition in a fixed order so the first failing
    /// one is reported.
    fn check_castling(
        &self,
        position: &Position,
        side: Side,
        wing: CastleWing,
    ) -> Result<Move, CastlingError> {
        let rights = position.castling();
        if !rights.has(side, wing) {
            return Err(if position.king_moved(side) {
                CastlingError::KingMoved
            } else {
                CastlingError::RookMoved
            });
        }

        if is_in_check(position, side) {
            return Err(CastlingError::KingInCheck);
        }

        if (position.occupied() & castling_path(side, wing)).is_not_empty() {
            return Err(CastlingError::PathBlocked);
        }

        let (king_home, _) = home_squares(side, wing);
        let step: i8 = match wing {
            CastleWing::Kingside => 1,
            CastleWing::Queenside => -1,
        };
        for distance in 1..=2 {
            if let Some(sq) = king_home.offset(step * distance, 0) {
                if is_square_attacked(position, sq, side.opposite()) {
                    return Err(CastlingError::SquareAttacked(sq));
                }
            }
        }

        Ok(castling_move(side, wing))
    }

    fn select_candidate(
        pseudo: &MoveList,
        proposal: CoordMove,
    ) -> Result<Move, InvalidMove> {
        let shape = InvalidMove::IllegalShape {
            from: proposal.from,
            to: proposal.to,
        };
        let candidates: Vec<&Move> = pseudo
            .iter()
            .filter(|m| m.from == proposal.from && m.to == proposal.to && !m.is_castle())
            .collect();

        let Some(first) = candidates.first() else {
            return Err(shape);
        };

        let promotes = first.promotion.is_some();
        match (promotes, proposal.promotion) {
            (true, None) => Err(InvalidMove::PromotionRequired),
            (true, Some(piece)) => candidates
                .iter()
                .find(|m| m.promotion == Some(piece))
                .map(|m| **m)
                .ok_or(shape),
            (false, Some(_)) => Err(shape),
            (false, None) => Ok(**first),
        }
    }
}

impl RuleSet for StandardChess {
    fn initial_position(&self) -> Position {
        Position::startpos()
    }

    fn pseudo_legal_moves(&self, position: &Position) -> MoveList {
        generate_pseudo_legal(position)
    }

    fn legal_moves(&self, position: &Position) -> MoveList {
        let us = position.side_to_move();
        let mut moves = generate_pseudo_legal(position);
        moves.retain(|m| match m.castle_wing() {
            Some(wing) => self.check_castling(position, us, wing).is_ok(),
            None => !is_in_check(&make_move(position, m), us),
        });
        moves
    }

    fn validate(&self, position: &Position, proposal: CoordMove) -> Result<Move, InvalidMove> {
        let us = position.side_to_move();
        let piece = position
            .piece_at(proposal.from)
            .ok_or(InvalidMove::NoPiece(proposal.from))?;
        if piece.side != us {
            return Err(InvalidMove::NotYourPiece(proposal.from));
        }

        if piece.kind == PieceType::King {
            if let Some(wing) = Self::castle_wing_for(us, proposal) {
                if proposal.promotion.is_some() {
                    return Err(InvalidMove::IllegalShape {
                        from: proposal.from,
                        to: proposal.to,
                    });
                }
                return Ok(self.check_castling(position, us, wing)?);
            }
        }

        let candidate = Self::select_candidate(&generate_pseudo_legal(position), proposal)?;
        if is_in_check(&make_move(position, &candidate), us) {
            return Err(if is_in_check(position, us) {
                InvalidMove::LeavesKingInCheck
            } else {
                InvalidMove::PutsKingInCheck
            });
        }
        Ok(candidate)
    }

    fn is_check(&self, position: &Position) -> bool {
        is_in_check(position, position.side_to_move())
    }

    fn status(&self, position: &Position) -> GameResult {
        if self.legal_moves(position).is_empty() {
            return if self.is_check(position) {
                GameResult::CheckmateBy(position.side_to_move().opposite())
            } else {
                GameResult::DrawStalemate
            };
        }
        if is_insufficient_material(position) {
            return GameResult::DrawInsufficientMaterial;
        }
        GameResult::InProgress
    }
}
