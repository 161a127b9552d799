//! Pseudo-legal move generation and move application.
//!
//! Generated moves obey piece movement and board occupancy but may leave the
//! mover's king attacked. Castling candidates are produced whenever the right
//! is held and the squares between king and rook are empty; attacked-square
//! conditions are checked by the rules validator.

mod attacks;
pub mod perft;

use crate::position::home_squares;
use crate::{Bitboard, Position};
use chess_core::{CastleWing, Move, MoveKind, Piece, PieceType, Side, Square};

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};

/// A list of generated moves.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    moves: Vec<Move>,
}

impl MoveList {
    /// Typical upper bound on moves in a position, used as initial capacity.
    const CAPACITY: usize = 64;

    pub fn new() -> Self {
        MoveList {
            moves: Vec::with_capacity(Self::CAPACITY),
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        self.moves.retain(f);
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all pseudo-legal moves for the side to move.
pub fn generate_pseudo_legal(position: &Position) -> MoveList {
    let mut moves = MoveList::new();

    generate_pawn_moves(position, &mut moves);
    for kind in [
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ] {
        generate_piece_moves(position, kind, &mut moves);
    }
    generate_castling_candidates(position, &mut moves);

    moves
}

fn captured_on(position: &Position, sq: Square) -> Option<PieceType> {
    position.piece_at(sq).map(|p| p.kind)
}

fn push_pawn_move(moves: &mut MoveList, mut m: Move, promotion_rank: u8) {
    if m.to.rank().index() == promotion_rank {
        for promotion in PieceType::PROMOTIONS {
            m.promotion = Some(promotion);
            moves.push(m);
        }
    } else {
        moves.push(m);
    }
}

fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let them = us.opposite();
    let occupied = position.occupied();
    let enemies = position.side_pieces(them);
    let dir = us.pawn_direction();

    for from in position.pieces_of(PieceType::Pawn, us) {
        if let Some(one) = from.offset(0, dir).filter(|sq| !occupied.contains(*sq)) {
            push_pawn_move(
                moves,
                Move::quiet(from, one, PieceType::Pawn),
                us.promotion_rank(),
            );
            if from.rank().index() == us.pawn_rank() {
                if let Some(two) = one.offset(0, dir).filter(|sq| !occupied.contains(*sq)) {
                    moves.push(Move {
                        kind: MoveKind::DoublePush,
                        ..Move::quiet(from, two, PieceType::Pawn)
                    });
                }
            }
        }

        for to in pawn_attacks(from, us) & enemies {
            push_pawn_move(
                moves,
                Move {
                    captured: captured_on(position, to),
                    ..Move::quiet(from, to, PieceType::Pawn)
                },
                us.promotion_rank(),
            );
        }

        if let Some(target) = position.en_passant() {
            if pawn_attacks(from, us).contains(target) {
                moves.push(Move {
                    captured: Some(PieceType::Pawn),
                    kind: MoveKind::EnPassant,
                    ..Move::quiet(from, target, PieceType::Pawn)
                });
            }
        }
    }
}

fn piece_attacks(kind: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceType::Knight => knight_attacks(sq),
        PieceType::Bishop => bishop_attacks(sq, occupied),
        PieceType::Rook => rook_attacks(sq, occupied),
        PieceType::Queen => queen_attacks(sq, occupied),
        PieceType::King => king_attacks(sq),
        PieceType::Pawn => Bitboard::EMPTY,
    }
}

fn generate_piece_moves(position: &Position, kind: PieceType, moves: &mut MoveList) {
    let us = position.side_to_move();
    let own = position.side_pieces(us);
    let occupied = position.occupied();

    for from in position.pieces_of(kind, us) {
        for to in piece_attacks(kind, from, occupied) & !own {
            moves.push(Move {
                captured: captured_on(position, to),
                ..Move::quiet(from, to, kind)
            });
        }
    }
}

/// Squares strictly between king and rook for a castle.
pub(crate) fn castling_path(side: Side, wing: CastleWing) -> Bitboard {
    let rank = side.back_rank() as i8;
    let files: &[i8] = match wing {
        CastleWing::Kingside => &[5, 6],
        CastleWing::Queenside => &[1, 2, 3],
    };
    files
        .iter()
        .filter_map(|file| Square::from_coords(*file, rank))
        .fold(Bitboard::EMPTY, |bb, sq| bb | Bitboard::from_square(sq))
}

/// Destination of the king for a castle.
pub(crate) fn castling_target(side: Side, wing: CastleWing) -> Square {
    match (side, wing) {
        (Side::White, CastleWing::Kingside) => Square::G1,
        (Side::White, CastleWing::Queenside) => Square::C1,
        (Side::Black, CastleWing::Kingside) => Square::G8,
        (Side::Black, CastleWing::Queenside) => Square::C8,
    }
}

/// Builds the castling move for a side, regardless of legality.
pub(crate) fn castling_move(side: Side, wing: CastleWing) -> Move {
    let (king_home, _) = home_squares(side, wing);
    Move {
        kind: MoveKind::Castle(wing),
        ..Move::quiet(king_home, castling_target(side, wing), PieceType::King)
    }
}

fn generate_castling_candidates(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    for wing in [CastleWing::Kingside, CastleWing::Queenside] {
        if position.castling().has(us, wing)
            && (position.occupied() & castling_path(us, wing)).is_empty()
        {
            moves.push(castling_move(us, wing));
        }
    }
}

/// Returns true if any piece of `by` attacks `sq`.
pub fn is_square_attacked(position: &Position, sq: Square, by: Side) -> bool {
    let occupied = position.occupied();
    let queens = position.pieces_of(PieceType::Queen, by);

    (pawn_attacks(sq, by.opposite()) & position.pieces_of(PieceType::Pawn, by)).is_not_empty()
        || (knight_attacks(sq) & position.pieces_of(PieceType::Knight, by)).is_not_empty()
        || (king_attacks(sq) & position.pieces_of(PieceType::King, by)).is_not_empty()
        || (bishop_attacks(sq, occupied) & (position.pieces_of(PieceType::Bishop, by) | queens))
            .is_not_empty()
        || (rook_attacks(sq, occupied) & (position.pieces_of(PieceType::Rook, by) | queens))
            .is_not_empty()
}

/// Returns true if the king of `side` is attacked.
pub fn is_in_check(position: &Position, side: Side) -> bool {
    position
        .king_square(side)
        .map_or(false, |king| is_square_attacked(position, king, side.opposite()))
}

/// Applies a move generated for `position` and returns the resulting
/// position.
///
/// Updates castling rights when a king or rook leaves its home square or a
/// rook is captured there, sets the en passant target only after a double
/// push, and advances the clocks.
pub fn make_move(position: &Position, m: &Move) -> Position {
    let mut next = position.clone();
    let us = position.side_to_move();
    let them = us.opposite();

    next.remove(m.from);
    next.remove(m.to);
    next.put(m.to, Piece::new(m.promotion.unwrap_or(m.piece), us));

    match m.kind {
        MoveKind::EnPassant => {
            if let Some(victim) = m.to.offset(0, -us.pawn_direction()) {
                next.remove(victim);
            }
        }
        MoveKind::Castle(wing) => {
            let (_, rook_home) = home_squares(us, wing);
            let rook_file = match wing {
                CastleWing::Kingside => 5,
                CastleWing::Queenside => 3,
            };
            if let Some(rook_to) = Square::from_coords(rook_file, us.back_rank() as i8) {
                next.remove(rook_home);
                next.put(rook_to, Piece::new(PieceType::Rook, us));
            }
        }
        MoveKind::Normal | MoveKind::DoublePush => {}
    }

    if m.piece == PieceType::King {
        next.set_king_moved(us);
    }
    let rights = next.castling_mut();
    if m.piece == PieceType::King {
        rights.remove_side(us);
    }
    for side in [us, them] {
        for wing in [CastleWing::Kingside, CastleWing::Queenside] {
            let (_, rook_home) = home_squares(side, wing);
            if m.from == rook_home || m.to == rook_home {
                rights.remove(side, wing);
            }
        }
    }

    next.set_en_passant(match m.kind {
        MoveKind::DoublePush => m.from.offset(0, us.pawn_direction()),
        _ => None,
    });

    next.finish_turn(m.piece == PieceType::Pawn || m.is_capture());
    next
}
