//! Chess position representation.

use chess_core::{
    CastleWing, CastlingRights, Fen, FenError, Piece, PieceType, Side, Square,
};
use std::fmt;
use thiserror::Error;

use crate::Bitboard;

/// Errors raised when building a position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    /// The board is well-formed notation but not a playable position.
    #[error("invalid position: {0}")]
    InvariantViolation(String),
}

/// A snapshot of the board and the state needed to continue play.
///
/// Positions are only constructed through [`Position::startpos`] and
/// [`Position::from_fen`], which check that each side has exactly one king,
/// at most sixteen pieces and no pawn on the first or last rank, and that the
/// side not to move is not in check. Applying legal moves preserves those
/// invariants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pieces: [Bitboard; 6],
    sides: [Bitboard; 2],
    side_to_move: Side,
    castling: CastlingRights,
    /// Whether each side's king has left its home square. FEN cannot
    /// express this, so positions read from FEN infer it.
    king_moved: [bool; 2],
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    fn empty() -> Self {
        Position {
            pieces: [Bitboard::EMPTY; 6],
            sides: [Bitboard::EMPTY; 2],
            side_to_move: Side::White,
            castling: CastlingRights::NONE,
            king_moved: [false; 2],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard starting position.
    pub fn startpos() -> Self {
        let mut position = Position::empty();
        let back = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for side in Side::ALL {
            for (file, kind) in back.iter().enumerate() {
                if let Some(sq) = Square::from_coords(file as i8, side.back_rank() as i8) {
                    position.put(sq, Piece::new(*kind, side));
                }
                if let Some(sq) = Square::from_coords(file as i8, side.pawn_rank() as i8) {
                    position.put(sq, Piece::new(PieceType::Pawn, side));
                }
            }
        }
        position.castling = CastlingRights::ALL;
        position
    }

    /// Parses and validates a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Self::from_record(Fen::parse(fen)?)
    }

    /// Builds a position from an already parsed FEN record.
    ///
    /// Castling flags whose king or rook is not on its home square and an en
    /// passant square no pawn could have just crossed are dropped rather than
    /// rejected. A king off its home square, or one at home without rights
    /// while a rook of its side still stands on a home square, counts as
    /// having moved.
    pub fn from_record(record: Fen) -> Result<Self, PositionError> {
        let mut position = Position::empty();
        for sq in Square::all() {
            if let Some(piece) = record.board[sq.index() as usize] {
                position.put(sq, piece);
            }
        }
        position.side_to_move = record.side_to_move;
        position.halfmove_clock = record.halfmove_clock;
        position.fullmove_number = record.fullmove_number;

        position.castling = record.castling;
        for side in Side::ALL {
            for wing in [CastleWing::Kingside, CastleWing::Queenside] {
                let (king, rook) = home_squares(side, wing);
                if position.piece_at(king) != Some(Piece::new(PieceType::King, side))
                    || position.piece_at(rook) != Some(Piece::new(PieceType::Rook, side))
                {
                    position.castling.remove(side, wing);
                }
            }
        }

        for side in Side::ALL {
            let (king_home, _) = home_squares(side, CastleWing::Kingside);
            let rook_home = [CastleWing::Kingside, CastleWing::Queenside]
                .into_iter()
                .any(|wing| {
                    position.piece_at(home_squares(side, wing).1)
                        == Some(Piece::new(PieceType::Rook, side))
                });
            position.king_moved[side.index()] = position.piece_at(king_home)
                != Some(Piece::new(PieceType::King, side))
                || (!position.castling.has_any(side) && rook_home);
        }

        position.en_passant = record
            .en_passant
            .filter(|sq| position.en_passant_is_plausible(*sq));

        position.check_invariants()?;
        Ok(position)
    }

    fn en_passant_is_plausible(&self, target: Square) -> bool {
        let mover = self.side_to_move.opposite();
        let expected_rank = (mover.pawn_rank() as i8 + mover.pawn_direction()) as u8;
        if target.rank().index() != expected_rank || self.piece_at(target).is_some() {
            return false;
        }
        target
            .offset(0, mover.pawn_direction())
            .map_or(false, |sq| {
                self.piece_at(sq) == Some(Piece::new(PieceType::Pawn, mover))
            })
    }

    fn check_invariants(&self) -> Result<(), PositionError> {
        for side in Side::ALL {
            let kings = self.pieces_of(PieceType::King, side).count();
            if kings != 1 {
                return Err(PositionError::InvariantViolation(format!(
                    "{side} has {kings} kings"
                )));
            }
            let count = self.side_pieces(side).count();
            if count > 16 {
                return Err(PositionError::InvariantViolation(format!(
                    "{side} has {count} pieces"
                )));
            }
        }
        if (self.pieces[PieceType::Pawn.index()] & Bitboard::BACK_RANKS).is_not_empty() {
            return Err(PositionError::InvariantViolation(
                "pawn on the first or last rank".to_string(),
            ));
        }
        if crate::movegen::is_in_check(self, self.side_to_move.opposite()) {
            return Err(PositionError::InvariantViolation(format!(
                "{} is in check but it is {}'s turn",
                self.side_to_move.opposite(),
                self.side_to_move
            )));
        }
        Ok(())
    }

    /// Returns the FEN record describing this position.
    pub fn to_record(&self) -> Fen {
        let mut board = [None; 64];
        for sq in Square::all() {
            board[sq.index() as usize] = self.piece_at(sq);
        }
        Fen {
            board,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    pub fn to_fen(&self) -> String {
        self.to_record().to_string()
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the piece on the given square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let side = Side::ALL
            .into_iter()
            .find(|side| self.sides[side.index()].contains(sq))?;
        PieceType::ALL
            .into_iter()
            .find(|kind| self.pieces[kind.index()].contains(sq))
            .map(|kind| Piece::new(kind, side))
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.sides[0] | self.sides[1]
    }

    #[inline]
    pub fn side_pieces(&self, side: Side) -> Bitboard {
        self.sides[side.index()]
    }

    #[inline]
    pub fn pieces_of(&self, kind: PieceType, side: Side) -> Bitboard {
        self.pieces[kind.index()] & self.sides[side.index()]
    }

    /// Returns the square of the side's king.
    #[inline]
    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces_of(PieceType::King, side).first()
    }

    pub(crate) fn put(&mut self, sq: Square, piece: Piece) {
        self.pieces[piece.kind.index()].set(sq);
        self.sides[piece.side.index()].set(sq);
    }

    pub(crate) fn remove(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.piece_at(sq)?;
        self.pieces[piece.kind.index()].clear(sq);
        self.sides[piece.side.index()].clear(sq);
        Some(piece)
    }

    /// Whether `side`'s king has ever left its home square.
    pub fn king_moved(&self, side: Side) -> bool {
        self.king_moved[side.index()]
    }

    pub(crate) fn set_king_moved(&mut self, side: Side) {
        self.king_moved[side.index()] = true;
    }

    pub(crate) fn castling_mut(&mut self) -> &mut CastlingRights {
        &mut self.castling
    }

    pub(crate) fn set_en_passant(&mut self, target: Option<Square>) {
        self.en_passant = target;
    }

    /// Hands the turn to the other side and advances the clocks.
    pub(crate) fn finish_turn(&mut self, reset_halfmove: bool) {
        if reset_halfmove {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.side_to_move == Side::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();
    }
}

/// Home squares of the king and of the rook for a castle.
pub const fn home_squares(side: Side, wing: CastleWing) -> (Square, Square) {
    match (side, wing) {
        (Side::White, CastleWing::Kingside) => (Square::E1, Square::H1),
        (Side::White, CastleWing::Queenside) => (Square::E1, Square::A1),
        (Side::Black, CastleWing::Kingside) => (Square::E8, Square::H8),
        (Side::Black, CastleWing::Queenside) => (Square::E8, Square::A8),
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = Square::from_coords(file, rank)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', |p| p.to_fen_char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
