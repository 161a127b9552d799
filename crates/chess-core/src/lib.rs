//! Core value types for chess.
//!
//! This crate provides the plain data shared by the rules crate, the engine
//! protocol and the game controller:
//! - [`Side`], [`PieceType`] and [`Piece`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`CoordMove`] for unvalidated coordinate-notation input and [`Move`] for
//!   fully described, validated moves
//! - [`CastlingRights`] and FEN parsing and serialization via [`Fen`]

mod castling;
mod fen;
mod mov;
mod piece;
mod side;
mod square;

pub use castling::CastlingRights;
pub use fen::{Fen, FenError};
pub use mov::{CastleWing, CoordMove, Move, MoveKind};
pub use piece::{Piece, PieceType};
pub use side::Side;
pub use square::{File, Rank, Square};
