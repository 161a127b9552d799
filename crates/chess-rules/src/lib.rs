//! Chess rules on a bitboard position.
//!
//! This crate provides:
//! - [`Position`] - board state with castling rights, en passant and clocks
//! - [`RuleSet`] / [`StandardChess`] - move generation, validation and status
//! - [`Game`] - the game state machine with move record, undo and result
//! - [`san`] - Standard Algebraic Notation in both directions
//! - [`pgn`] - saving and loading games as PGN
//!
//! # Example
//!
//! ```
//! use chess_core::CoordMove;
//! use chess_rules::{Game, GameResult};
//!
//! let mut game = Game::new();
//! for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     game.apply_move(CoordMove::from_uci(uci).unwrap()).unwrap();
//! }
//! assert_eq!(game.result(), GameResult::CheckmateBy(chess_core::Side::Black));
//! ```

mod bitboard;
mod game;
pub mod movegen;
pub mod pgn;
mod position;
pub mod rules;
pub mod san;

pub use bitboard::Bitboard;
pub use game::{Game, GameError, PlayedMove};
pub use movegen::{is_in_check, is_square_attacked, make_move, MoveList};
pub use pgn::{PgnError, PgnGame, PgnTags, PlayerType};
pub use position::{home_squares, Position, PositionError};
pub use rules::{CastlingError, GameResult, InvalidMove, RuleSet, StandardChess};
pub use san::{move_to_san, san_to_move, SanError};
