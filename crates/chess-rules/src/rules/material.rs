//! Insufficient-material detection.

use crate::{Bitboard, Position};
use chess_core::{PieceType, Side};

/// Minor pieces a side holds once pawns, rooks and queens are gone.
struct Minors {
    knights: u32,
    bishops: Bitboard,
}

impl Minors {
    fn of(position: &Position, side: Side) -> Self {
        Minors {
            knights: position.pieces_of(PieceType::Knight, side).count(),
            bishops: position.pieces_of(PieceType::Bishop, side),
        }
    }

    fn is_bare_king(&self) -> bool {
        self.knights == 0 && self.bishops.is_empty()
    }

    /// A lone knight, or bishops that all stand on one square colour.
    fn cannot_force_mate(&self) -> bool {
        (self.bishops.is_empty() && self.knights <= 1)
            || (self.knights == 0 && single_colour(self.bishops))
    }
}

fn single_colour(bishops: Bitboard) -> bool {
    (bishops & Bitboard::LIGHT_SQUARES).is_empty() || (bishops & !Bitboard::LIGHT_SQUARES).is_empty()
}

/// Returns true if neither side retains mating material.
///
/// With no pawns, rooks or queens on the board the game is drawn when:
/// both sides have only bishops, all on squares of one colour; or one side
/// has a bare king and the other has at most a single knight, or only
/// bishops of a single colour.
pub fn is_insufficient_material(position: &Position) -> bool {
    let heavy = [PieceType::Pawn, PieceType::Rook, PieceType::Queen]
        .into_iter()
        .any(|kind| {
            Side::ALL
                .into_iter()
                .any(|side| position.pieces_of(kind, side).is_not_empty())
        });
    if heavy {
        return false;
    }

    let white = Minors::of(position, Side::White);
    let black = Minors::of(position, Side::Black);

    if white.knights == 0 && black.knights == 0 && single_colour(white.bishops | black.bishops) {
        return true;
    }

    (black.is_bare_king() && white.cannot_force_mate())
        || (white.is_bare_king() && black.cannot_force_mate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insufficient(fen: &str) -> bool {
        is_insufficient_material(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn bare_kings() {
        assert!(insufficient("4k3/8/8/8/8/8/8/4K3 w - - 0 1"));
    }

    #[test]
    fn single_minor_piece() {
        assert!(insufficient("4k3/8/8/8/8/8/8/4KN2 w - - 0 1"));
        assert!(insufficient("4k3/8/8/8/8/8/8/4KB2 w - - 0 1"));
        assert!(insufficient("4kb2/8/8/8/8/8/8/4K3 w - - 0 1"));
    }

    #[test]
    fn same_coloured_bishops() {
        // f1 and c8 are both light squares.
        assert!(insufficient("2b1k3/8/8/8/8/8/8/4KB2 w - - 0 1"));
        // c1 and f1 are opposite colours.
        assert!(!insufficient("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1"));
        // f1 and f8 are opposite colours.
        assert!(!insufficient("4kb2/8/8/8/8/8/8/4KB2 w - - 0 1"));
    }

    #[test]
    fn knights_can_still_mate_with_help() {
        assert!(!insufficient("4k3/8/8/8/8/8/8/3NKN2 w - - 0 1"));
        assert!(!insufficient("4kn2/8/8/8/8/8/8/4KN2 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/3NKB2 w - - 0 1"));
    }

    #[test]
    fn heavy_material_is_sufficient() {
        assert!(!insufficient("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/4KR2 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/3QK3 w - - 0 1"));
    }
}
