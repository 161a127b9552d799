//! Attack patterns for every piece type.
//!
//! Knight, king and pawn attacks are precomputed at compile time from offset
//! tables. Sliding attacks walk the direction tables until the first occupied
//! square, which is included.

use crate::Bitboard;
use chess_core::{Side, Square};

/// (file, rank) steps of a knight.
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// (file, rank) steps of a king, which are also the queen's directions.
const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub(crate) const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub(crate) const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_OFFSETS);
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_OFFSETS);

/// Pawn capture targets, indexed [side][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(-1, 1), (1, 1)]),
    leaper_table(&[(-1, -1), (1, -1)]),
];

const fn leaper_table(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut index = 0u8;
    while index < 64 {
        let mut bits = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let (file_step, rank_step) = offsets[i];
            let file = (index % 8) as i8 + file_step;
            let rank = (index / 8) as i8 + rank_step;
            if let Some(target) = Square::from_coords(file, rank) {
                bits |= target.bitboard();
            }
            i += 1;
        }
        table[index as usize] = Bitboard(bits);
        index += 1;
    }
    table
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Squares a pawn of `side` standing on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, side: Side) -> Bitboard {
    PAWN_ATTACKS[side.index()][sq.index() as usize]
}

fn ray_attacks(sq: Square, occupied: Bitboard, directions: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(file_step, rank_step) in directions {
        let mut current = sq;
        while let Some(next) = current.offset(file_step, rank_step) {
            attacks.set(next);
            if occupied.contains(next) {
                break;
            }
            current = next;
        }
    }
    attacks
}

pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, &DIAGONAL)
}

pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, &ORTHOGONAL)
}

pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn knight_attack_counts() {
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(sq("b1")).count(), 3);
        assert_eq!(knight_attacks(sq("e4")).count(), 8);
        assert!(knight_attacks(Square::G1).contains(sq("f3")));
    }

    #[test]
    fn king_attack_counts() {
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(Square::E1).count(), 5);
        assert_eq!(king_attacks(sq("e4")).count(), 8);
    }

    #[test]
    fn pawn_attacks_by_side() {
        let white = pawn_attacks(sq("e4"), Side::White);
        assert!(white.contains(sq("d5")) && white.contains(sq("f5")));
        let black = pawn_attacks(sq("a5"), Side::Black);
        assert_eq!(black, Bitboard::from_square(sq("b4")));
    }

    #[test]
    fn sliders_stop_at_first_blocker() {
        let occupied = Bitboard::from_squares(&[sq("d4"), sq("f6")]);
        let rook = rook_attacks(sq("d1"), occupied);
        assert!(rook.contains(sq("d4")));
        assert!(!rook.contains(sq("d5")));
        assert_eq!(rook.count(), 3 + 7);

        let bishop = bishop_attacks(sq("d4"), occupied);
        assert!(bishop.contains(sq("f6")));
        assert!(!bishop.contains(sq("g7")));
    }

    #[test]
    fn queen_on_empty_board() {
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
    }
}
