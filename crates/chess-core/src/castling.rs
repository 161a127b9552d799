//! Castling rights.

use crate::{CastleWing, Side};

/// The four castling-rights flags.
///
/// A flag stays set only while neither the king nor the matching rook has
/// left its original square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const fn bit(side: Side, wing: CastleWing) -> u8 {
        match (side, wing) {
            (Side::White, CastleWing::Kingside) => 0b0001,
            (Side::White, CastleWing::Queenside) => 0b0010,
            (Side::Black, CastleWing::Kingside) => 0b0100,
            (Side::Black, CastleWing::Queenside) => 0b1000,
        }
    }

    #[inline]
    pub const fn has(self, side: Side, wing: CastleWing) -> bool {
        self.0 & Self::bit(side, wing) != 0
    }

    /// Returns true if the side keeps at least one castling right.
    #[inline]
    pub const fn has_any(self, side: Side) -> bool {
        self.has(side, CastleWing::Kingside) || self.has(side, CastleWing::Queenside)
    }

    #[inline]
    pub fn insert(&mut self, side: Side, wing: CastleWing) {
        self.0 |= Self::bit(side, wing);
    }

    #[inline]
    pub fn remove(&mut self, side: Side, wing: CastleWing) {
        self.0 &= !Self::bit(side, wing);
    }

    /// Clears both rights of a side.
    #[inline]
    pub fn remove_side(&mut self, side: Side) {
        self.remove(side, CastleWing::Kingside);
        self.remove(side, CastleWing::Queenside);
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses the FEN castling field ("KQkq", "Kq", "-").
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            let (side, wing) = match c {
                'K' => (Side::White, CastleWing::Kingside),
                'Q' => (Side::White, CastleWing::Queenside),
                'k' => (Side::Black, CastleWing::Kingside),
                'q' => (Side::Black, CastleWing::Queenside),
                _ => return None,
            };
            rights.insert(side, wing);
        }
        Some(rights)
    }

    /// Renders the FEN castling field.
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        [
            (Side::White, CastleWing::Kingside, 'K'),
            (Side::White, CastleWing::Queenside, 'Q'),
            (Side::Black, CastleWing::Kingside, 'k'),
            (Side::Black, CastleWing::Queenside, 'q'),
        ]
        .iter()
        .filter(|(side, wing, _)| self.has(*side, *wing))
        .map(|(_, _, c)| *c)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_single_wing() {
        let mut rights = CastlingRights::ALL;
        rights.remove(Side::White, CastleWing::Kingside);
        assert!(!rights.has(Side::White, CastleWing::Kingside));
        assert!(rights.has(Side::White, CastleWing::Queenside));
        assert!(rights.has_any(Side::White));
    }

    #[test]
    fn remove_side() {
        let mut rights = CastlingRights::ALL;
        rights.remove_side(Side::Black);
        assert!(!rights.has_any(Side::Black));
        assert!(rights.has(Side::White, CastleWing::Kingside));
    }

    #[test]
    fn fen_field() {
        assert_eq!(CastlingRights::from_fen("KQkq"), Some(CastlingRights::ALL));
        assert_eq!(CastlingRights::from_fen("-"), Some(CastlingRights::NONE));
        assert_eq!(CastlingRights::from_fen("Kx"), None);
        assert_eq!(CastlingRights::from_fen("").map(|r| r.to_fen()), None);

        let rights = CastlingRights::from_fen("Kq").unwrap();
        assert_eq!(rights.to_fen(), "Kq");
        assert_eq!(CastlingRights::NONE.to_fen(), "-");
    }
}
