//! Move representation.
//!
//! [`CoordMove`] is what a human or an engine proposes: two squares and an
//! optional promotion piece, not yet checked against any position. [`Move`]
//! is the fully described result of validating a proposal.

use crate::{PieceType, Square};
use std::fmt;

/// Which rook a castling move uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleWing {
    Kingside,
    Queenside,
}

impl CastleWing {
    /// Returns the SAN spelling of this castle.
    pub const fn san(self) -> &'static str {
        match self {
            CastleWing::Kingside => "O-O",
            CastleWing::Queenside => "O-O-O",
        }
    }
}

/// Special handling a move needs when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Plain move or capture, including promotions.
    Normal,
    /// Pawn advancing two squares from its starting rank.
    DoublePush,
    /// King move of two squares together with the rook.
    Castle(CastleWing),
    /// Pawn capture onto the en passant target square.
    EnPassant,
}

/// An unvalidated move in coordinate notation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl CoordMove {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        CoordMove {
            from,
            to,
            promotion: None,
        }
    }

    #[inline]
    pub const fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        CoordMove {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Parses coordinate notation such as "e2e4" or "e7e8q".
    ///
    /// Only the syntax is checked here; whether the move is legal depends on
    /// a position.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => {
                let piece = PieceType::from_char(c)?;
                if !piece.is_promotion_target() {
                    return None;
                }
                Some(piece)
            }
        };
        Some(CoordMove {
            from,
            to,
            promotion,
        })
    }

    /// Returns the coordinate notation for this move.
    pub fn to_uci(self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p.to_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Debug for CoordMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoordMove({})", self.to_uci())
    }
}

impl fmt::Display for CoordMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// A fully described move.
///
/// Built by the move generator; carries everything needed to apply it to the
/// position it was generated from and to render it in SAN.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceType,
    pub captured: Option<PieceType>,
    pub promotion: Option<PieceType>,
    pub kind: MoveKind,
}

impl Move {
    /// Creates a move without capture or promotion.
    pub const fn quiet(from: Square, to: Square, piece: PieceType) -> Self {
        Move {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            kind: MoveKind::Normal,
        }
    }

    #[inline]
    pub const fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::Castle(_))
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns the castle wing if this is a castling move.
    #[inline]
    pub const fn castle_wing(&self) -> Option<CastleWing> {
        match self.kind {
            MoveKind::Castle(wing) => Some(wing),
            _ => None,
        }
    }

    /// Strips the move back to its coordinate form.
    #[inline]
    pub const fn coord(&self) -> CoordMove {
        CoordMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    /// Returns the coordinate notation for this move (e.g. "e2e4", "e7e8q").
    pub fn to_uci(&self) -> String {
        self.coord().to_uci()
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {:?}", self.to_uci(), self.piece)?;
        if let Some(captured) = self.captured {
            write!(f, " x{:?}", captured)?;
        }
        if self.kind != MoveKind::Normal {
            write!(f, " {:?}", self.kind)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn coord_from_uci() {
        let m = CoordMove::from_uci("e2e4").unwrap();
        assert_eq!(m.from, Square::new(File::E, Rank::R2));
        assert_eq!(m.to, Square::new(File::E, Rank::R4));
        assert_eq!(m.promotion, None);

        let promo = CoordMove::from_uci("e7e8q").unwrap();
        assert_eq!(promo.promotion, Some(PieceType::Queen));
        assert_eq!(promo.to_uci(), "e7e8q");
    }

    #[test]
    fn coord_from_uci_rejects_garbage() {
        assert!(CoordMove::from_uci("").is_none());
        assert!(CoordMove::from_uci("e2").is_none());
        assert!(CoordMove::from_uci("e2e9").is_none());
        assert!(CoordMove::from_uci("e7e8k").is_none());
        assert!(CoordMove::from_uci("e7e8p").is_none());
        assert!(CoordMove::from_uci("e7e8qq").is_none());
        assert!(CoordMove::from_uci("é2e4").is_none());
    }

    #[test]
    fn move_flags() {
        let castle = Move {
            kind: MoveKind::Castle(CastleWing::Kingside),
            ..Move::quiet(Square::E1, Square::G1, PieceType::King)
        };
        assert!(castle.is_castle());
        assert!(!castle.is_en_passant());
        assert_eq!(castle.castle_wing(), Some(CastleWing::Kingside));

        let ep = Move {
            captured: Some(PieceType::Pawn),
            kind: MoveKind::EnPassant,
            ..Move::quiet(sq("e5"), sq("d6"), PieceType::Pawn)
        };
        assert!(ep.is_en_passant());
        assert!(ep.is_capture());
        assert_eq!(ep.to_uci(), "e5d6");
    }

    #[test]
    fn move_coord_keeps_promotion() {
        let m = Move {
            promotion: Some(PieceType::Knight),
            ..Move::quiet(sq("b7"), sq("b8"), PieceType::Pawn)
        };
        assert_eq!(m.coord(), CoordMove::with_promotion(sq("b7"), sq("b8"), PieceType::Knight));
        assert_eq!(m.to_string(), "b7b8n");
    }
}
