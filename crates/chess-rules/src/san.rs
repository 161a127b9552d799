//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "Qh4#".

use crate::movegen::make_move;
use crate::rules::{RuleSet, StandardChess};
use crate::Position;
use chess_core::{File, Move, PieceType, Rank, Square};
use thiserror::Error;

/// Errors from SAN parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("empty move")]
    Empty,

    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),

    #[error("no legal move matches {0}")]
    NoMatchingMove(String),

    #[error("ambiguous move {0}")]
    AmbiguousMove(String),
}

/// Renders a legal move in SAN, including the check or mate suffix.
///
/// `position` is the state before the move.
pub fn move_to_san(position: &Position, m: &Move) -> String {
    let mut san = String::new();

    if let Some(wing) = m.castle_wing() {
        san.push_str(wing.san());
    } else {
        match m.piece.san_letter() {
            Some(letter) => {
                san.push(letter);
                san.push_str(&disambiguation(position, m));
            }
            None if m.is_capture() => san.push(m.from.file().to_char()),
            None => {}
        }
        if m.is_capture() {
            san.push('x');
        }
        san.push_str(&m.to.to_algebraic());
        if let Some(letter) = m.promotion.and_then(PieceType::san_letter) {
            san.push('=');
            san.push(letter);
        }
    }

    let after = make_move(position, m);
    if StandardChess.is_check(&after) {
        san.push(if StandardChess.legal_moves(&after).is_empty() {
            '#'
        } else {
            '+'
        });
    }
    san
}

fn disambiguation(position: &Position, m: &Move) -> String {
    let rivals: Vec<Square> = StandardChess
        .legal_moves(position)
        .iter()
        .filter(|other| other.piece == m.piece && other.to == m.to && other.from != m.from)
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != m.from.file()) {
        m.from.file().to_char().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != m.from.rank()) {
        m.from.rank().to_char().to_string()
    } else {
        m.from.to_algebraic()
    }
}

/// Parsed pieces of a non-castling SAN token.
#[derive(Debug)]
struct ParsedSan {
    piece: PieceType,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<PieceType>,
}

/// Finds the legal move a SAN token denotes.
///
/// Check and mate suffixes and annotation glyphs ("!", "?") are ignored.
/// Castling accepts both letter O and digit zero spellings.
pub fn san_to_move(position: &Position, san: &str) -> Result<Move, SanError> {
    let token = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if token.is_empty() {
        return Err(SanError::Empty);
    }

    let legal = StandardChess.legal_moves(position);

    let castle = match token {
        "O-O" | "0-0" => Some("O-O"),
        "O-O-O" | "0-0-0" => Some("O-O-O"),
        _ => None,
    };
    if let Some(castle) = castle {
        return legal
            .iter()
            .copied()
            .find(|m| m.castle_wing().is_some_and(|w| w.san() == castle))
            .ok_or_else(|| SanError::NoMatchingMove(san.to_string()));
    }

    let parsed = parse_components(token)?;
    let matching: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|m| {
            !m.is_castle()
                && m.piece == parsed.piece
                && m.to == parsed.to
                && m.promotion == parsed.promotion
                && parsed.from_file.map_or(true, |f| m.from.file() == f)
                && parsed.from_rank.map_or(true, |r| m.from.rank() == r)
        })
        .collect();

    match matching.as_slice() {
        [] => Err(SanError::NoMatchingMove(san.to_string())),
        [m] => Ok(*m),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

fn parse_components(token: &str) -> Result<ParsedSan, SanError> {
    let invalid = || SanError::InvalidFormat(token.to_string());
    let mut chars: Vec<char> = token.chars().filter(|c| *c != 'x' && *c != '-').collect();

    let piece = match chars.first() {
        Some(c) if c.is_ascii_uppercase() => {
            let piece = PieceType::from_char(*c)
                .filter(|p| *p != PieceType::Pawn)
                .ok_or_else(invalid)?;
            chars.remove(0);
            piece
        }
        _ => PieceType::Pawn,
    };

    let promotion = match chars.last() {
        Some(c) if c.is_ascii_uppercase() => {
            let promo = PieceType::from_char(*c)
                .filter(|p| p.is_promotion_target())
                .ok_or_else(invalid)?;
            chars.pop();
            if chars.last() == Some(&'=') {
                chars.pop();
            }
            Some(promo)
        }
        _ => None,
    };

    if chars.len() < 2 {
        return Err(invalid());
    }
    let split = chars.len() - 2;
    let to = File::from_char(chars[split])
        .zip(Rank::from_char(chars[split + 1]))
        .map(|(file, rank)| Square::new(file, rank))
        .ok_or_else(invalid)?;

    let (from_file, from_rank) = match &chars[..split] {
        [] => (None, None),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(file), _) => (Some(file), None),
            (None, Some(rank)) => (None, Some(rank)),
            (None, None) => return Err(invalid()),
        },
        [f, r] => (
            Some(File::from_char(*f).ok_or_else(invalid)?),
            Some(Rank::from_char(*r).ok_or_else(invalid)?),
        ),
        _ => return Err(invalid()),
    };

    Ok(ParsedSan {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
    })
}
