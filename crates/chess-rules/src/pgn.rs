//! PGN (Portable Game Notation) save and load for a single game.
//!
//! Saving writes the seven-tag roster, `WhiteType`/`BlackType` for sides
//! played by a program, `SetUp`/`FEN` when the game did not start from the
//! standard position, and SAN movetext wrapped at 80 columns. Loading replays
//! the movetext through the same rules used for interactive play, so a loaded
//! record is position-for-position identical to one played move by move.

use crate::game::Game;
use crate::rules::GameResult;
use crate::Position;
use chess_core::Side;
use chrono::Utc;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// Errors from reading or writing PGN.
#[derive(Debug, Error)]
pub enum PgnError {
    #[error("no game was found in the file")]
    NoGameFound,

    #[error("could not load the game: move {ply} '{token}': {reason}")]
    CorruptFile {
        /// 1-based half-move index of the offending token.
        ply: usize,
        token: String,
        reason: String,
    },

    #[error("could not read the file: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("could not write the file: {0}")]
    WriteFailed(#[source] io::Error),
}

/// Who played a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    #[default]
    Human,
    Program,
}

/// Header tags of a saved game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnTags {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub white_type: PlayerType,
    pub black_type: PlayerType,
}

impl Default for PgnTags {
    fn default() -> Self {
        PgnTags {
            event: "-".to_string(),
            site: "-".to_string(),
            date: Utc::now().format("%Y.%m.%d").to_string(),
            round: "-".to_string(),
            white: "-".to_string(),
            black: "-".to_string(),
            white_type: PlayerType::Human,
            black_type: PlayerType::Human,
        }
    }
}

impl PgnTags {
    pub fn player_type(&self, side: Side) -> PlayerType {
        match side {
            Side::White => self.white_type,
            Side::Black => self.black_type,
        }
    }

    pub fn set_player_type(&mut self, side: Side, player: PlayerType) {
        match side {
            Side::White => self.white_type = player,
            Side::Black => self.black_type = player,
        }
    }
}

/// A game read back from PGN.
#[derive(Debug, Clone)]
pub struct PgnGame {
    pub tags: PgnTags,
    pub game: Game,
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders a game as PGN text.
pub fn to_pgn(game: &Game, tags: &PgnTags) -> String {
    let result = game.result().pgn_token();
    let mut out = String::new();
    let mut tag = |name: &str, value: &str| {
        out.push_str(&format!("[{} \"{}\"]\n", name, escape(value)));
    };
    tag("Event", &tags.event);
    tag("Site", &tags.site);
    tag("Date", &tags.date);
    tag("Round", &tags.round);
    tag("White", &tags.white);
    tag("Black", &tags.black);
    tag("Result", result);
    if tags.white_type == PlayerType::Program {
        tag("WhiteType", "program");
    }
    if tags.black_type == PlayerType::Program {
        tag("BlackType", "program");
    }
    if game.start_position() != &Position::startpos() {
        tag("SetUp", "1");
        tag("FEN", &game.start_position().to_fen());
    }
    out.push('\n');

    let mut tokens = Vec::with_capacity(game.ply_count() * 3 / 2 + 1);
    let mut position = game.start_position();
    for (i, played) in game.record().iter().enumerate() {
        let number = position.fullmove_number();
        match position.side_to_move() {
            Side::White => tokens.push(format!("{number}.")),
            Side::Black if i == 0 => tokens.push(format!("{number}...")),
            Side::Black => {}
        }
        tokens.push(played.san.clone());
        position = &played.position;
    }
    tokens.push(result.to_string());

    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + 1 + token.len() > 80 {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&token);
    }
    out.push_str(&line);
    out.push('\n');
    out
}

/// Writes a game to a PGN file, replacing any existing file.
pub fn save<P: AsRef<Path>>(path: P, game: &Game, tags: &PgnTags) -> Result<(), PgnError> {
    let mut file = fs::File::create(path).map_err(PgnError::WriteFailed)?;
    file.write_all(to_pgn(game, tags).as_bytes())
        .map_err(PgnError::WriteFailed)?;
    file.flush().map_err(PgnError::WriteFailed)
}

/// Reads the first game of a PGN file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PgnGame, PgnError> {
    let text = fs::read_to_string(path).map_err(PgnError::ReadFailed)?;
    parse_pgn(&text)
}

/// Splits PGN text into tag pairs and movetext tokens, dropping comments,
/// variations and numeric annotation glyphs.
fn scan(text: &str) -> (Vec<(String, String)>, Vec<String>) {
    let mut tags = Vec::new();
    let mut tokens = Vec::new();
    let mut in_movetext = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if !in_movetext && trimmed.starts_with('[') {
            if let Some(pair) = parse_tag(trimmed) {
                tags.push(pair);
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        in_movetext = true;
        tokens.push(trimmed.to_string());
    }

    let movetext = tokens.join("\n");
    let mut cleaned = String::with_capacity(movetext.len());
    let mut brace = false;
    let mut line_comment = false;
    let mut variation_depth = 0usize;
    for c in movetext.chars() {
        match c {
            '\n' if line_comment => {
                line_comment = false;
                cleaned.push(' ');
            }
            _ if line_comment => {}
            '}' if brace => {
                brace = false;
                cleaned.push(' ');
            }
            _ if brace => {}
            '{' => brace = true,
            ';' => line_comment = true,
            '(' => variation_depth += 1,
            ')' if variation_depth > 0 => {
                variation_depth -= 1;
                cleaned.push(' ');
            }
            _ if variation_depth > 0 => {}
            _ => cleaned.push(c),
        }
    }

    let tokens = cleaned
        .split_whitespace()
        .filter(|t| !t.starts_with('$'))
        .map(strip_move_number)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    (tags, tokens)
}

fn parse_tag(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    let (name, rest) = inner.split_once(char::is_whitespace)?;
    let quoted = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    let mut value = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(escaped);
            }
        } else {
            value.push(c);
        }
    }
    Some((name.to_string(), value))
}

/// Removes a leading move number such as "12." or "12..." from a token.
fn strip_move_number(token: &str) -> &str {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 && token[digits..].starts_with('.') {
        token[digits..].trim_start_matches('.')
    } else {
        token
    }
}

const TERMINATION_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Parses the first game in PGN text.
pub fn parse_pgn(text: &str) -> Result<PgnGame, PgnError> {
    let (tag_pairs, tokens) = scan(text);

    let mut tags = PgnTags {
        date: "-".to_string(),
        ..PgnTags::default()
    };
    let mut fen = None;
    let mut result_tag = None;
    for (name, value) in tag_pairs {
        match name.as_str() {
            "Event" => tags.event = value,
            "Site" => tags.site = value,
            "Date" => tags.date = value,
            "Round" => tags.round = value,
            "White" => tags.white = value,
            "Black" => tags.black = value,
            "WhiteType" if value.eq_ignore_ascii_case("program") => {
                tags.white_type = PlayerType::Program
            }
            "BlackType" if value.eq_ignore_ascii_case("program") => {
                tags.black_type = PlayerType::Program
            }
            "FEN" => fen = Some(value),
            "Result" => result_tag = Some(value),
            _ => {}
        }
    }

    let mut game = match fen {
        Some(fen) => Game::from_fen(&fen).map_err(|e| PgnError::CorruptFile {
            ply: 0,
            token: fen.clone(),
            reason: e.to_string(),
        })?,
        None => Game::new(),
    };

    let mut termination = None;
    for token in &tokens {
        if TERMINATION_MARKERS.contains(&token.as_str()) {
            termination = Some(token.clone());
            break;
        }
        let ply = game.ply_count() + 1;
        game.apply_san(token)
            .map_err(|e| PgnError::CorruptFile {
                ply,
                token: token.clone(),
                reason: e.to_string(),
            })?;
    }

    if game.ply_count() == 0 {
        return Err(PgnError::NoGameFound);
    }

    if let Some(token) = termination.or(result_tag).filter(|_| game.is_active()) {
        let ended = match GameResult::from_pgn_token(&token) {
            Some(GameResult::Resignation(side)) => game.resign(side),
            Some(GameResult::DrawAgreement) => game.agree_draw(),
            _ => Ok(()),
        };
        ended.map_err(|e| PgnError::CorruptFile {
            ply: game.ply_count(),
            token,
            reason: e.to_string(),
        })?;
    }

    Ok(PgnGame { tags, game })
}

impl GameResult {
    /// Parses a PGN result token for a game that ended without a board
    /// verdict.
    pub fn from_pgn_token(token: &str) -> Option<GameResult> {
        match token {
            "1-0" => Some(GameResult::Resignation(Side::Black)),
            "0-1" => Some(GameResult::Resignation(Side::White)),
            "1/2-1/2" => Some(GameResult::DrawAgreement),
            "*" => Some(GameResult::InProgress),
            _ => None,
        }
    }
}
