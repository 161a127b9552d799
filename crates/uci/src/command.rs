//! GUI to engine commands.

use crate::UciError;
use std::fmt::Write;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// The next position belongs to a different game.
    UciNewGame,
    /// Set up position.
    Position {
        position: PositionSpec,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
    /// Unknown command (for forward compatibility).
    Unknown(String),
}

/// Base position of a `position` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSpec {
    StartPos,
    Fen(String),
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
    /// White time remaining in milliseconds.
    pub wtime: Option<u64>,
    /// Black time remaining in milliseconds.
    pub btime: Option<u64>,
    /// Search indefinitely until `stop`.
    pub infinite: bool,
}

impl GoOptions {
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }

    pub fn movetime(ms: u64) -> Self {
        Self {
            movetime: Some(ms),
            ..Self::default()
        }
    }
}

impl GuiCommand {
    /// Parse a UCI command line.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        let cmd = parts.next().unwrap_or("");

        match cmd {
            "uci" => Ok(GuiCommand::Uci),
            "isready" => Ok(GuiCommand::IsReady),
            "ucinewgame" => Ok(GuiCommand::UciNewGame),
            "stop" => Ok(GuiCommand::Stop),
            "quit" => Ok(GuiCommand::Quit),
            "position" => Self::parse_position(parts),
            "go" => Self::parse_go(parts),
            _ => Ok(GuiCommand::Unknown(input.to_string())),
        }
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let position = match parts.next() {
            Some("startpos") => {
                match parts.next() {
                    None | Some("moves") => {}
                    Some(other) => {
                        return Err(UciError::ParseError(format!(
                            "Expected 'moves' after 'startpos', got '{}'",
                            other
                        )))
                    }
                }
                PositionSpec::StartPos
            }
            Some("fen") => {
                let fen_parts: Vec<&str> = parts.by_ref().take_while(|&p| p != "moves").collect();
                if fen_parts.is_empty() {
                    return Err(UciError::ParseError("Empty FEN".to_string()));
                }
                PositionSpec::Fen(fen_parts.join(" "))
            }
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "Expected 'startpos' or 'fen', got '{}'",
                    other
                )));
            }
            None => {
                return Err(UciError::ParseError(
                    "Expected 'startpos' or 'fen'".to_string(),
                ));
            }
        };

        let moves = parts.map(str::to_string).collect();
        Ok(GuiCommand::Position { position, moves })
    }

    fn parse_go<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        fn value<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<T, UciError> {
            raw.and_then(|v| v.parse().ok())
                .ok_or_else(|| UciError::ParseError(format!("Bad value for '{}'", name)))
        }

        let mut opts = GoOptions::default();
        while let Some(key) = parts.next() {
            match key {
                "movetime" => opts.movetime = Some(value(key, parts.next())?),
                "depth" => opts.depth = Some(value(key, parts.next())?),
                "wtime" => opts.wtime = Some(value(key, parts.next())?),
                "btime" => opts.btime = Some(value(key, parts.next())?),
                "infinite" => opts.infinite = true,
                _ => {}
            }
        }

        Ok(GuiCommand::Go(opts))
    }

    /// Format the command as a protocol line, without the line terminator.
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
            GuiCommand::Unknown(raw) => raw.clone(),
            GuiCommand::Position { position, moves } => {
                let mut line = match position {
                    PositionSpec::StartPos => "position startpos".to_string(),
                    PositionSpec::Fen(fen) => format!("position fen {}", fen),
                };
                if !moves.is_empty() {
                    line.push_str(" moves");
                    for mv in moves {
                        line.push(' ');
                        line.push_str(mv);
                    }
                }
                line
            }
            GuiCommand::Go(opts) => {
                let mut line = "go".to_string();
                if let Some(d) = opts.depth {
                    let _ = write!(line, " depth {}", d);
                }
                if let Some(t) = opts.movetime {
                    let _ = write!(line, " movetime {}", t);
                }
                if let Some(t) = opts.wtime {
                    let _ = write!(line, " wtime {}", t);
                }
                if let Some(t) = opts.btime {
                    let _ = write!(line, " btime {}", t);
                }
                if opts.infinite {
                    line.push_str(" infinite");
                }
                line
            }
        }
    }
}
