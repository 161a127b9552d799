//! Engine to GUI messages.

use crate::UciError;

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    IdName(String),
    IdAuthor(String),
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Best move found. The move text is not validated here.
    BestMove { mv: String, ponder: Option<String> },
    /// Search information, kept verbatim after the `info` keyword.
    Info(String),
    /// Option declaration, kept verbatim after the `option` keyword.
    Option(String),
    /// Anything else an engine may print.
    Unknown(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    ///
    /// Unrecognized lines become [`EngineMessage::Unknown`]; only a known
    /// keyword with missing or broken arguments is an error.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword {
            "uciok" => Ok(EngineMessage::UciOk),
            "readyok" => Ok(EngineMessage::ReadyOk),
            "info" => Ok(EngineMessage::Info(rest.to_string())),
            "option" => Ok(EngineMessage::Option(rest.to_string())),
            "id" => match rest.split_once(char::is_whitespace) {
                Some(("name", name)) => Ok(EngineMessage::IdName(name.trim().to_string())),
                Some(("author", author)) => {
                    Ok(EngineMessage::IdAuthor(author.trim().to_string()))
                }
                _ => Err(UciError::ParseError(format!("Bad id line: '{}'", line))),
            },
            "bestmove" => {
                let mut parts = rest.split_whitespace();
                let mv = parts
                    .next()
                    .ok_or_else(|| UciError::ParseError("bestmove without a move".to_string()))?;
                let ponder = match (parts.next(), parts.next()) {
                    (None, _) => None,
                    (Some("ponder"), Some(p)) => Some(p.to_string()),
                    _ => {
                        return Err(UciError::ParseError(format!(
                            "Bad bestmove line: '{}'",
                            line
                        )))
                    }
                };
                Ok(EngineMessage::BestMove {
                    mv: mv.to_string(),
                    ponder,
                })
            }
            _ => Ok(EngineMessage::Unknown(line.to_string())),
        }
    }

    /// Format message for output.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::IdName(name) => format!("id name {}", name),
            EngineMessage::IdAuthor(author) => format!("id author {}", author),
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("bestmove {} ponder {}", mv, p),
                None => format!("bestmove {}", mv),
            },
            EngineMessage::Info(text) => format!("info {}", text),
            EngineMessage::Option(text) => format!("option {}", text),
            EngineMessage::Unknown(raw) => raw.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handshake_lines() {
        assert_eq!(
            EngineMessage::parse("id name Stockfish 16").unwrap(),
            EngineMessage::IdName("Stockfish 16".to_string())
        );
        assert_eq!(
            EngineMessage::parse("id author the Stockfish developers").unwrap(),
            EngineMessage::IdAuthor("the Stockfish developers".to_string())
        );
        assert_eq!(EngineMessage::parse("uciok\r\n").unwrap(), EngineMessage::UciOk);
        assert_eq!(EngineMessage::parse("readyok").unwrap(), EngineMessage::ReadyOk);
    }

    #[test]
    fn parse_bestmove() {
        assert_eq!(
            EngineMessage::parse("bestmove e2e4").unwrap(),
            EngineMessage::BestMove {
                mv: "e2e4".to_string(),
                ponder: None
            }
        );
        assert_eq!(
            EngineMessage::parse("bestmove e7e8q ponder a2a1").unwrap(),
            EngineMessage::BestMove {
                mv: "e7e8q".to_string(),
                ponder: Some("a2a1".to_string())
            }
        );
        assert!(EngineMessage::parse("bestmove").is_err());
        assert!(EngineMessage::parse("bestmove e2e4 garbage").is_err());
    }

    #[test]
    fn informational_lines_are_kept_verbatim() {
        assert_eq!(
            EngineMessage::parse("info depth 3 score cp 20 pv e2e4").unwrap(),
            EngineMessage::Info("depth 3 score cp 20 pv e2e4".to_string())
        );
        assert_eq!(
            EngineMessage::parse("option name Hash type spin default 16").unwrap(),
            EngineMessage::Option("name Hash type spin default 16".to_string())
        );
        assert_eq!(
            EngineMessage::parse("Stockfish by the developers").unwrap(),
            EngineMessage::Unknown("Stockfish by the developers".to_string())
        );
    }

    #[test]
    fn format_round_trips() {
        for msg in [
            EngineMessage::IdName("RandomBot".to_string()),
            EngineMessage::UciOk,
            EngineMessage::BestMove {
                mv: "g1f3".to_string(),
                ponder: Some("g8f6".to_string()),
            },
        ] {
            assert_eq!(EngineMessage::parse(&msg.to_uci()).unwrap(), msg);
        }
    }
}
