//! Parsing of the commands typed at the prompt.

use chess_core::Side;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Move(String),
    Undo,
    Resign,
    Draw,
    New,
    Save(PathBuf),
    Load(PathBuf),
    /// `None` switches computer play off.
    Engine(Option<Side>),
    Board,
    Help,
    Quit,
    Nothing,
}

pub const HELP: &str = "\
Commands:
  <move>, move <move>   play a move (e2e4, e7e8q, Nf3, O-O)
  undo                  take back a move (a move pair against the engine)
  resign                resign the game
  draw                  agree to a draw
  new                   start a new game
  save <file>           save the game as PGN
  load <file>           load a game from PGN
  engine <white|black|off>
  board                 show the board
  quit";

impl UserCommand {
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(UserCommand::Nothing);
        };
        let rest = words.next();

        let command = match first.to_ascii_lowercase().as_str() {
            "move" | "m" => UserCommand::Move(rest.ok_or(InputError::MissingArgument("move"))?.to_string()),
            "undo" | "u" => UserCommand::Undo,
            "resign" => UserCommand::Resign,
            "draw" => UserCommand::Draw,
            "new" => UserCommand::New,
            "save" => UserCommand::Save(rest.ok_or(InputError::MissingArgument("save"))?.into()),
            "load" => UserCommand::Load(rest.ok_or(InputError::MissingArgument("load"))?.into()),
            "engine" => match rest.map(str::to_ascii_lowercase).as_deref() {
                Some("white") => UserCommand::Engine(Some(Side::White)),
                Some("black") => UserCommand::Engine(Some(Side::Black)),
                Some("off") | Some("none") => UserCommand::Engine(None),
                _ => return Err(InputError::MissingArgument("engine")),
            },
            "board" | "b" => UserCommand::Board,
            "help" | "?" => UserCommand::Help,
            "quit" | "exit" | "q" => UserCommand::Quit,
            _ if rest.is_none() && first.len() >= 2 => UserCommand::Move(first.to_string()),
            _ => return Err(InputError::Unknown(line.trim().to_string())),
        };
        Ok(command)
    }
}
