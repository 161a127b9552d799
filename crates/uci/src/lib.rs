//! UCI (Universal Chess Interface) line protocol.
//!
//! Both directions are covered so the same types serve a GUI talking to an
//! engine and an engine answering a GUI:
//!
//! - [`GuiCommand`] - `uci`, `isready`, `ucinewgame`, `position`, `go`,
//!   `stop`, `quit`
//! - [`EngineMessage`] - `id`, `uciok`, `readyok`, `bestmove`, `info`,
//!   `option`
//!
//! Each type can be rendered with `to_uci` and parsed from a single line.

mod command;
mod message;

pub use command::{GoOptions, GuiCommand, PositionSpec};
pub use message::EngineMessage;

use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Blocking engine side of the protocol, for writing bots.
pub struct UciEngine<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> UciEngine<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consumes the engine, returning its reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Read and parse the next command from the GUI.
    ///
    /// Returns `Ok(None)` once the input is closed.
    pub fn read_command(&mut self) -> Result<Option<GuiCommand>, UciError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        GuiCommand::parse(&line).map(Some)
    }

    /// Send a message to the GUI.
    pub fn send(&mut self, msg: &EngineMessage) -> Result<(), UciError> {
        writeln!(self.writer, "{}", msg.to_uci())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Send engine identification followed by `uciok`.
    pub fn send_handshake(&mut self, name: &str, author: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::IdName(name.to_string()))?;
        self.send(&EngineMessage::IdAuthor(author.to_string()))?;
        self.send(&EngineMessage::UciOk)
    }

    pub fn send_readyok(&mut self) -> Result<(), UciError> {
        self.send(&EngineMessage::ReadyOk)
    }

    pub fn send_bestmove(&mut self, mv: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::BestMove {
            mv: mv.to_string(),
            ponder: None,
        })
    }
}

/// Create a UCI engine using stdin/stdout.
pub fn stdio_engine() -> UciEngine<std::io::StdinLock<'static>, std::io::Stdout> {
    UciEngine::new(std::io::stdin().lock(), std::io::stdout())
}
