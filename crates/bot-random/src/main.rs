//! Random move bot - plays a random legal move.
//!
//! The smallest useful UCI engine: it keeps the position sent by the GUI
//! and answers every `go` with a uniformly chosen legal move.

use chess_core::CoordMove;
use chess_rules::{make_move, Position, RuleSet, StandardChess};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::{BufRead, Write};
use uci::{GuiCommand, PositionSpec, UciEngine, UciError};

struct RandomBot<G: Rng> {
    position: Position,
    rng: G,
}

impl<G: Rng> RandomBot<G> {
    fn new(rng: G) -> Self {
        Self {
            position: Position::startpos(),
            rng,
        }
    }

    /// Rebuilds the position from a `position` command. Moves that do not
    /// match a legal move end the replay at the last good position.
    fn set_position(&mut self, spec: PositionSpec, moves: &[String]) {
        let mut position = match spec {
            PositionSpec::StartPos => Position::startpos(),
            PositionSpec::Fen(fen) => match Position::from_fen(&fen) {
                Ok(position) => position,
                Err(e) => {
                    eprintln!("Ignoring bad FEN '{}': {}", fen, e);
                    Position::startpos()
                }
            },
        };

        for text in moves {
            let legal = CoordMove::from_uci(text)
                .and_then(|coord| StandardChess.validate(&position, coord).ok());
            match legal {
                Some(mv) => position = make_move(&position, &mv),
                None => {
                    eprintln!("Ignoring illegal move '{}' and the rest of the line", text);
                    break;
                }
            }
        }
        self.position = position;
    }

    fn choose_move(&mut self) -> Option<String> {
        let legal = StandardChess.legal_moves(&self.position);
        legal.as_slice().choose(&mut self.rng).map(|m| m.to_uci())
    }

    /// Handles one command. Returns `false` once the GUI asked to quit.
    fn handle<R: BufRead, W: Write>(
        &mut self,
        cmd: GuiCommand,
        engine: &mut UciEngine<R, W>,
    ) -> Result<bool, UciError> {
        match cmd {
            GuiCommand::Uci => engine.send_handshake("RandomBot", "chess-play")?,
            GuiCommand::IsReady => engine.send_readyok()?,
            GuiCommand::UciNewGame => self.position = Position::startpos(),
            GuiCommand::Position { position, moves } => self.set_position(position, &moves),
            GuiCommand::Go(_opts) => {
                // No legal moves - game over
                let mv = self.choose_move().unwrap_or_else(|| "0000".to_string());
                engine.send_bestmove(&mv)?;
            }
            // Moves are instant, so there is never a search to stop.
            GuiCommand::Stop => {}
            GuiCommand::Quit => return Ok(false),
            GuiCommand::Unknown(_) => {}
        }
        Ok(true)
    }

    fn run<R: BufRead, W: Write>(&mut self, engine: &mut UciEngine<R, W>) -> Result<(), UciError> {
        loop {
            let cmd = match engine.read_command() {
                Ok(Some(cmd)) => cmd,
                Ok(None) => return Ok(()),
                Err(UciError::IoError(e)) => return Err(UciError::IoError(e)),
                Err(e) => {
                    eprintln!("Error reading command: {}", e);
                    continue;
                }
            };
            if !self.handle(cmd, engine)? {
                return Ok(());
            }
        }
    }
}

fn main() {
    let mut engine = uci::stdio_engine();
    let mut bot = RandomBot::new(StdRng::from_entropy());
    if let Err(e) = bot.run(&mut engine) {
        eprintln!("bot-random: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(input: &str) -> String {
        let mut engine = UciEngine::new(Cursor::new(input.to_string()), Vec::new());
        let mut bot = RandomBot::new(StdRng::seed_from_u64(7));
        bot.run(&mut engine).unwrap();
        let (_, out) = engine.into_parts();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn handshake() {
        let out = session("uci\nisready\nquit\n");
        assert_eq!(out, "id name RandomBot\nid author chess-play\nuciok\nreadyok\n");
    }

    #[test]
    fn plays_a_legal_move() {
        let out = session("position startpos moves e2e4 e7e5\ngo depth 1\n");
        let mv = out.trim().strip_prefix("bestmove ").unwrap();
        let mut position = Position::startpos();
        for text in ["e2e4", "e7e5"] {
            let m = StandardChess
                .validate(&position, CoordMove::from_uci(text).unwrap())
                .unwrap();
            position = make_move(&position, &m);
        }
        assert!(StandardChess
            .validate(&position, CoordMove::from_uci(mv).unwrap())
            .is_ok());
    }

    #[test]
    fn only_move_is_found() {
        let out = session("position fen 7k/8/6K1/8/8/8/8/R7 b - - 0 1\ngo\n");
        assert_eq!(out, "bestmove h8g8\n");
    }

    #[test]
    fn mated_side_answers_null_move() {
        let out = session(
            "position startpos moves f2f3 e7e5 g2g4 d8h4\ngo movetime 10\n",
        );
        assert_eq!(out, "bestmove 0000\n");
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let out = session("position nowhere\nisready\n");
        assert_eq!(out, "readyok\n");
    }
}
