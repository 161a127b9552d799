//! An in-process engine driven by a script, for tests.
//!
//! The script sees every line the session writes and returns the lines to
//! answer with, or `None` to hang up as if the process died.

use crate::{EngineConfig, EngineSession};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Lines the scripted engine has received, in order.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push(line);
        }
    }
}

/// Starts a session whose engine is the given script.
pub fn scripted_session<F>(config: EngineConfig, mut script: F) -> (EngineSession, Transcript)
where
    F: FnMut(&str) -> Option<Vec<String>> + Send + 'static,
{
    let (session_side, engine_side) = tokio::io::duplex(64 * 1024);
    let (session_read, session_write) = tokio::io::split(session_side);
    let (engine_read, mut engine_write) = tokio::io::split(engine_side);
    let transcript = Transcript::default();

    let seen = transcript.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(engine_read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            seen.push(line.clone());
            let Some(replies) = script(&line) else {
                return;
            };
            for reply in replies {
                if engine_write.write_all(format!("{reply}\n").as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    });

    let session = EngineSession::from_transport(session_read, session_write, config);
    (session, transcript)
}

/// Answers the handshake like a conforming engine and delegates `go` to
/// `on_go`, which receives the last `position` line.
pub fn uci_script<G>(mut on_go: G) -> impl FnMut(&str) -> Option<Vec<String>> + Send + 'static
where
    G: FnMut(&str) -> Vec<String> + Send + 'static,
{
    let mut position = String::new();
    move |line: &str| {
        let replies = match line.split_whitespace().next() {
            Some("uci") => vec![
                "id name Scripted".to_string(),
                "id author tests".to_string(),
                "option name Hash type spin default 16 min 1 max 1024".to_string(),
                "uciok".to_string(),
            ],
            Some("isready") => vec!["readyok".to_string()],
            Some("position") => {
                position = line.to_string();
                Vec::new()
            }
            Some("go") => on_go(&position),
            Some("quit") => return None,
            _ => Vec::new(),
        };
        Some(replies)
    }
}
