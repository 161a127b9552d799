//! Controller behaviour against scripted in-process engines.

use chess_core::Side;
use chess_rules::pgn::PlayerType;
use chess_rules::{GameResult, InvalidMove, Position};
use engine_session::testing::{scripted_session, uci_script};
use engine_session::{EngineConfig, EngineSession, FaultReason};
use game_controller::{ControllerError, ControllerEvent, GameController, MoveError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// A launcher for an engine that answers every `go` with `on_go(position)`.
fn engine(
    on_go: fn(&str) -> Vec<String>,
) -> impl Fn() -> Result<EngineSession, FaultReason> + Send + 'static {
    move || Ok(scripted_session(EngineConfig::new("scripted"), uci_script(on_go)).0)
}

fn reply(mv: &str) -> Vec<String> {
    vec![format!("bestmove {mv}")]
}

/// Black's replies in a short line: 1. e4 e5 2. Nf3 Nc6.
fn open_game_black(position: &str) -> Vec<String> {
    match position {
        "position startpos moves e2e4" => reply("e7e5"),
        "position startpos moves e2e4 e7e5 g1f3" => reply("b8c6"),
        _ => reply("a7a6"),
    }
}

fn drain(rx: &mut UnboundedReceiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Pumps engine events until the game reaches `plies` moves.
async fn pump_until_plies(controller: &mut GameController, plies: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.game().ply_count() < plies {
            controller.pump().await;
        }
    })
    .await
    .expect("engine did not move in time");
}

fn faults(events: &[ControllerEvent]) -> Vec<&FaultReason> {
    events
        .iter()
        .filter_map(|e| match e {
            ControllerEvent::EngineFaulted(reason) => Some(reason),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn human_game_to_checkmate() {
    let (mut controller, mut rx) = GameController::new();
    for mv in ["f2f3", "e5"] {
        controller.submit_human_move(mv).unwrap();
    }
    controller.submit_human_move("g4").unwrap();
    controller.submit_human_move("Qh4#").unwrap();

    assert_eq!(
        controller.game().result(),
        GameResult::CheckmateBy(Side::Black)
    );
    let events = drain(&mut rx);
    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], ControllerEvent::PositionChanged(_)));
    assert_eq!(
        events[4],
        ControllerEvent::GameEnded(GameResult::CheckmateBy(Side::Black))
    );

    assert!(matches!(
        controller.submit_human_move("a2a3"),
        Err(ControllerError::Move(MoveError::GameOver))
    ));
}

#[tokio::test]
async fn rejected_moves_leave_the_game_unchanged() {
    let (mut controller, mut rx) = GameController::new();

    assert!(controller.submit_human_move("e2e5").is_err());
    assert!(controller.submit_human_move("hello").is_err());
    assert!(controller.submit_human_move("e7e5").is_err());

    assert_eq!(controller.game().ply_count(), 0);
    assert_eq!(
        drain(&mut rx),
        vec![
            ControllerEvent::MoveRejected(MoveError::Rejected(InvalidMove::IllegalShape)),
            ControllerEvent::MoveRejected(MoveError::Unparseable("hello".to_string())),
            ControllerEvent::MoveRejected(MoveError::Rejected(InvalidMove::NotYourPiece)),
        ]
    );
}

#[tokio::test]
async fn human_promotion_defaults_to_queen() {
    let (mut controller, _rx) = GameController::new();
    controller
        .new_game_from(Position::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap())
        .await;
    controller.submit_human_move("a7a8").unwrap();
    assert_eq!(controller.game().record()[0].san, "a8=Q");

    controller
        .new_game_from(Position::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap())
        .await;
    controller.submit_human_move("a7a8n").unwrap();
    assert_eq!(controller.game().record()[0].san, "a8=N");
}

#[tokio::test]
async fn engine_answers_human_moves() {
    let (mut controller, mut rx) = GameController::new();
    controller
        .enable_computer_with(Side::Black, engine(open_game_black))
        .await
        .unwrap();
    assert_eq!(controller.computer_side(), Some(Side::Black));
    assert_eq!(controller.tags().black_type, PlayerType::Program);

    controller.submit_human_move("e4").unwrap();
    assert!(matches!(
        controller.submit_human_move("d7d5"),
        Err(ControllerError::Move(MoveError::NotYourTurn))
    ));
    pump_until_plies(&mut controller, 2).await;

    controller.submit_human_move("Nf3").unwrap();
    pump_until_plies(&mut controller, 4).await;

    let sans: Vec<&str> = controller
        .game()
        .record()
        .iter()
        .map(|p| p.san.as_str())
        .collect();
    assert_eq!(sans, ["e4", "e5", "Nf3", "Nc6"]);
    assert_eq!(controller.tags().black, "Scripted");
    assert!(faults(&drain(&mut rx)).is_empty());
}

#[tokio::test]
async fn engine_moves_first_when_playing_white() {
    let (mut controller, _rx) = GameController::new();
    controller
        .enable_computer_with(Side::White, engine(|_| reply("d2d4")))
        .await
        .unwrap();
    assert!(controller.is_engine_turn());
    pump_until_plies(&mut controller, 1).await;
    assert_eq!(controller.game().record()[0].san, "d4");
    assert!(!controller.is_engine_turn());
}

#[tokio::test]
async fn illegal_engine_move_disables_computer_play() {
    let (mut controller, mut rx) = GameController::new();
    controller
        .enable_computer_with(Side::Black, engine(|_| reply("e7e4")))
        .await
        .unwrap();
    controller.submit_human_move("e2e4").unwrap();
    let before = controller.game().position().clone();

    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.computer_side().is_some() {
            controller.pump().await;
        }
    })
    .await
    .unwrap();

    let events = drain(&mut rx);
    assert_eq!(
        faults(&events),
        [&FaultReason::IllegalMoveProposed("e7e4".to_string())]
    );
    assert!(controller.game().is_active());
    assert_eq!(controller.game().position(), &before);
    assert_eq!(controller.tags().black_type, PlayerType::Human);

    // The human carries on for both sides.
    controller.submit_human_move("e7e5").unwrap();
    assert_eq!(controller.game().ply_count(), 2);
}

#[tokio::test]
async fn engine_promotion_without_piece_is_illegal() {
    let (mut controller, mut rx) = GameController::new();
    controller
        .new_game_from(Position::from_fen("4k3/8/8/8/8/8/p7/4K3 w - - 0 1").unwrap())
        .await;
    controller
        .enable_computer_with(Side::Black, engine(|_| reply("a2a1")))
        .await
        .unwrap();
    controller.submit_human_move("Kd2").unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.computer_side().is_some() {
            controller.pump().await;
        }
    })
    .await
    .unwrap();

    assert_eq!(
        faults(&drain(&mut rx)),
        [&FaultReason::IllegalMoveProposed("a2a1".to_string())]
    );
    assert_eq!(controller.game().ply_count(), 1);
}

#[tokio::test]
async fn crashed_engine_disables_computer_play() {
    let (mut controller, mut rx) = GameController::new();
    controller
        .enable_computer_with(Side::Black, || {
            let mut script = uci_script(|_| Vec::new());
            let session = scripted_session(EngineConfig::new("scripted"), move |line| {
                if line.starts_with("go") {
                    None
                } else {
                    script(line)
                }
            });
            Ok(session.0)
        })
        .await
        .unwrap();
    controller.submit_human_move("e2e4").unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.computer_side().is_some() {
            controller.pump().await;
        }
    })
    .await
    .unwrap();

    assert_eq!(faults(&drain(&mut rx)), [&FaultReason::Crashed]);
    assert!(controller.game().is_active());
    assert_eq!(controller.game().ply_count(), 1);
}

#[tokio::test]
async fn failed_launch_is_reported() {
    let (mut controller, mut rx) = GameController::new();
    let result = controller
        .enable_computer(Side::Black, EngineConfig::new("/nonexistent/engine-binary"))
        .await;
    assert!(matches!(
        result,
        Err(ControllerError::Engine(FaultReason::InitializationFailed(_)))
    ));
    assert_eq!(controller.computer_side(), None);
    assert_eq!(faults(&drain(&mut rx)).len(), 1);
}

#[tokio::test]
async fn undo_takes_back_the_move_pair() {
    let (mut controller, _rx) = GameController::new();
    controller
        .enable_computer_with(Side::Black, engine(open_game_black))
        .await
        .unwrap();
    controller.submit_human_move("e2e4").unwrap();
    pump_until_plies(&mut controller, 2).await;

    controller.undo().unwrap();
    assert_eq!(controller.game().ply_count(), 0);
    assert_eq!(controller.game().side_to_move(), Side::White);
    assert!(!controller.is_engine_turn());
}

#[tokio::test]
async fn undo_while_engine_thinks_discards_its_answer() {
    let gos = Arc::new(AtomicUsize::new(0));
    let counter = gos.clone();
    let (mut controller, _rx) = GameController::new();
    controller
        .enable_computer_with(Side::Black, move || {
            let counter = counter.clone();
            let mut script = uci_script(move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Vec::new()
                } else {
                    reply("d7d5")
                }
            });
            let session = scripted_session(EngineConfig::new("scripted"), move |line| {
                if line == "stop" {
                    Some(reply("e7e5"))
                } else {
                    script(line)
                }
            });
            Ok(session.0)
        })
        .await
        .unwrap();

    controller.submit_human_move("e2e4").unwrap();
    controller.undo().unwrap();
    assert_eq!(controller.game().ply_count(), 0);

    controller.submit_human_move("d2d4").unwrap();
    pump_until_plies(&mut controller, 2).await;

    let sans: Vec<&str> = controller
        .game()
        .record()
        .iter()
        .map(|p| p.san.as_str())
        .collect();
    assert_eq!(sans, ["d4", "d5"]);
    assert_eq!(gos.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn new_game_replaces_a_busy_engine() {
    let launches = Arc::new(AtomicUsize::new(0));
    let counter = launches.clone();
    let (mut controller, _rx) = GameController::new();
    controller
        .enable_computer_with(Side::Black, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(scripted_session(EngineConfig::new("scripted"), uci_script(|_| Vec::new())).0)
        })
        .await
        .unwrap();

    controller.submit_human_move("e2e4").unwrap();
    controller.new_game().await;

    assert_eq!(launches.load(Ordering::SeqCst), 2);
    assert_eq!(controller.game().ply_count(), 0);
    assert_eq!(controller.computer_side(), Some(Side::Black));
    assert!(!controller.is_engine_turn());
}

#[tokio::test]
async fn resign_and_draw_end_the_game() {
    let (mut controller, mut rx) = GameController::new();
    controller.submit_human_move("e2e4").unwrap();
    controller.resign().unwrap();
    assert_eq!(
        controller.game().result(),
        GameResult::Resignation(Side::Black)
    );
    assert!(drain(&mut rx)
        .contains(&ControllerEvent::GameEnded(GameResult::Resignation(Side::Black))));
    assert!(controller.agree_draw().is_err());

    controller.new_game().await;
    controller.agree_draw().unwrap();
    assert_eq!(controller.game().result(), GameResult::DrawAgreement);
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.pgn");

    let (mut controller, _rx) = GameController::new();
    controller.set_player_names("Alice", "Bob");
    for mv in ["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4"] {
        controller.submit_human_move(mv).unwrap();
    }
    controller.save(&path).unwrap();

    let (mut other, mut rx) = GameController::new();
    other.load(&path).await.unwrap();
    assert_eq!(other.game().record(), controller.game().record());
    assert_eq!(other.tags().white, "Alice");
    assert!(matches!(
        drain(&mut rx).first(),
        Some(ControllerEvent::PositionChanged(_))
    ));
}

#[tokio::test]
async fn load_moves_the_engine_to_the_program_side() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.pgn");
    std::fs::write(
        &path,
        "[White \"Engine\"]\n[WhiteType \"program\"]\n\n1. e4 e5 2. Nf3 *\n",
    )
    .unwrap();

    let (mut controller, _rx) = GameController::new();
    controller
        .enable_computer_with(Side::White, engine(open_game_black))
        .await
        .unwrap();
    controller.load(&path).await.unwrap();
    assert_eq!(controller.computer_side(), Some(Side::White));
    assert_eq!(controller.game().side_to_move(), Side::Black);

    std::fs::write(&path, "[BlackType \"program\"]\n\n1. e4 *\n").unwrap();
    controller.load(&path).await.unwrap();
    assert_eq!(controller.computer_side(), Some(Side::Black));
    assert!(controller.is_engine_turn());
}

#[tokio::test]
async fn failed_load_keeps_the_game() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pgn");
    std::fs::write(&path, "[Event \"nothing\"]\n\n*\n").unwrap();

    let (mut controller, _rx) = GameController::new();
    controller.submit_human_move("e2e4").unwrap();
    assert!(matches!(
        controller.load(&path).await,
        Err(ControllerError::Persistence(chess_rules::PgnError::NoGameFound))
    ));
    assert_eq!(controller.game().ply_count(), 1);

    std::fs::write(&path, "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Qxa6\n").unwrap();
    assert!(matches!(
        controller.load(&path).await,
        Err(ControllerError::Persistence(chess_rules::PgnError::CorruptFile { ply: 7, .. }))
    ));
    assert_eq!(controller.game().ply_count(), 1);
}
