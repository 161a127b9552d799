//! chess-play - play chess in the terminal.
//!
//! Reads commands from stdin while the engine, if enabled, thinks in the
//! background. The board and the controller's events are printed to stdout;
//! logs go to stderr.

mod input;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use engine_session::{EngineConfig, SessionEvent};
use game_controller::{ComputerSide, Config, ControllerEvent, GameController};
use input::{UserCommand, HELP};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Clone, Copy, ValueEnum)]
enum ComputerArg {
    White,
    Black,
    None,
}

impl From<ComputerArg> for ComputerSide {
    fn from(arg: ComputerArg) -> Self {
        match arg {
            ComputerArg::White => ComputerSide::White,
            ComputerArg::Black => ComputerSide::Black,
            ComputerArg::None => ComputerSide::None,
        }
    }
}

/// Play chess in the terminal against a human or a UCI engine.
#[derive(Parser)]
#[command(name = "chess-play")]
#[command(about = "Play chess in the terminal against a human or a UCI engine")]
struct Args {
    /// Configuration file [default: chess-play.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine program, overriding the configuration
    #[arg(long)]
    engine: Option<String>,

    /// Side played by the engine
    #[arg(long, value_enum)]
    computer: Option<ComputerArg>,

    /// Engine search depth
    #[arg(long)]
    depth: Option<u32>,

    /// PGN file to resume
    #[arg(long)]
    load: Option<PathBuf>,

    /// Log level for stderr output
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

enum Input {
    Engine(SessionEvent),
    Line(Option<String>),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(engine) = args.engine {
        config.engine.command = engine;
    }
    if let Some(depth) = args.depth {
        config.engine.depth = depth;
        config.engine.movetime_ms = None;
    }
    if let Some(computer) = args.computer {
        config.game.computer_side = computer.into();
    }
    tracing::info!("Configuration: {:?}", config);
    let engine_config = config.engine.to_engine_config();

    let (mut controller, mut events) = GameController::new();
    controller.set_player_names(config.game.white_name.clone(), config.game.black_name.clone());
    controller.set_event_name(config.game.event.clone());

    if let Some(side) = config.game.computer_side.side() {
        if let Err(e) = controller.enable_computer(side, engine_config.clone()).await {
            println!("Playing without an engine: {}", e);
        }
    }
    if let Some(path) = &args.load {
        controller
            .load(path)
            .await
            .with_context(|| format!("cannot resume {}", path.display()))?;
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_events(&mut events);
        if !controller.is_engine_turn() {
            print_prompt(&controller);
        }

        let input = tokio::select! {
            event = controller.next_engine_event() => Input::Engine(event),
            line = lines.next_line() => Input::Line(line.context("cannot read stdin")?),
        };

        let line = match input {
            Input::Engine(event) => {
                controller.handle_engine_event(event).await;
                continue;
            }
            Input::Line(None) => break,
            Input::Line(Some(line)) => line,
        };

        let command = match UserCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if !run_command(&mut controller, &engine_config, command).await {
            break;
        }
    }

    controller.disable_computer().await;
    Ok(())
}

/// Runs one command. Returns `false` when the user quits.
async fn run_command(
    controller: &mut GameController,
    engine_config: &EngineConfig,
    command: UserCommand,
) -> bool {
    let result = match command {
        // Rejections are reported through the event stream.
        UserCommand::Move(text) => {
            let _ = controller.submit_human_move(&text);
            Ok(())
        }
        UserCommand::Undo => controller.undo(),
        UserCommand::Resign => controller.resign(),
        UserCommand::Draw => controller.agree_draw(),
        UserCommand::New => {
            controller.new_game().await;
            Ok(())
        }
        UserCommand::Save(path) => controller.save(&path).map(|()| {
            println!("Saved to {}", path.display());
        }),
        UserCommand::Load(path) => controller.load(&path).await,
        UserCommand::Engine(Some(side)) => controller
            .enable_computer(side, engine_config.clone())
            .await
            .map(|()| println!("Engine plays {}", side)),
        UserCommand::Engine(None) => {
            controller.disable_computer().await;
            println!("Engine off");
            Ok(())
        }
        UserCommand::Board => {
            println!("{}", controller.game().position());
            Ok(())
        }
        UserCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        UserCommand::Quit => return false,
        UserCommand::Nothing => Ok(()),
    };
    if let Err(e) = result {
        println!("{}", e);
    }
    true
}

fn print_events(events: &mut UnboundedReceiver<ControllerEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            ControllerEvent::PositionChanged(position) => println!("\n{}", position),
            ControllerEvent::MoveRejected(reason) => println!("Move rejected: {}", reason),
            ControllerEvent::GameEnded(result) => println!("Game over: {}", result),
            ControllerEvent::EngineFaulted(reason) => {
                println!("Engine disabled: {}", reason)
            }
        }
    }
}

fn print_prompt(controller: &GameController) {
    use std::io::Write;

    let game = controller.game();
    if let Some(last) = game.record().last() {
        println!("Last move: {}", last.san);
    }
    if game.is_active() {
        let check = if game.is_check() { " (check)" } else { "" };
        print!("{}{}> ", game.side_to_move(), check);
    } else {
        print!("{}> ", game.result());
    }
    let _ = std::io::stdout().flush();
}

