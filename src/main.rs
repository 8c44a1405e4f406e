//! Interactive adjudicator: moves come from stdin, and optionally one side
//! is delegated to a spawned UCI engine.

use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};

use arbitro::game::{Game, GameResult, MoveError};
use arbitro::notation::{self, NotationType};
use arbitro::piece::Army;
use arbitro::uci::{EngineError, GoParams, UciEngine};

#[derive(Parser)]
#[command(name = "arbitro", version, about = "Chess legality engine and game adjudicator")]
struct Args {
    /// Start from this FEN instead of the standard array
    #[arg(long)]
    fen: Option<String>,

    /// Play Chess960 from this starting position id (0-959); -1 picks one at random
    #[arg(long, allow_hyphen_values = true)]
    chess960: Option<i32>,

    /// Path to a UCI engine binary that plays one side
    #[arg(long)]
    engine: Option<String>,

    /// Which army the engine plays
    #[arg(long, value_enum, default_value = "black")]
    engine_army: ArmyArg,

    /// Notation used for typed moves and the move echo
    #[arg(long, value_enum, default_value = "standard")]
    notation: NotationArg,

    /// Clock sent to the engine with every go command, in milliseconds
    #[arg(long, default_value_t = 60_000)]
    clock_ms: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum ArmyArg {
    White,
    Black,
}

impl From<ArmyArg> for Army {
    fn from(arg: ArmyArg) -> Army {
        match arg {
            ArmyArg::White => Army::White,
            ArmyArg::Black => Army::Black,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum NotationArg {
    Standard,
    Long,
    Computer,
}

impl From<NotationArg> for NotationType {
    fn from(arg: NotationArg) -> NotationType {
        match arg {
            NotationArg::Standard => NotationType::Standard,
            NotationArg::Long => NotationType::Long,
            NotationArg::Computer => NotationType::Computer,
        }
    }
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut game = match (args.chess960, &args.fen) {
        (Some(id), _) => {
            let id = if id < 0 { None } else { Some(id as u16) };
            Game::new_chess960(id).ok_or("chess960 id must be in 0..960")?
        }
        (None, Some(fen)) => Game::from_fen(fen)?,
        (None, None) => Game::new(),
    };
    let notation = NotationType::from(args.notation);

    let mut engine = match &args.engine {
        Some(path) => {
            let mut engine = UciEngine::spawn(path)?;
            engine.new_game()?;
            if let Some(name) = engine.name() {
                println!("engine: {name}");
            }
            Some(engine)
        }
        None => None,
    };
    let engine_army = Army::from(args.engine_army);
    let clock = GoParams::symmetric(args.clock_ms);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !game.is_over() {
        println!("\n{game}");
        println!("{}", game.fen());

        let army = game.active_army();
        if let (Some(uci), true) = (engine.as_mut(), army == engine_army) {
            match uci.best_move(game.fen(), &clock) {
                Ok(mv) => {
                    game.play(army, mv)?;
                    if let Some(played) = game.history(army).last() {
                        println!("{army} plays {}", notation::move_to_string(played, notation));
                    }
                }
                Err(EngineError::NoMove) => {
                    game.resign(army);
                }
                Err(err) => return Err(err.into()),
            }
            continue;
        }

        print!("{army}> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let text = line.trim();

        match text {
            "" => continue,
            "quit" | "exit" => break,
            "resign" => {
                game.resign(army);
                continue;
            }
            "fen" => {
                println!("{}", game.fen());
                continue;
            }
            _ => {}
        }

        match game.play_text(army, text, notation) {
            Ok(()) => {}
            Err(MoveError::PromotionRequired) => {
                eprintln!("choose a promotion piece, e.g. e7e8q or e8=Q");
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    println!("\n{game}");
    match game.result() {
        Some(GameResult::Checkmate(winner)) => println!("checkmate, {winner} wins"),
        Some(GameResult::Resignation(winner)) => println!("resignation, {winner} wins"),
        Some(GameResult::HalfMoveDraw) => println!("draw by the half-move clock"),
        None => println!("game stopped"),
    }

    if let Some(uci) = engine {
        uci.quit()?;
    }
    Ok(())
}
