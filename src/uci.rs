//! The UCI engine boundary.
//!
//! This crate sits on the GUI side of the protocol: [`UciEngine`] spawns an
//! engine process, performs the `uci`/`uciok` handshake, feeds it positions
//! as full FEN strings and reads back `bestmove` replies. Engine output is
//! parsed line by line into [`EngineMessage`]; lines we have no use for
//! (`info`, `option`) are carried through so callers may log them.

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use thiserror::Error;

use crate::moves::Move;
use crate::notation::{self, NotationError, NotationType};

/// One line of engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    Id { field: String, value: String },
    UciOk,
    ReadyOk,
    BestMove { mv: String, ponder: Option<String> },
    Info(String),
    Option(String),
    Unknown(String),
}

pub fn parse_engine_message(line: &str) -> EngineMessage {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("uciok") => EngineMessage::UciOk,
        Some("readyok") => EngineMessage::ReadyOk,
        Some("id") => EngineMessage::Id {
            field: tokens.next().unwrap_or_default().to_string(),
            value: tokens.collect::<Vec<_>>().join(" "),
        },
        Some("bestmove") => {
            let mv = tokens.next().unwrap_or("(none)").to_string();
            let ponder = match tokens.next() {
                Some("ponder") => tokens.next().map(str::to_string),
                _ => None,
            };
            EngineMessage::BestMove { mv, ponder }
        }
        Some("info") => EngineMessage::Info(tokens.collect::<Vec<_>>().join(" ")),
        Some("option") => EngineMessage::Option(tokens.collect::<Vec<_>>().join(" ")),
        _ => EngineMessage::Unknown(line.to_string()),
    }
}

/// Clock state for a `go` command, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoParams {
    pub white_time_ms: u64,
    pub black_time_ms: u64,
    pub white_increment_ms: u64,
    pub black_increment_ms: u64,
    pub moves_to_go: Option<u32>,
}

impl GoParams {
    /// Both sides on the same clock, no increment.
    pub fn symmetric(clock_ms: u64) -> GoParams {
        GoParams {
            white_time_ms: clock_ms,
            black_time_ms: clock_ms,
            ..GoParams::default()
        }
    }
}

pub fn position_command(fen: &str) -> String {
    format!("position fen {fen}")
}

pub fn go_command(params: &GoParams) -> String {
    let mut command = format!(
        "go wtime {} btime {}",
        params.white_time_ms, params.black_time_ms
    );
    if params.white_increment_ms > 0 {
        command.push_str(&format!(" winc {}", params.white_increment_ms));
    }
    if params.black_increment_ms > 0 {
        command.push_str(&format!(" binc {}", params.black_increment_ms));
    }
    if let Some(moves_to_go) = params.moves_to_go {
        command.push_str(&format!(" movestogo {moves_to_go}"));
    }
    command
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine process: {0}")]
    Spawn(#[source] io::Error),
    #[error("engine i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("engine closed its output stream")]
    Disconnected,
    #[error("engine reported it has no move")]
    NoMove,
    #[error("engine sent an unparseable move {0:?}")]
    BadMove(String),
}

/// A spawned UCI engine with the handshake already done.
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: Option<String>,
}

impl UciEngine {
    /// Starts the engine binary and blocks until it answers `uciok`.
    pub fn spawn(path: &str) -> Result<UciEngine, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(EngineError::Spawn)?;
        let stdin = child.stdin.take().ok_or(EngineError::Disconnected)?;
        let stdout = BufReader::new(child.stdout.take().ok_or(EngineError::Disconnected)?);

        let mut engine = UciEngine {
            child,
            stdin,
            stdout,
            name: None,
        };
        engine.send("uci")?;
        loop {
            match parse_engine_message(&engine.read_line()?) {
                EngineMessage::Id { field, value } if field == "name" => {
                    engine.name = Some(value);
                }
                EngineMessage::UciOk => break,
                _ => {}
            }
        }
        Ok(engine)
    }

    /// The name the engine announced during the handshake, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send("ucinewgame")?;
        self.synchronize()
    }

    /// `isready`/`readyok` barrier.
    pub fn synchronize(&mut self) -> Result<(), EngineError> {
        self.send("isready")?;
        loop {
            if parse_engine_message(&self.read_line()?) == EngineMessage::ReadyOk {
                return Ok(());
            }
        }
    }

    /// Sends the position and clock, then blocks until `bestmove` arrives.
    /// Intervening `info` lines are discarded.
    pub fn best_move(&mut self, fen: &str, params: &GoParams) -> Result<Move, EngineError> {
        self.send(&position_command(fen))?;
        self.send(&go_command(params))?;
        loop {
            if let EngineMessage::BestMove { mv, .. } =
                parse_engine_message(&self.read_line()?)
            {
                return notation::parse_move(&mv, NotationType::Computer).map_err(|err| {
                    match err {
                        NotationError::NullMove => EngineError::NoMove,
                        _ => EngineError::BadMove(mv),
                    }
                });
            }
        }
    }

    pub fn quit(mut self) -> Result<(), EngineError> {
        self.send("quit")?;
        self.child.wait()?;
        Ok(())
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Disconnected);
        }
        Ok(line.trim_end().to_string())
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        // Best effort; the engine may already have exited via quit().
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
