//! Arbitro is a chess position-legality engine and game adjudicator.
//!
//! The crate keeps a piece placement per army, derives bitboard move,
//! attack and defend sets for every piece by ray casting, and answers
//! legality, check, checkmate and castling questions against those boards.
//! On top of that sit FEN parsing and serialization (Chess960 rook-file
//! rights included), three move notations, Scharnagl starting positions,
//! a game state machine with history and capture tracking, and a client
//! for UCI engines.

pub mod bitboard;
pub mod chess960;
pub mod fen;
pub mod game;
pub mod moves;
pub mod notation;
pub mod piece;
pub mod rules;
pub mod square;
pub mod uci;

pub use bitboard::BitBoard;
pub use game::{Game, GameResult, MoveError};
pub use moves::{CastleSide, Move};
pub use notation::NotationType;
pub use piece::{Army, Piece, PieceKind};
pub use rules::{BoardType, Rules};
pub use square::Square;
