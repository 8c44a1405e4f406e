//! The game state machine.
//!
//! `Game` owns the piece placement (one index → piece map per army), the
//! captured-piece lists, the move histories and an append-only FEN log with a
//! display cursor. Every accepted move mutates the placement, re-derives the
//! FEN, and asks [`Rules`] to rebuild its boards; the rules always reflect
//! the last applied position, never a navigated-to one.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::fen::{self, FenError, FenRecord, START_FEN};
use crate::moves::{CastleSide, Move};
use crate::notation::{self, NotationError, NotationType};
use crate::piece::{Army, Piece, PieceKind};
use crate::rules::Rules;
use crate::square::Square;

/// How a finished game ended. Checkmate and resignation carry the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Checkmate(Army),
    Resignation(Army),
    HalfMoveDraw,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,
    #[error("it is not {0}'s turn")]
    NotYourTurn(Army),
    #[error("move does not carry enough information to resolve")]
    Incomplete,
    #[error("no piece can make this move")]
    UnresolvedOrigin,
    #[error("a promotion piece must be chosen")]
    PromotionRequired,
    #[error("illegal move {0}")]
    Illegal(String),
    #[error(transparent)]
    Notation(#[from] NotationError),
}

pub struct Game {
    chess960: bool,
    active: Army,
    halfmove_clock: u32,
    fullmove_number: u32,
    en_passant: Option<Square>,
    white: HashMap<u8, Piece>,
    black: HashMap<u8, Piece>,
    white_captured: Vec<Piece>,
    black_captured: Vec<Piece>,
    white_history: Vec<Move>,
    black_history: Vec<Move>,
    fens: Vec<String>,
    cursor: usize,
    rules: Rules,
    result: Option<GameResult>,
}

impl Game {
    pub fn new() -> Game {
        Game::from_fen(START_FEN).expect("standard start position parses")
    }

    pub fn from_fen(text: &str) -> Result<Game, FenError> {
        Game::build(text, false)
    }

    /// Like [`Game::from_fen`], but castling rights may use rook-file
    /// letters and the FEN is re-serialized the same way.
    pub fn from_fen_chess960(text: &str) -> Result<Game, FenError> {
        Game::build(text, true)
    }

    /// A Chess960 game from a Scharnagl id, or a random one when `id` is
    /// `None`. Returns `None` for ids outside [0, 960).
    pub fn new_chess960(id: Option<u16>) -> Option<Game> {
        let id = id.unwrap_or_else(|| crate::chess960::random_id(&mut rand::thread_rng()));
        let fen = crate::chess960::starting_fen(id)?;
        Some(Game::from_fen_chess960(&fen).expect("generated start position parses"))
    }

    fn build(text: &str, chess960: bool) -> Result<Game, FenError> {
        let record = fen::parse(text)?;
        let mut rules = Rules::new();
        rules.set_castle_rights(record.rights);
        rules.set_rook_files(
            record.king_rook_file.unwrap_or(7),
            record.queen_rook_file.unwrap_or(0),
        );
        rules.set_en_passant_target(record.en_passant);

        let mut game = Game {
            chess960,
            active: record.active,
            halfmove_clock: record.halfmove_clock,
            fullmove_number: record.fullmove_number,
            en_passant: record.en_passant,
            white: record.white,
            black: record.black,
            white_captured: Vec::new(),
            black_captured: Vec::new(),
            white_history: Vec::new(),
            black_history: Vec::new(),
            fens: vec![text.trim().to_string()],
            cursor: 0,
            rules,
            result: None,
        };
        game.rules.refresh(&game.white, &game.black);
        Ok(game)
    }

    pub fn active_army(&self) -> Army {
        self.active
    }

    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn half_move_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn full_move_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// Current pieces of an army, ordered by square index.
    pub fn pieces(&self, army: Army) -> Vec<Piece> {
        let map = match army {
            Army::White => &self.white,
            Army::Black => &self.black,
        };
        let mut pieces: Vec<Piece> = map.values().copied().collect();
        pieces.sort_by_key(|p| p.square.index());
        pieces
    }

    /// Pieces of `army` that have been captured, in capture order.
    pub fn captured_pieces(&self, army: Army) -> &[Piece] {
        match army {
            Army::White => &self.white_captured,
            Army::Black => &self.black_captured,
        }
    }

    pub fn history(&self, army: Army) -> &[Move] {
        match army {
            Army::White => &self.white_history,
            Army::Black => &self.black_history,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.white
            .get(&square.index())
            .or_else(|| self.black.get(&square.index()))
    }

    /// The FEN of the last applied position.
    pub fn fen(&self) -> &str {
        self.fens.last().expect("log is never empty")
    }

    /// Number of positions in the log (starting position included).
    pub fn positions(&self) -> usize {
        self.fens.len()
    }

    pub fn fen_at(&self, index: usize) -> Option<&str> {
        self.fens.get(index).map(|s| s.as_str())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the display cursor. Navigation never touches the rules boards;
    /// moves always apply at the end of the log.
    pub fn set_cursor(&mut self, index: usize) -> bool {
        if index < self.fens.len() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    /// Read-only re-derivation of the placement at a logged position,
    /// ordered by square index.
    pub fn placement_at(&self, index: usize) -> Option<Vec<Piece>> {
        let record = fen::parse(self.fens.get(index)?).ok()?;
        let mut pieces: Vec<Piece> = record
            .white
            .values()
            .chain(record.black.values())
            .copied()
            .collect();
        pieces.sort_by_key(|p| p.square.index());
        Some(pieces)
    }

    pub fn resign(&mut self, army: Army) {
        if self.result.is_none() {
            self.result = Some(GameResult::Resignation(army.opponent()));
        }
    }

    /// Proposes a move for `army`. Missing fields are filled in from the
    /// position, the move is validated, and on success the position, logs
    /// and rules boards advance. On any error nothing changes.
    pub fn play(&mut self, army: Army, mut mv: Move) -> Result<(), MoveError> {
        if self.result.is_some() {
            return Err(MoveError::GameOver);
        }
        if self.active != army {
            return Err(MoveError::NotYourTurn(army));
        }
        self.fill_out(army, &mut mv)?;
        if !self.rules.is_legal_move(army, &mv) {
            return Err(MoveError::Illegal(notation::move_to_string(
                &mv,
                NotationType::Computer,
            )));
        }
        self.apply(army, mv);
        Ok(())
    }

    /// Parses move text in the given notation and plays it.
    pub fn play_text(
        &mut self,
        army: Army,
        text: &str,
        notation: NotationType,
    ) -> Result<(), MoveError> {
        let mv = notation::parse_move(text, notation)?;
        self.play(army, mv)
    }

    fn fill_out(&self, army: Army, mv: &mut Move) -> Result<(), MoveError> {
        if !mv.is_valid() {
            return Err(MoveError::Incomplete);
        }

        if mv.kind.is_none() {
            if let Some(from) = mv.from {
                mv.kind = self.piece_at(from).map(|p| p.kind);
            }
        }

        if let Some(side) = mv.castle {
            if mv.to.is_none() {
                mv.to = Some(self.rules.castle_king_target(army, side));
            }
        }

        if mv.from.is_none() {
            mv.from = Some(
                self.rules
                    .guess_square(army, mv)
                    .ok_or(MoveError::UnresolvedOrigin)?,
            );
        }
        let from = mv.from.expect("origin resolved");
        let to = mv.to.ok_or(MoveError::Incomplete)?;

        if mv.kind.is_none() {
            mv.kind = Some(
                self.piece_at(from)
                    .ok_or(MoveError::UnresolvedOrigin)?
                    .kind,
            );
        }
        let kind = mv.kind.expect("kind resolved");

        if kind == PieceKind::King && mv.castle.is_none() {
            self.infer_castle(army, mv, from, to);
        }

        if kind == PieceKind::Pawn
            && self.en_passant == Some(to)
            && from.file() != to.file()
        {
            mv.en_passant = true;
            mv.capture = true;
        }

        let opponent = match army {
            Army::White => &self.black,
            Army::Black => &self.white,
        };
        if opponent.contains_key(&to.index()) {
            mv.capture = true;
        }

        if kind == PieceKind::Pawn
            && to.rank() == army.opponent().back_rank()
            && mv.promotion.is_none()
        {
            return Err(MoveError::PromotionRequired);
        }

        Ok(())
    }

    /// A king move is a castle when it jumps two or more files along the
    /// back rank, or (Chess960 convention) lands on its own castling rook.
    fn infer_castle(&self, army: Army, mv: &mut Move, from: Square, to: Square) {
        if from.rank() != army.back_rank() || to.rank() != army.back_rank() {
            return;
        }

        let own_rook_at = |file: u8| {
            Square::new(file, army.back_rank()).is_some_and(|sq| {
                self.piece_at(sq)
                    .is_some_and(|p| p.army == army && p.kind == PieceKind::Rook)
            })
        };

        let side = if to.file() == self.rules.king_rook_file()
            && own_rook_at(self.rules.king_rook_file())
        {
            Some(CastleSide::KingSide)
        } else if to.file() == self.rules.queen_rook_file()
            && own_rook_at(self.rules.queen_rook_file())
        {
            Some(CastleSide::QueenSide)
        } else if from.file().abs_diff(to.file()) >= 2 {
            Some(if to.file() > from.file() {
                CastleSide::KingSide
            } else {
                CastleSide::QueenSide
            })
        } else {
            None
        };

        if let Some(side) = side {
            mv.castle = Some(side);
            mv.to = Some(self.rules.castle_king_target(army, side));
        }
    }

    fn apply(&mut self, army: Army, mut mv: Move) {
        let from = mv.from.expect("validated move");
        let to = mv.to.expect("validated move");
        let kind = mv.kind.expect("validated move");
        let king_rook_file = self.rules.king_rook_file();
        let queen_rook_file = self.rules.queen_rook_file();

        // The window closes before every move, whether it was used or not.
        self.en_passant = None;

        match kind {
            PieceKind::King => {
                self.rules.set_castle_available(army, CastleSide::KingSide, false);
                self.rules.set_castle_available(army, CastleSide::QueenSide, false);
            }
            PieceKind::Rook if from.rank() == army.back_rank() => {
                if from.file() == king_rook_file {
                    self.rules.set_castle_available(army, CastleSide::KingSide, false);
                } else if from.file() == queen_rook_file {
                    self.rules.set_castle_available(army, CastleSide::QueenSide, false);
                }
            }
            PieceKind::Pawn if from.rank().abs_diff(to.rank()) == 2 => {
                self.en_passant = Square::new(to.file(), (from.rank() + to.rank()) / 2);
            }
            _ => {}
        }

        let captured = {
            let enemy = match army {
                Army::White => &mut self.black,
                Army::Black => &mut self.white,
            };
            let mut captured = enemy.remove(&to.index());
            if captured.is_none() && mv.en_passant {
                // The en-passant victim sits beside the destination, on the
                // capturing pawn's starting rank.
                if let Some(victim) = Square::new(to.file(), from.rank()) {
                    captured = enemy.remove(&victim.index());
                }
            }
            captured
        };

        if let Some(piece) = captured {
            mv.capture = true;
            let opponent = army.opponent();
            if piece.kind == PieceKind::Rook && piece.square.rank() == opponent.back_rank() {
                if piece.square.file() == king_rook_file {
                    self.rules
                        .set_castle_available(opponent, CastleSide::KingSide, false);
                } else if piece.square.file() == queen_rook_file {
                    self.rules
                        .set_castle_available(opponent, CastleSide::QueenSide, false);
                }
            }
            match army {
                Army::White => self.black_captured.push(piece),
                Army::Black => self.white_captured.push(piece),
            }
        }

        if kind == PieceKind::Pawn || mv.capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        {
            let own = match army {
                Army::White => &mut self.white,
                Army::Black => &mut self.black,
            };
            if let Some(side) = mv.castle {
                let rook_file = match side {
                    CastleSide::KingSide => king_rook_file,
                    CastleSide::QueenSide => queen_rook_file,
                };
                let back = army.back_rank();
                let rook_from = Square::new(rook_file, back).expect("rook home square");
                let king = own.remove(&from.index());
                let rook = own.remove(&rook_from.index());
                if let Some(mut king) = king {
                    king.square = to;
                    own.insert(to.index(), king);
                }
                if let Some(mut rook) = rook {
                    let rook_to = match side {
                        CastleSide::KingSide => Square::new(5, back),
                        CastleSide::QueenSide => Square::new(3, back),
                    }
                    .expect("rook target square");
                    rook.square = rook_to;
                    own.insert(rook_to.index(), rook);
                }
            } else if let Some(mut piece) = own.remove(&from.index()) {
                piece.square = to;
                if let Some(promotion) = mv.promotion {
                    piece.kind = promotion;
                }
                own.insert(to.index(), piece);
            }
        }

        if army == Army::Black {
            self.fullmove_number += 1;
        }
        self.active = army.opponent();

        self.rules.set_en_passant_target(self.en_passant);
        self.rules.refresh(&self.white, &self.black);

        if self.rules.is_check_mated(self.active) {
            mv.check = true;
            mv.checkmate = true;
        } else if self.rules.is_checked(self.active) {
            mv.check = true;
        }

        match army {
            Army::White => self.white_history.push(mv),
            Army::Black => self.black_history.push(mv),
        }

        let fen = self.to_fen();
        self.fens.push(fen);
        self.cursor = self.fens.len() - 1;

        if mv.checkmate {
            self.result = Some(GameResult::Checkmate(army));
        } else if self.halfmove_clock >= 49 {
            self.result = Some(GameResult::HalfMoveDraw);
        }
    }

    fn to_fen(&self) -> String {
        let record = FenRecord {
            white: self.white.clone(),
            black: self.black.clone(),
            active: self.active,
            rights: self.rules.castle_rights(),
            king_rook_file: Some(self.rules.king_rook_file()),
            queen_rook_file: Some(self.rules.queen_rook_file()),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };
        record.encode(self.chess960)
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

impl fmt::Display for Game {
    /// ASCII board, rank 8 at the top, dots for empty squares.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let square = Square::new(file, rank).expect("board square");
                let ch = self.piece_at(square).map_or('.', |p| p.fen_char());
                write!(f, " {}", ch)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        crate::notation::parse_square(name).unwrap()
    }

    #[test]
    fn standard_start_matches_start_fen() {
        let game = Game::new();
        assert_eq!(game.fen(), START_FEN);
        assert_eq!(game.active_army(), Army::White);
        assert_eq!(game.pieces(Army::White).len(), 16);
        assert_eq!(game.pieces(Army::Black).len(), 16);
    }

    #[test]
    fn opening_push_produces_known_fen() {
        let mut game = Game::new();
        game.play_text(Army::White, "e2e4", NotationType::Computer)
            .unwrap();
        assert_eq!(
            game.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(game.en_passant_target(), Some(sq("e3")));
        assert_eq!(game.active_army(), Army::Black);
    }

    #[test]
    fn standard_notation_drives_the_same_machine() {
        let mut game = Game::new();
        game.play_text(Army::White, "Nf3", NotationType::Standard)
            .unwrap();
        let knight = game.piece_at(sq("f3")).unwrap();
        assert_eq!(knight.kind, PieceKind::Knight);
        assert_eq!(knight.army, Army::White);
        assert!(game.piece_at(sq("g1")).is_none());
    }

    #[test]
    fn wrong_army_and_illegal_moves_change_nothing() {
        let mut game = Game::new();
        let before = game.fen().to_string();

        assert_eq!(
            game.play_text(Army::Black, "e7e5", NotationType::Computer),
            Err(MoveError::NotYourTurn(Army::Black))
        );
        assert!(matches!(
            game.play_text(Army::White, "e2e5", NotationType::Computer),
            Err(MoveError::Illegal(_))
        ));
        assert_eq!(game.fen(), before);
        assert_eq!(game.positions(), 1);
    }

    #[test]
    fn promotion_requires_a_choice() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            game.play_text(Army::White, "a7a8", NotationType::Computer),
            Err(MoveError::PromotionRequired)
        );
        game.play_text(Army::White, "a7a8q", NotationType::Computer)
            .unwrap();
        assert_eq!(game.piece_at(sq("a8")).unwrap().kind, PieceKind::Queen);
    }

    #[test]
    fn capture_moves_piece_to_captured_list() {
        let mut game = Game::new();
        for (army, text) in [
            (Army::White, "e2e4"),
            (Army::Black, "d7d5"),
            (Army::White, "e4d5"),
        ] {
            game.play_text(army, text, NotationType::Computer).unwrap();
        }
        let captured = game.captured_pieces(Army::Black);
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].kind, PieceKind::Pawn);
        assert_eq!(game.half_move_clock(), 0);
    }

    #[test]
    fn history_log_and_cursor_advance_together() {
        let mut game = Game::new();
        game.play_text(Army::White, "e2e4", NotationType::Computer)
            .unwrap();
        game.play_text(Army::Black, "e7e5", NotationType::Computer)
            .unwrap();

        assert_eq!(game.positions(), 3);
        assert_eq!(game.cursor(), 2);
        assert_eq!(game.fen_at(0), Some(START_FEN));

        // Navigation is display-only: the live position does not move.
        assert!(game.set_cursor(0));
        assert_eq!(game.cursor(), 0);
        let start = game.placement_at(0).unwrap();
        assert_eq!(start.len(), 32);
        game.play_text(Army::White, "g1f3", NotationType::Computer)
            .unwrap();
        assert_eq!(game.positions(), 4);

        assert!(!game.set_cursor(99));
    }

    #[test]
    fn resignation_ends_the_game() {
        let mut game = Game::new();
        game.resign(Army::White);
        assert_eq!(game.result(), Some(GameResult::Resignation(Army::Black)));
        assert_eq!(
            game.play_text(Army::White, "e2e4", NotationType::Computer),
            Err(MoveError::GameOver)
        );
    }
}
