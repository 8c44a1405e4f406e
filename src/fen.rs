//! Forsyth-Edwards Notation.
//!
//! Six space-separated fields: piece placement (rank 8 down to rank 1),
//! active army, castling rights, en-passant target, half-move clock and
//! full-move number. Castling rights are `KQkq` letters for the standard
//! game, or rook-file letters (`HAha` style, uppercase for White) for
//! Chess960 positions where the rook files vary.

use std::collections::HashMap;

use thiserror::Error;

use crate::piece::{Army, Piece, PieceKind};
use crate::rules::CastleRights;
use crate::square::Square;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid piece character {0:?}")]
    BadPieceChar(char),
    #[error("expected 8 ranks, found {0}")]
    BadRankCount(usize),
    #[error("rank {0} does not describe 8 files")]
    BadRank(String),
    #[error("invalid active army {0:?}")]
    BadSide(String),
    #[error("invalid castling character {0:?}")]
    BadCastlingChar(char),
    #[error("castling rights given for {0} but its king is not on the back rank")]
    MissingKing(Army),
    #[error("invalid en-passant target {0:?}")]
    BadEnPassant(String),
    #[error("invalid {0} counter")]
    BadCounter(&'static str),
}

/// A fully parsed FEN string: placement maps plus the five state fields,
/// with the Chess960 rook files recovered from file-letter castling rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenRecord {
    pub white: HashMap<u8, Piece>,
    pub black: HashMap<u8, Piece>,
    pub active: Army,
    pub rights: CastleRights,
    pub king_rook_file: Option<u8>,
    pub queen_rook_file: Option<u8>,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

pub fn parse(fen: &str) -> Result<FenRecord, FenError> {
    let mut fields = fen.split_whitespace();
    let placement = fields.next().ok_or(FenError::MissingField("placement"))?;
    let side = fields.next().ok_or(FenError::MissingField("active army"))?;
    let castling = fields.next().ok_or(FenError::MissingField("castling"))?;
    let en_passant = fields.next().ok_or(FenError::MissingField("en passant"))?;
    let halfmove = fields.next().ok_or(FenError::MissingField("halfmove clock"))?;
    let fullmove = fields.next().ok_or(FenError::MissingField("fullmove number"))?;

    let (white, black) = parse_placement(placement)?;

    let active = match side {
        "w" => Army::White,
        "b" => Army::Black,
        other => return Err(FenError::BadSide(other.to_string())),
    };

    let mut record = FenRecord {
        white,
        black,
        active,
        rights: CastleRights::default(),
        king_rook_file: None,
        queen_rook_file: None,
        en_passant: None,
        halfmove_clock: 0,
        fullmove_number: 1,
    };
    parse_castling(castling, &mut record)?;

    record.en_passant = match en_passant {
        "-" => None,
        text => {
            let square = crate::notation::parse_square(text)
                .map_err(|_| FenError::BadEnPassant(text.to_string()))?;
            if square.rank() != 2 && square.rank() != 5 {
                return Err(FenError::BadEnPassant(text.to_string()));
            }
            Some(square)
        }
    };

    record.halfmove_clock = halfmove
        .parse()
        .map_err(|_| FenError::BadCounter("halfmove"))?;
    record.fullmove_number = fullmove
        .parse()
        .map_err(|_| FenError::BadCounter("fullmove"))?;

    Ok(record)
}

fn parse_placement(
    placement: &str,
) -> Result<(HashMap<u8, Piece>, HashMap<u8, Piece>), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadRankCount(ranks.len()));
    }

    let mut white = HashMap::new();
    let mut black = HashMap::new();
    for (i, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for ch in rank_text.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip as u8;
            } else {
                let kind = PieceKind::from_letter(ch).ok_or(FenError::BadPieceChar(ch))?;
                let square = Square::new(file, rank)
                    .ok_or_else(|| FenError::BadRank(rank_text.to_string()))?;
                let army = if ch.is_ascii_uppercase() {
                    Army::White
                } else {
                    Army::Black
                };
                let map = if army == Army::White { &mut white } else { &mut black };
                map.insert(square.index(), Piece::new(army, kind, square));
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::BadRank(rank_text.to_string()));
        }
    }
    Ok((white, black))
}

/// Accepts both `KQkq` and rook-file letters; for file letters the side is
/// decided by whether the rook file lies beyond the king's file.
fn parse_castling(castling: &str, record: &mut FenRecord) -> Result<(), FenError> {
    if castling == "-" {
        return Ok(());
    }
    for ch in castling.chars() {
        match ch {
            'K' => {
                record.rights.white_king_side = true;
                record.king_rook_file.get_or_insert(7);
            }
            'Q' => {
                record.rights.white_queen_side = true;
                record.queen_rook_file.get_or_insert(0);
            }
            'k' => {
                record.rights.black_king_side = true;
                record.king_rook_file.get_or_insert(7);
            }
            'q' => {
                record.rights.black_queen_side = true;
                record.queen_rook_file.get_or_insert(0);
            }
            'A'..='H' | 'a'..='h' => {
                let army = if ch.is_ascii_uppercase() {
                    Army::White
                } else {
                    Army::Black
                };
                let file = ch.to_ascii_lowercase() as u8 - b'a';
                let king_file = king_file_on_back_rank(record, army)
                    .ok_or(FenError::MissingKing(army))?;
                if file > king_file {
                    record.rights.set(army, crate::moves::CastleSide::KingSide, true);
                    record.king_rook_file = Some(file);
                } else {
                    record.rights.set(army, crate::moves::CastleSide::QueenSide, true);
                    record.queen_rook_file = Some(file);
                }
            }
            _ => return Err(FenError::BadCastlingChar(ch)),
        }
    }
    Ok(())
}

fn king_file_on_back_rank(record: &FenRecord, army: Army) -> Option<u8> {
    let map = match army {
        Army::White => &record.white,
        Army::Black => &record.black,
    };
    map.values()
        .find(|p| p.kind == PieceKind::King && p.square.rank() == army.back_rank())
        .map(|p| p.square.file())
}

impl FenRecord {
    /// Serializes the record. With `chess960` set, castling rights use rook
    /// file letters (king-side letter first, as for `KQkq`).
    pub fn encode(&self, chess960: bool) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut text = String::new();
            let mut blanks = 0;
            for file in 0..8 {
                let index = Square::new(file, rank).expect("board square").index();
                let piece = self.white.get(&index).or_else(|| self.black.get(&index));
                match piece {
                    Some(piece) => {
                        if blanks > 0 {
                            text.push_str(&blanks.to_string());
                            blanks = 0;
                        }
                        text.push(piece.fen_char());
                    }
                    None => blanks += 1,
                }
            }
            if blanks > 0 {
                text.push_str(&blanks.to_string());
            }
            ranks.push(text);
        }

        let active = match self.active {
            Army::White => "w",
            Army::Black => "b",
        };

        let mut castling = String::new();
        let letter = |file: Option<u8>, fallback: char| -> char {
            match (chess960, file) {
                (true, Some(file)) => (b'a' + file) as char,
                _ => fallback.to_ascii_lowercase(),
            }
        };
        if self.rights.white_king_side {
            castling.push(letter(self.king_rook_file, 'k').to_ascii_uppercase());
        }
        if self.rights.white_queen_side {
            castling.push(letter(self.queen_rook_file, 'q').to_ascii_uppercase());
        }
        if self.rights.black_king_side {
            castling.push(letter(self.king_rook_file, 'k'));
        }
        if self.rights.black_queen_side {
            castling.push(letter(self.queen_rook_file, 'q'));
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = match self.en_passant {
            Some(square) => square.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            ranks.join("/"),
            active,
            castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}
