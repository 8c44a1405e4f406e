//! Move-text conversions between [`Move`] values and the three notations the
//! game speaks: standard algebraic ("Nf3", "exd8=Q+", "O-O"), hyphenated long
//! algebraic ("e2-e4", "Rd3xd7") and computer notation ("e2e4", "e7e8q"),
//! which is what UCI engines exchange.
//!
//! Parsing fills out the fields the text carries and leaves the rest for the
//! game to resolve against the current position. Rendering expects a move
//! whose relevant fields have been resolved.

use thiserror::Error;

use crate::moves::{CastleSide, Move};
use crate::piece::PieceKind;
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotationType {
    /// Standard algebraic notation as found in PGN movetext.
    Standard,
    /// Hyphenated long algebraic notation.
    Long,
    /// Un-hyphenated long algebraic notation; UCI uses this.
    Computer,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("empty move text")]
    Empty,
    #[error("invalid square {0:?}")]
    BadSquare(String),
    #[error("invalid piece letter {0:?}")]
    BadPiece(char),
    #[error("unparsable move text {0:?}")]
    BadMove(String),
    #[error("null move")]
    NullMove,
}

pub fn parse_square(text: &str) -> Result<Square, NotationError> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return Err(NotationError::BadSquare(text.to_string()));
    }
    let file = match bytes[0] {
        b @ b'a'..=b'h' => b - b'a',
        _ => return Err(NotationError::BadSquare(text.to_string())),
    };
    let rank = match bytes[1] {
        b @ b'1'..=b'8' => b - b'1',
        _ => return Err(NotationError::BadSquare(text.to_string())),
    };
    Ok(Square::new(file, rank).expect("validated coordinates"))
}

pub fn parse_move(text: &str, notation: NotationType) -> Result<Move, NotationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NotationError::Empty);
    }
    // The parsers below slice by byte offset.
    if !trimmed.is_ascii() {
        return Err(NotationError::BadMove(trimmed.to_string()));
    }
    match notation {
        NotationType::Standard => parse_standard(trimmed),
        NotationType::Long => parse_long(trimmed),
        NotationType::Computer => parse_computer(trimmed),
    }
}

fn strip_check_suffix(text: &str, mv: &mut Move) -> usize {
    if text.ends_with('#') {
        mv.checkmate = true;
        text.len() - 1
    } else if text.ends_with('+') {
        mv.check = true;
        text.len() - 1
    } else {
        text.len()
    }
}

fn parse_standard(text: &str) -> Result<Move, NotationError> {
    let mut mv = Move::default();
    let mut body = &text[..strip_check_suffix(text, &mut mv)];

    match body {
        "O-O" | "0-0" => {
            mv.kind = Some(PieceKind::King);
            mv.castle = Some(CastleSide::KingSide);
            return Ok(mv);
        }
        "O-O-O" | "0-0-0" => {
            mv.kind = Some(PieceKind::King);
            mv.castle = Some(CastleSide::QueenSide);
            return Ok(mv);
        }
        _ => {}
    }

    if let Some(eq) = body.find('=') {
        let promo = body[eq + 1..]
            .chars()
            .next()
            .ok_or_else(|| NotationError::BadMove(text.to_string()))?;
        mv.promotion =
            Some(PieceKind::from_letter(promo).ok_or(NotationError::BadPiece(promo))?);
        body = &body[..eq];
    }

    if body.len() < 2 {
        return Err(NotationError::BadMove(text.to_string()));
    }
    mv.to = Some(parse_square(&body[body.len() - 2..])?);

    for (i, ch) in body[..body.len() - 2].chars().enumerate() {
        match ch {
            'K' | 'Q' | 'R' | 'B' | 'N' if i == 0 => {
                mv.kind = PieceKind::from_letter(ch);
            }
            'a'..='h' => mv.file_of_departure = Some(ch as u8 - b'a'),
            '1'..='8' => mv.rank_of_departure = Some(ch as u8 - b'1'),
            'x' => mv.capture = true,
            _ => return Err(NotationError::BadMove(text.to_string())),
        }
    }
    if mv.kind.is_none() {
        mv.kind = Some(PieceKind::Pawn);
    }
    Ok(mv)
}

fn parse_long(text: &str) -> Result<Move, NotationError> {
    let mut mv = Move::default();
    let mut body = &text[..strip_check_suffix(text, &mut mv)];

    match body.chars().next() {
        Some(ch @ ('K' | 'Q' | 'R' | 'B' | 'N')) => {
            mv.kind = PieceKind::from_letter(ch);
            body = &body[1..];
        }
        Some(_) => mv.kind = Some(PieceKind::Pawn),
        None => return Err(NotationError::BadMove(text.to_string())),
    }

    if body.len() != 5 {
        return Err(NotationError::BadMove(text.to_string()));
    }
    match &body[2..3] {
        "x" => mv.capture = true,
        "-" => {}
        _ => return Err(NotationError::BadMove(text.to_string())),
    }
    mv.from = Some(parse_square(&body[..2])?);
    mv.to = Some(parse_square(&body[3..])?);
    Ok(mv)
}

fn parse_computer(text: &str) -> Result<Move, NotationError> {
    // Some engines report "(none)" or "0000" when there is no move to make.
    if text == "(none)" || text == "0000" {
        return Err(NotationError::NullMove);
    }
    if text.len() != 4 && text.len() != 5 {
        return Err(NotationError::BadMove(text.to_string()));
    }

    let mut mv = Move::default();
    mv.from = Some(parse_square(&text[..2])?);
    mv.to = Some(parse_square(&text[2..4])?);
    if let Some(promo) = text.chars().nth(4) {
        mv.promotion =
            Some(PieceKind::from_letter(promo).ok_or(NotationError::BadPiece(promo))?);
    }
    Ok(mv)
}

pub fn move_to_string(mv: &Move, notation: NotationType) -> String {
    match notation {
        NotationType::Standard => standard_string(mv),
        NotationType::Long => long_string(mv),
        NotationType::Computer => computer_string(mv),
    }
}

fn check_suffix(mv: &Move) -> &'static str {
    if mv.checkmate {
        "#"
    } else if mv.check {
        "+"
    } else {
        ""
    }
}

fn standard_string(mv: &Move) -> String {
    if let Some(side) = mv.castle {
        let castle = match side {
            CastleSide::KingSide => "O-O",
            CastleSide::QueenSide => "O-O-O",
        };
        return format!("{}{}", castle, check_suffix(mv));
    }

    let mut out = String::new();
    let kind = mv.kind.unwrap_or(PieceKind::Pawn);
    if kind != PieceKind::Pawn {
        out.push(kind.letter());
    }
    // Explicit disambiguation hints survive a parse/render round trip;
    // resolved origins are not re-expanded into hints.
    if let Some(file) = mv.file_of_departure {
        out.push((b'a' + file) as char);
    }
    if let Some(rank) = mv.rank_of_departure {
        out.push((b'1' + rank) as char);
    }
    if mv.capture {
        if kind == PieceKind::Pawn && mv.file_of_departure.is_none() {
            if let Some(from) = mv.from {
                out.push((b'a' + from.file()) as char);
            }
        }
        out.push('x');
    }
    if let Some(to) = mv.to {
        out.push_str(&to.to_string());
    }
    if let Some(promo) = mv.promotion {
        out.push('=');
        out.push(promo.letter());
    }
    out.push_str(check_suffix(mv));
    out
}

fn long_string(mv: &Move) -> String {
    let mut out = String::new();
    let kind = mv.kind.unwrap_or(PieceKind::Pawn);
    if kind != PieceKind::Pawn {
        out.push(kind.letter());
    }
    if let Some(from) = mv.from {
        out.push_str(&from.to_string());
    }
    out.push(if mv.capture { 'x' } else { '-' });
    if let Some(to) = mv.to {
        out.push_str(&to.to_string());
    }
    out
}

fn computer_string(mv: &Move) -> String {
    let mut out = String::new();
    if let Some(from) = mv.from {
        out.push_str(&from.to_string());
    }
    if let Some(to) = mv.to {
        out.push_str(&to.to_string());
    }
    if let Some(promo) = mv.promotion {
        out.push(promo.letter().to_ascii_lowercase());
    }
    out
}
