use std::fmt;

use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Army {
    White = 0,
    Black = 1,
}

impl Army {
    #[inline]
    pub fn opponent(self) -> Army {
        match self {
            Army::White => Army::Black,
            Army::Black => Army::White,
        }
    }

    /// The rank the army's royal pieces start on (0 for White, 7 for Black).
    #[inline]
    pub fn back_rank(self) -> u8 {
        match self {
            Army::White => 0,
            Army::Black => 7,
        }
    }
}

impl fmt::Display for Army {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Army::White => write!(f, "White"),
            Army::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King = 0,
    Queen = 1,
    Rook = 2,
    Bishop = 3,
    Knight = 4,
    Pawn = 5,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ];

    /// Uppercase piece letter as used in FEN and move text.
    pub fn letter(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }

    pub fn from_letter(ch: char) -> Option<PieceKind> {
        match ch.to_ascii_uppercase() {
            'K' => Some(PieceKind::King),
            'Q' => Some(PieceKind::Queen),
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'P' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

/// A piece standing on a square. Equality is army + kind + square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub army: Army,
    pub kind: PieceKind,
    pub square: Square,
}

impl Piece {
    pub fn new(army: Army, kind: PieceKind, square: Square) -> Piece {
        Piece { army, kind, square }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn fen_char(&self) -> char {
        match self.army {
            Army::White => self.kind.letter(),
            Army::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }
}
