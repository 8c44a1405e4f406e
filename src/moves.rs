use crate::piece::PieceKind;
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

/// A proposed or recorded move. Moves are built up incrementally: notation
/// parsing fills whatever the text carries, the game fills the piece kind and
/// origin square, and the rules engine validates the result. Fields that the
/// text may omit are `Option`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Move {
    pub kind: Option<PieceKind>,
    pub from: Option<Square>,
    pub to: Option<Square>,
    pub capture: bool,
    pub check: bool,
    pub checkmate: bool,
    pub castle: Option<CastleSide>,
    pub en_passant: bool,
    pub promotion: Option<PieceKind>,
    /// Departure file hint from disambiguated move text ("Nbd2", "exd5").
    pub file_of_departure: Option<u8>,
    /// Departure rank hint from disambiguated move text ("R1e2").
    pub rank_of_departure: Option<u8>,
}

impl Move {
    pub fn to(to: Square) -> Move {
        Move {
            to: Some(to),
            ..Move::default()
        }
    }

    pub fn from_to(from: Square, to: Square) -> Move {
        Move {
            from: Some(from),
            to: Some(to),
            ..Move::default()
        }
    }

    pub fn castle(side: CastleSide) -> Move {
        Move {
            kind: Some(PieceKind::King),
            castle: Some(side),
            ..Move::default()
        }
    }

    /// Enough information to start resolving: a destination, or a castle
    /// whose destination is implied by the side.
    pub fn is_valid(&self) -> bool {
        self.to.is_some() || self.castle.is_some()
    }

    /// Departure file: the origin's file when known, else the parsed hint.
    pub fn file_hint(&self) -> Option<u8> {
        self.from.map(|sq| sq.file()).or(self.file_of_departure)
    }

    /// Departure rank: the origin's rank when known, else the parsed hint.
    pub fn rank_hint(&self) -> Option<u8> {
        self.from.map(|sq| sq.rank()).or(self.rank_of_departure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_requires_destination_or_castle() {
        assert!(!Move::default().is_valid());
        assert!(Move::to(Square::new(4, 3).unwrap()).is_valid());
        assert!(Move::castle(CastleSide::KingSide).is_valid());
    }

    #[test]
    fn hints_prefer_resolved_origin() {
        let mut mv = Move::to(Square::new(3, 3).unwrap());
        mv.file_of_departure = Some(1);
        assert_eq!(mv.file_hint(), Some(1));

        mv.from = Square::new(2, 0);
        assert_eq!(mv.file_hint(), Some(2));
        assert_eq!(mv.rank_hint(), Some(0));
    }
}
