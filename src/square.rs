// Square mapping: a1 = 0, b1 = 1, ..., h8 = 63 (index = rank * 8 + file)

use std::fmt;

/// A validated board coordinate. A constructed `Square` is always on the
/// board; "no square" is expressed as `Option<Square>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        if file < 8 && rank < 8 {
            Some(Square { file, rank })
        } else {
            None
        }
    }

    /// Signed-coordinate constructor for ray stepping, where offsets may
    /// walk off the board in either direction.
    pub fn from_coords(file: i8, rank: i8) -> Option<Square> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    pub fn from_index(index: u8) -> Option<Square> {
        if index < 64 {
            Some(Square {
                file: index % 8,
                rank: index / 8,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn file(&self) -> u8 {
        self.file
    }

    #[inline]
    pub fn rank(&self) -> u8 {
        self.rank
    }

    #[inline]
    pub fn index(&self) -> u8 {
        self.rank * 8 + self.file
    }

    /// The square reached by moving `df` files and `dr` ranks, if on the board.
    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        Square::from_coords(self.file as i8 + df, self.rank as i8 + dr)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file) as char,
            (b'1' + self.rank) as char
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for index in 0..64u8 {
            let sq = Square::from_index(index).unwrap();
            assert_eq!(sq.index(), index);
            assert_eq!(Square::new(sq.file(), sq.rank()), Some(sq));
        }
        assert_eq!(Square::from_index(64), None);
    }

    #[test]
    fn rejects_off_board_coordinates() {
        assert_eq!(Square::new(8, 0), None);
        assert_eq!(Square::new(0, 8), None);
        assert_eq!(Square::from_coords(-1, 3), None);
        assert_eq!(Square::from_coords(3, -1), None);
    }

    #[test]
    fn display_matches_algebraic() {
        assert_eq!(Square::new(0, 0).unwrap().to_string(), "a1");
        assert_eq!(Square::new(4, 3).unwrap().to_string(), "e4");
        assert_eq!(Square::new(7, 7).unwrap().to_string(), "h8");
    }

    #[test]
    fn offset_walks_the_board() {
        let e4 = Square::new(4, 3).unwrap();
        assert_eq!(e4.offset(0, 1), Square::new(4, 4));
        assert_eq!(e4.offset(-4, 0), Square::new(0, 3));
        assert_eq!(e4.offset(-5, 0), None);
    }
}
