// 64-bit square sets. Bit i is set iff the square with index i is a member.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitBoard(u64);

impl BitBoard {
    pub const EMPTY: BitBoard = BitBoard(0);

    /// Mask of every square on `file` (0 = a-file).
    pub fn file(file: u8) -> BitBoard {
        debug_assert!(file < 8);
        BitBoard(0x0101_0101_0101_0101 << file)
    }

    /// Mask of every square on `rank` (0 = first rank).
    pub fn rank(rank: u8) -> BitBoard {
        debug_assert!(rank < 8);
        BitBoard(0xFF << (rank * 8))
    }

    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn contains(&self, square: Square) -> bool {
        self.0 & (1u64 << square.index()) != 0
    }

    #[inline]
    pub fn set(&mut self, square: Square) {
        self.0 |= 1u64 << square.index();
    }

    /// Clears the set and re-populates it from `squares`.
    pub fn assign<I: IntoIterator<Item = Square>>(&mut self, squares: I) {
        self.0 = 0;
        for sq in squares {
            self.set(sq);
        }
    }

    #[inline]
    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Ordered snapshot of the member squares, lowest index first.
    pub fn squares(&self) -> Squares {
        Squares(self.0)
    }

    pub fn first(&self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Square::from_index(self.0.trailing_zeros() as u8)
        }
    }
}

impl From<Square> for BitBoard {
    fn from(square: Square) -> BitBoard {
        BitBoard(1u64 << square.index())
    }
}

impl FromIterator<Square> for BitBoard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> BitBoard {
        let mut bb = BitBoard::EMPTY;
        for sq in iter {
            bb.set(sq);
        }
        bb
    }
}

/// Snapshot iterator over the squares of a [`BitBoard`].
pub struct Squares(u64);

impl Iterator for Squares {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Square::from_index(index)
    }
}

impl BitAnd for BitBoard {
    type Output = BitBoard;
    fn bitand(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 & rhs.0)
    }
}

impl BitOr for BitBoard {
    type Output = BitBoard;
    fn bitor(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 | rhs.0)
    }
}

impl BitXor for BitBoard {
    type Output = BitBoard;
    fn bitxor(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 ^ rhs.0)
    }
}

impl Not for BitBoard {
    type Output = BitBoard;
    fn not(self) -> BitBoard {
        BitBoard(!self.0)
    }
}

impl BitAndAssign for BitBoard {
    fn bitand_assign(&mut self, rhs: BitBoard) {
        self.0 &= rhs.0;
    }
}

impl BitOrAssign for BitBoard {
    fn bitor_assign(&mut self, rhs: BitBoard) {
        self.0 |= rhs.0;
    }
}

impl BitXorAssign for BitBoard {
    fn bitxor_assign(&mut self, rhs: BitBoard) {
        self.0 ^= rhs.0;
    }
}

impl fmt::Display for BitBoard {
    /// Rank 8 at the top, one row per rank, `1` for members.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let sq = Square::new(file, rank).unwrap();
                write!(f, "{}", if self.contains(sq) { '1' } else { '0' })?;
            }
            if rank > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
