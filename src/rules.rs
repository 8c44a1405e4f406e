//! The legality and attack engine.
//!
//! All derived state lives in a [`PositionIndex`]: per-army, per-piece-kind
//! and per-origin-square position/move/attack/defend bitboards. The index is
//! rebuilt from the piece placement by a full rescan after every accepted
//! move; nothing is updated incrementally. Queries are pure reads against the
//! last rebuilt index.

use std::collections::HashMap;

use crate::bitboard::BitBoard;
use crate::moves::{CastleSide, Move};
use crate::piece::{Army, Piece, PieceKind};
use crate::square::Square;

/// Scope selector for [`Rules::square_board`] and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardType {
    Positions,
    Moves,
    Attacks,
    Defends,
    AttackedBy,
    DefendedBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// How a ray registers the squares it visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RayMode {
    /// Empty squares are moves and attacks; the first enemy square is an
    /// attack, the first friendly square a defend. Everything but pawns.
    MoveAndAttack,
    /// Pawn pushes: empty squares are moves, any occupant blocks, no captures.
    Push,
    /// Pawn forward diagonals: empty or enemy squares are attacks, a friendly
    /// square is a defend; never a plain move.
    AttackOnly,
}

#[derive(Debug, Clone, Copy, Default)]
struct RaySets {
    moves: BitBoard,
    attacks: BitBoard,
    defends: BitBoard,
}

/// Per-side castling availability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastleRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastleRights {
    pub fn get(&self, army: Army, side: CastleSide) -> bool {
        match (army, side) {
            (Army::White, CastleSide::KingSide) => self.white_king_side,
            (Army::White, CastleSide::QueenSide) => self.white_queen_side,
            (Army::Black, CastleSide::KingSide) => self.black_king_side,
            (Army::Black, CastleSide::QueenSide) => self.black_queen_side,
        }
    }

    pub fn set(&mut self, army: Army, side: CastleSide, available: bool) {
        match (army, side) {
            (Army::White, CastleSide::KingSide) => self.white_king_side = available,
            (Army::White, CastleSide::QueenSide) => self.white_queen_side = available,
            (Army::Black, CastleSide::KingSide) => self.black_king_side = available,
            (Army::Black, CastleSide::QueenSide) => self.black_queen_side = available,
        }
    }

    pub fn any(&self) -> bool {
        self.white_king_side || self.white_queen_side || self.black_king_side || self.black_queen_side
    }
}

/// Derived board state, rebuilt wholesale from the placement.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    army_positions: [BitBoard; 2],
    army_moves: [BitBoard; 2],
    army_attacks: [BitBoard; 2],
    kind_positions: [BitBoard; 6],
    kind_moves: [BitBoard; 6],
    kind_attacks: [BitBoard; 6],
    square_moves: HashMap<u8, BitBoard>,
    square_attacks: HashMap<u8, BitBoard>,
    square_defends: HashMap<u8, BitBoard>,
}

impl PositionIndex {
    /// Full rescan of both placements: occupancy first, then every piece's
    /// ray sets, aggregated per army and per piece kind.
    pub fn regenerate(white: &HashMap<u8, Piece>, black: &HashMap<u8, Piece>) -> PositionIndex {
        let mut index = PositionIndex {
            army_positions: [
                white.values().map(|p| p.square).collect(),
                black.values().map(|p| p.square).collect(),
            ],
            ..PositionIndex::default()
        };

        for piece in white.values().chain(black.values()) {
            index.kind_positions[piece.kind as usize].set(piece.square);
        }

        let occupancy = index.army_positions;
        for piece in white.values().chain(black.values()) {
            let sets = ray_sets(piece, occupancy);
            index.square_moves.insert(piece.square.index(), sets.moves);
            index.square_attacks.insert(piece.square.index(), sets.attacks);
            index.square_defends.insert(piece.square.index(), sets.defends);
            index.army_moves[piece.army as usize] |= sets.moves;
            index.army_attacks[piece.army as usize] |= sets.attacks;
            index.kind_moves[piece.kind as usize] |= sets.moves;
            index.kind_attacks[piece.kind as usize] |= sets.attacks;
        }

        index
    }
}

fn cast_ray(
    origin: Square,
    direction: Direction,
    magnitude: u8,
    own: BitBoard,
    enemy: BitBoard,
    mode: RayMode,
    sets: &mut RaySets,
) {
    let (df, dr) = direction.delta();
    let mut current = origin;
    for _ in 0..magnitude {
        let Some(next) = current.offset(df, dr) else {
            break;
        };
        match mode {
            RayMode::Push => {
                if own.contains(next) || enemy.contains(next) {
                    break;
                }
                sets.moves.set(next);
            }
            RayMode::MoveAndAttack => {
                if own.contains(next) {
                    sets.defends.set(next);
                    break;
                }
                if enemy.contains(next) {
                    sets.attacks.set(next);
                    break;
                }
                sets.moves.set(next);
                sets.attacks.set(next);
            }
            RayMode::AttackOnly => {
                if own.contains(next) {
                    sets.defends.set(next);
                    break;
                }
                sets.attacks.set(next);
                if enemy.contains(next) {
                    break;
                }
            }
        }
        current = next;
    }
}

fn ray_sets(piece: &Piece, occupancy: [BitBoard; 2]) -> RaySets {
    let (own, enemy) = match piece.army {
        Army::White => (occupancy[0], occupancy[1]),
        Army::Black => (occupancy[1], occupancy[0]),
    };
    let origin = piece.square;
    let mut sets = RaySets::default();

    match piece.kind {
        PieceKind::King => {
            for dir in Direction::ALL {
                cast_ray(origin, dir, 1, own, enemy, RayMode::MoveAndAttack, &mut sets);
            }
        }
        PieceKind::Queen => {
            for dir in Direction::ALL {
                cast_ray(origin, dir, 7, own, enemy, RayMode::MoveAndAttack, &mut sets);
            }
        }
        PieceKind::Rook => {
            for dir in Direction::CARDINAL {
                cast_ray(origin, dir, 7, own, enemy, RayMode::MoveAndAttack, &mut sets);
            }
        }
        PieceKind::Bishop => {
            for dir in Direction::DIAGONAL {
                cast_ray(origin, dir, 7, own, enemy, RayMode::MoveAndAttack, &mut sets);
            }
        }
        PieceKind::Knight => {
            for (df, dr) in KNIGHT_OFFSETS {
                if let Some(target) = origin.offset(df, dr) {
                    if own.contains(target) {
                        sets.defends.set(target);
                    } else {
                        sets.attacks.set(target);
                        if !enemy.contains(target) {
                            sets.moves.set(target);
                        }
                    }
                }
            }
        }
        PieceKind::Pawn => {
            let (push, diagonals, start_rank) = match piece.army {
                Army::White => (
                    Direction::North,
                    [Direction::NorthEast, Direction::NorthWest],
                    1,
                ),
                Army::Black => (
                    Direction::South,
                    [Direction::SouthEast, Direction::SouthWest],
                    6,
                ),
            };
            let magnitude = if origin.rank() == start_rank { 2 } else { 1 };
            cast_ray(origin, push, magnitude, own, enemy, RayMode::Push, &mut sets);
            for dir in diagonals {
                cast_ray(origin, dir, 1, own, enemy, RayMode::AttackOnly, &mut sets);
            }
        }
    }

    sets
}

/// Squares strictly between `from` and `to` when they share a file, rank or
/// diagonal; empty otherwise (knight relations, adjacency).
pub fn ray_between(from: Square, to: Square) -> BitBoard {
    let file_delta = to.file() as i8 - from.file() as i8;
    let rank_delta = to.rank() as i8 - from.rank() as i8;

    let aligned = file_delta == 0 || rank_delta == 0 || file_delta.abs() == rank_delta.abs();
    if !aligned {
        return BitBoard::EMPTY;
    }

    let df = file_delta.signum();
    let dr = rank_delta.signum();
    let mut between = BitBoard::EMPTY;
    let mut current = from;
    loop {
        let Some(next) = current.offset(df, dr) else {
            break;
        };
        if next == to {
            break;
        }
        between.set(next);
        current = next;
    }
    between
}

pub struct Rules {
    index: PositionIndex,
    rights: CastleRights,
    en_passant: Option<Square>,
    king_rook_file: u8,
    queen_rook_file: u8,
    // [army][side]: back-rank span covering king and rook start/target squares
    corridors: [[BitBoard; 2]; 2],
}

impl Rules {
    pub fn new() -> Rules {
        Rules {
            index: PositionIndex::default(),
            rights: CastleRights::default(),
            en_passant: None,
            king_rook_file: 7,
            queen_rook_file: 0,
            corridors: [[BitBoard::EMPTY; 2]; 2],
        }
    }

    /// Rebuilds every derived board from the placement, in dependency order:
    /// positions, then moves/attacks, then the castle corridors.
    pub fn refresh(&mut self, white: &HashMap<u8, Piece>, black: &HashMap<u8, Piece>) {
        self.index = PositionIndex::regenerate(white, black);
        self.refresh_castle_corridors();
    }

    pub fn set_rook_files(&mut self, king_rook_file: u8, queen_rook_file: u8) {
        self.king_rook_file = king_rook_file;
        self.queen_rook_file = queen_rook_file;
    }

    pub fn king_rook_file(&self) -> u8 {
        self.king_rook_file
    }

    pub fn queen_rook_file(&self) -> u8 {
        self.queen_rook_file
    }

    pub fn set_en_passant_target(&mut self, target: Option<Square>) {
        self.en_passant = target;
    }

    pub fn castle_rights(&self) -> CastleRights {
        self.rights
    }

    pub fn set_castle_rights(&mut self, rights: CastleRights) {
        self.rights = rights;
    }

    pub fn is_castle_available(&self, army: Army, side: CastleSide) -> bool {
        self.rights.get(army, side)
    }

    pub fn set_castle_available(&mut self, army: Army, side: CastleSide, available: bool) {
        self.rights.set(army, side, available);
    }

    pub fn army_board(&self, army: Army, board: BoardType) -> BitBoard {
        match board {
            BoardType::Positions => self.index.army_positions[army as usize],
            BoardType::Moves => self.index.army_moves[army as usize],
            BoardType::Attacks => self.index.army_attacks[army as usize],
            _ => BitBoard::EMPTY,
        }
    }

    pub fn kind_board(&self, kind: PieceKind, board: BoardType) -> BitBoard {
        match board {
            BoardType::Positions => self.index.kind_positions[kind as usize],
            BoardType::Moves => self.index.kind_moves[kind as usize],
            BoardType::Attacks => self.index.kind_attacks[kind as usize],
            _ => BitBoard::EMPTY,
        }
    }

    pub fn square_board(&self, square: Square, board: BoardType) -> BitBoard {
        let cached = |map: &HashMap<u8, BitBoard>| {
            map.get(&square.index()).copied().unwrap_or(BitBoard::EMPTY)
        };
        match board {
            BoardType::Positions => BitBoard::from(square),
            BoardType::Moves => cached(&self.index.square_moves),
            BoardType::Attacks => cached(&self.index.square_attacks),
            BoardType::Defends => cached(&self.index.square_defends),
            BoardType::AttackedBy => Self::origins_reaching(&self.index.square_attacks, square),
            BoardType::DefendedBy => Self::origins_reaching(&self.index.square_defends, square),
        }
    }

    /// Every origin square whose cached set contains `target`.
    fn origins_reaching(map: &HashMap<u8, BitBoard>, target: Square) -> BitBoard {
        let mut origins = BitBoard::EMPTY;
        for (&index, board) in map {
            if board.contains(target) {
                // Index keys come from Square::index, always < 64.
                origins.set(Square::from_index(index).expect("cached origin index"));
            }
        }
        origins
    }

    pub fn castle_corridor(&self, army: Army, side: CastleSide) -> BitBoard {
        self.corridors[army as usize][side as usize]
    }

    /// King destination file for a castle: g-file king side, c-file queen side.
    pub fn castle_king_target(&self, army: Army, side: CastleSide) -> Square {
        let file = match side {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        };
        Square::new(file, army.back_rank()).expect("castle target on board")
    }

    /// Rook destination file for a castle: f-file king side, d-file queen side.
    pub fn castle_rook_target(&self, army: Army, side: CastleSide) -> Square {
        let file = match side {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        };
        Square::new(file, army.back_rank()).expect("castle target on board")
    }

    fn castle_rook_file(&self, side: CastleSide) -> u8 {
        match side {
            CastleSide::KingSide => self.king_rook_file,
            CastleSide::QueenSide => self.queen_rook_file,
        }
    }

    fn king_square(&self, army: Army) -> Option<Square> {
        (self.kind_board(PieceKind::King, BoardType::Positions)
            & self.army_board(army, BoardType::Positions))
        .first()
    }

    fn refresh_castle_corridors(&mut self) {
        for army in [Army::White, Army::Black] {
            let back = army.back_rank();
            let king_file = self
                .king_square(army)
                .filter(|king| king.rank() == back)
                .map(|king| king.file());
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                let corridor = match king_file {
                    Some(king_file) => {
                        let rook_file = self.castle_rook_file(side);
                        let king_target = self.castle_king_target(army, side).file();
                        let rook_target = self.castle_rook_target(army, side).file();
                        let lo = king_file.min(rook_file).min(king_target).min(rook_target);
                        let hi = king_file.max(rook_file).max(king_target).max(rook_target);
                        (lo..=hi)
                            .map(|file| Square::new(file, back).expect("corridor square"))
                            .collect()
                    }
                    None => BitBoard::EMPTY,
                };
                self.corridors[army as usize][side as usize] = corridor;
            }
        }
    }

    /// A move is legal iff its destination is in the origin's move set, or is
    /// a capture in the origin's attack set, or is a valid en-passant
    /// capture, or is a legal castle onto the king's castle target square.
    pub fn is_legal_move(&self, army: Army, mv: &Move) -> bool {
        let (Some(from), Some(to)) = (mv.from, mv.to) else {
            return false;
        };
        if !self.army_board(army, BoardType::Positions).contains(from) {
            return false;
        }

        if self.square_board(from, BoardType::Moves).contains(to) {
            return true;
        }

        let opponent = self.army_board(army.opponent(), BoardType::Positions);
        let attacks = self.square_board(from, BoardType::Attacks);
        if (attacks & opponent).contains(to) {
            return true;
        }

        // En passant: a pawn attack onto the current target square.
        if self.en_passant == Some(to)
            && self.kind_board(PieceKind::Pawn, BoardType::Positions).contains(from)
            && attacks.contains(to)
        {
            return true;
        }

        if let Some(side) = mv.castle {
            return to == self.castle_king_target(army, side) && self.is_castle_legal(army, side);
        }

        false
    }

    /// Castling requires the availability flag and a corridor that is neither
    /// attacked by the opponent nor occupied by anything but the king and the
    /// castling rook (which must still be on its file). The rook's own square
    /// is exempt from the attack test; the king's is not, so castling out of
    /// check stays illegal.
    pub fn is_castle_legal(&self, army: Army, side: CastleSide) -> bool {
        if !self.is_castle_available(army, side) {
            return false;
        }
        let Some(king) = self.king_square(army) else {
            return false;
        };
        let Some(rook) = Square::new(self.castle_rook_file(side), army.back_rank()) else {
            return false;
        };

        let own = self.army_board(army, BoardType::Positions);
        let rooks = self.kind_board(PieceKind::Rook, BoardType::Positions);
        if !(own & rooks).contains(rook) {
            return false;
        }

        let corridor = self.castle_corridor(army, side);
        let occupancy =
            own | self.army_board(army.opponent(), BoardType::Positions);
        let king_and_rook = BitBoard::from(king) | BitBoard::from(rook);
        if !((corridor ^ king_and_rook) & occupancy).is_clear() {
            return false;
        }

        let attacked = self.army_board(army.opponent(), BoardType::Attacks);
        (corridor & !BitBoard::from(rook) & attacked).is_clear()
    }

    pub fn is_checked(&self, army: Army) -> bool {
        let king = self.kind_board(PieceKind::King, BoardType::Positions)
            & self.army_board(army, BoardType::Positions);
        !(king & self.army_board(army.opponent(), BoardType::Attacks)).is_clear()
    }

    /// Mate test, evaluated only when checked: no king move escapes the
    /// opponent's attack board, the king cannot capture an undefended
    /// adjacent enemy piece, and (for a single attacker) no friendly piece
    /// can capture it and no friendly non-king piece can interpose on the
    /// attack ray. Any doubt resolves to "not mate".
    pub fn is_check_mated(&self, army: Army) -> bool {
        if !self.is_checked(army) {
            return false;
        }
        let Some(king) = self.king_square(army) else {
            return false;
        };
        let opponent_attacks = self.army_board(army.opponent(), BoardType::Attacks);
        let opponent_positions = self.army_board(army.opponent(), BoardType::Positions);

        let king_moves = self.square_board(king, BoardType::Moves);
        if !(king_moves & !opponent_attacks).is_clear() {
            return false;
        }

        // Occupied squares never appear in the opponent's attack board, so
        // king captures are tested through the target's defenders instead.
        let adjacent_enemies = self.square_board(king, BoardType::Attacks) & opponent_positions;
        for target in adjacent_enemies.squares() {
            if (self.square_board(target, BoardType::DefendedBy) & opponent_positions).is_clear() {
                return false;
            }
        }

        let attackers = self.square_board(king, BoardType::AttackedBy) & opponent_positions;
        if attackers.count() > 1 {
            // With the king pinned down, nothing answers a double check.
            return true;
        }
        let Some(attacker) = attackers.first() else {
            return false;
        };

        if self.army_board(army, BoardType::Attacks).contains(attacker) {
            return false;
        }

        let ray = ray_between(attacker, king);
        let mut interpositions = BitBoard::EMPTY;
        for sq in (self.army_board(army, BoardType::Positions)
            & !BitBoard::from(king))
        .squares()
        {
            interpositions |= self.square_board(sq, BoardType::Moves);
        }
        if !(interpositions & ray).is_clear() {
            return false;
        }

        true
    }

    /// Resolves a move's missing origin: candidates are the positions of the
    /// moving piece kind within the army, narrowed by any departure hints,
    /// then the first candidate whose cached move or attack set contains the
    /// destination. Castle moves always resolve to the king.
    pub fn guess_square(&self, army: Army, mv: &Move) -> Option<Square> {
        if mv.castle.is_some() {
            return self.king_square(army);
        }

        let kind = mv.kind?;
        let to = mv.to?;

        let mut candidates = self.kind_board(kind, BoardType::Positions)
            & self.army_board(army, BoardType::Positions);
        if let Some(file) = mv.file_hint() {
            candidates &= BitBoard::file(file);
        }
        if let Some(rank) = mv.rank_hint() {
            candidates &= BitBoard::rank(rank);
        }

        candidates.squares().find(|&candidate| {
            self.square_board(candidate, BoardType::Moves).contains(to)
                || self.square_board(candidate, BoardType::Attacks).contains(to)
        })
    }
}

impl Default for Rules {
    fn default() -> Rules {
        Rules::new()
    }
}
