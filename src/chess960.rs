//! Chess960 (Fischer-Random) starting positions.
//!
//! Uses R. Scharnagl's numbering to derive the starting array for any id in
//! [0, 960): the id locates the two bishops and the queen, and the remainder
//! indexes a table of king/rook/knight arrangements (the "KRN code").

use rand::Rng;

pub const POSITION_COUNT: u16 = 960;

/// The ten king/rook/knight fillings for the five squares left after the
/// bishops and queen are placed.
const KRN_CODES: [[char; 5]; 10] = [
    ['N', 'N', 'R', 'K', 'R'],
    ['N', 'R', 'N', 'K', 'R'],
    ['N', 'R', 'K', 'N', 'R'],
    ['N', 'R', 'K', 'R', 'N'],
    ['R', 'N', 'N', 'K', 'R'],
    ['R', 'N', 'K', 'N', 'R'],
    ['R', 'N', 'K', 'R', 'N'],
    ['R', 'K', 'N', 'N', 'R'],
    ['R', 'K', 'N', 'R', 'N'],
    ['R', 'K', 'R', 'N', 'N'],
];

/// The back-rank piece letters for a Chess960 id, a-file first.
pub fn starting_array(id: u16) -> Option<[char; 8]> {
    if id >= POSITION_COUNT {
        return None;
    }
    let mut line = [' '; 8];

    // id % 4 places the light-square bishop on b, d, f or h.
    let light = (id % 4) as usize;
    line[1 + 2 * light] = 'B';

    // The quotient % 4 places the dark-square bishop on a, c, e or g.
    let rest = id / 4;
    let dark = (rest % 4) as usize;
    line[2 * dark] = 'B';

    // The next quotient % 6 picks which vacant square takes the queen.
    let rest = rest / 4;
    let queen = (rest % 6) as usize;
    let mut vacant = 0;
    for slot in line.iter_mut() {
        if *slot == ' ' {
            if vacant == queen {
                *slot = 'Q';
                break;
            }
            vacant += 1;
        }
    }

    // What remains is the KRN code, 0..=9.
    let kern = KRN_CODES[(rest / 6) as usize];
    let mut next = 0;
    for slot in line.iter_mut() {
        if *slot == ' ' {
            *slot = kern[next];
            next += 1;
        }
    }

    Some(line)
}

/// The starting FEN for a Chess960 id, with rook-file castling rights
/// written king-side letter first, the way `FenRecord::encode` orders them.
pub fn starting_fen(id: u16) -> Option<String> {
    let line = starting_array(id)?;

    let upper: String = line.iter().collect();
    let lower = upper.to_ascii_lowercase();
    let rook_files: Vec<char> = line
        .iter()
        .enumerate()
        .filter(|(_, &piece)| piece == 'R')
        .map(|(file, _)| (b'a' + file as u8) as char)
        .rev()
        .collect();

    let castling: String = rook_files
        .iter()
        .map(|c| c.to_ascii_uppercase())
        .chain(rook_files.iter().copied())
        .collect();

    Some(format!(
        "{}/pppppppp/8/8/8/8/PPPPPPPP/{} w {} - 0 1",
        lower, upper, castling
    ))
}

pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    rng.gen_range(0..POSITION_COUNT)
}
