use arbitro::game::{Game, MoveError};
use arbitro::moves::CastleSide;
use arbitro::notation::{parse_square, NotationType};
use arbitro::piece::{Army, PieceKind};

const BOTH_WINGS: &str = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

fn kind_at(game: &Game, name: &str) -> Option<PieceKind> {
    game.piece_at(parse_square(name).unwrap()).map(|p| p.kind)
}

#[test]
fn king_side_castle_moves_both_pieces() {
    let mut game = Game::from_fen(BOTH_WINGS).unwrap();
    game.play_text(Army::White, "O-O", NotationType::Standard)
        .unwrap();

    assert_eq!(kind_at(&game, "g1"), Some(PieceKind::King));
    assert_eq!(kind_at(&game, "f1"), Some(PieceKind::Rook));
    assert_eq!(kind_at(&game, "e1"), None);
    assert_eq!(kind_at(&game, "h1"), None);

    // Both of the mover's rights go away, the opponent's stay.
    let rights = game.rules().castle_rights();
    assert!(!rights.white_king_side && !rights.white_queen_side);
    assert!(rights.black_king_side && rights.black_queen_side);
}

#[test]
fn queen_side_castle_from_computer_notation() {
    let mut game = Game::from_fen(BOTH_WINGS).unwrap();
    game.play_text(Army::White, "e1c1", NotationType::Computer)
        .unwrap();
    assert_eq!(kind_at(&game, "c1"), Some(PieceKind::King));
    assert_eq!(kind_at(&game, "d1"), Some(PieceKind::Rook));
    assert_eq!(kind_at(&game, "a1"), None);
}

#[test]
fn occupied_corridor_blocks_only_that_wing() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
    assert!(!game.rules().is_castle_legal(Army::White, CastleSide::QueenSide));
    assert!(game.rules().is_castle_legal(Army::White, CastleSide::KingSide));
    assert!(matches!(
        game.play_text(Army::White, "O-O-O", NotationType::Standard),
        Err(MoveError::Illegal(_))
    ));
    game.play_text(Army::White, "O-O", NotationType::Standard)
        .unwrap();
}

#[test]
fn attacked_corridor_blocks_only_that_wing() {
    // The rook on f3 covers f1 but nothing on the queen-side span.
    let game = Game::from_fen("r3k2r/8/8/8/8/5r2/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(!game.rules().is_castle_legal(Army::White, CastleSide::KingSide));
    assert!(game.rules().is_castle_legal(Army::White, CastleSide::QueenSide));
}

#[test]
fn each_corridor_square_blocks_on_its_own() {
    // A knight parked on any square the king or rook crosses kills that
    // wing and only that wing.
    let blockers = [
        ("r3k2r/8/8/8/8/8/8/R3KN1R w KQkq - 0 1", CastleSide::KingSide),
        ("r3k2r/8/8/8/8/8/8/R3K1NR w KQkq - 0 1", CastleSide::KingSide),
        ("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1", CastleSide::QueenSide),
        ("r3k2r/8/8/8/8/8/8/R1N1K2R w KQkq - 0 1", CastleSide::QueenSide),
        ("r3k2r/8/8/8/8/8/8/R2NK2R w KQkq - 0 1", CastleSide::QueenSide),
    ];
    for (fen, blocked) in blockers {
        let game = Game::from_fen(fen).unwrap();
        let clear = match blocked {
            CastleSide::KingSide => CastleSide::QueenSide,
            CastleSide::QueenSide => CastleSide::KingSide,
        };
        assert!(
            !game.rules().is_castle_legal(Army::White, blocked),
            "castle should be blocked in {fen}"
        );
        assert!(
            game.rules().is_castle_legal(Army::White, clear),
            "other wing should stay open in {fen}"
        );
    }
}

#[test]
fn castling_out_of_check_is_illegal() {
    // The e-file rook checks the king; both corridors contain e1.
    let game = Game::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    assert!(!game.rules().is_castle_legal(Army::White, CastleSide::KingSide));
    assert!(!game.rules().is_castle_legal(Army::White, CastleSide::QueenSide));
}

#[test]
fn moving_a_rook_forfeits_that_wing_for_good() {
    let mut game = Game::from_fen(BOTH_WINGS).unwrap();
    for (army, text) in [
        (Army::White, "a1b1"),
        (Army::Black, "a8b8"),
        (Army::White, "b1a1"),
        (Army::Black, "b8a8"),
    ] {
        game.play_text(army, text, NotationType::Computer).unwrap();
    }

    // The rooks are back home but the rights stay gone.
    assert!(!game.rules().is_castle_legal(Army::White, CastleSide::QueenSide));
    assert!(!game.rules().is_castle_legal(Army::Black, CastleSide::QueenSide));
    assert!(game.rules().is_castle_legal(Army::White, CastleSide::KingSide));
}

#[test]
fn capturing_a_rook_clears_the_victims_right() {
    let mut game = Game::from_fen("rn2k2r/R7/8/8/8/8/8/4K3 w kq - 0 1").unwrap();
    game.play_text(Army::White, "a7a8", NotationType::Computer)
        .unwrap();

    assert!(!game.rules().is_castle_available(Army::Black, CastleSide::QueenSide));
    assert!(game.rules().is_castle_available(Army::Black, CastleSide::KingSide));
    game.play_text(Army::Black, "O-O", NotationType::Standard)
        .unwrap();
}

#[test]
fn chess960_castle_by_king_onto_rook() {
    // King d1, rooks a1 and h1; queen-side castling lands the rook on the
    // king's own starting square.
    let fen = "r2k3r/8/8/8/8/8/8/R2K3R w HAha - 0 1";
    let mut game = Game::from_fen_chess960(fen).unwrap();
    assert!(game.rules().is_castle_legal(Army::White, CastleSide::QueenSide));

    game.play_text(Army::White, "d1a1", NotationType::Computer)
        .unwrap();
    assert_eq!(kind_at(&game, "c1"), Some(PieceKind::King));
    assert_eq!(kind_at(&game, "d1"), Some(PieceKind::Rook));
    assert_eq!(kind_at(&game, "a1"), None);
    assert_eq!(kind_at(&game, "b1"), None);
}

#[test]
fn chess960_corridor_covers_every_start_and_target_square() {
    // King c1, rooks b1 and d1. Kingside is off while the g1 bishop sits on
    // the king's destination; queenside is off because the d1 rook sits on
    // the castling rook's destination.
    let fen = "1rkr2b1/pppppppp/8/8/8/8/PPPPPPPP/1RKR2B1 w DBdb - 0 1";
    let game = Game::from_fen_chess960(fen).unwrap();
    assert!(!game.rules().is_castle_legal(Army::White, CastleSide::KingSide));
    assert!(!game.rules().is_castle_legal(Army::White, CastleSide::QueenSide));
}
