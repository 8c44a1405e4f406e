use arbitro::game::{Game, GameResult, MoveError};
use arbitro::notation::{parse_square, NotationType};
use arbitro::piece::{Army, PieceKind};

#[test]
fn en_passant_window_opens_and_closes() {
    let mut game = Game::new();
    game.play_text(Army::White, "e2e4", NotationType::Computer)
        .unwrap();
    assert_eq!(game.en_passant_target(), Some(parse_square("e3").unwrap()));
    assert!(game.fen().contains(" e3 "));

    // Any reply closes the window, used or not.
    game.play_text(Army::Black, "g8f6", NotationType::Computer)
        .unwrap();
    assert_eq!(game.en_passant_target(), None);
    assert!(game.fen().contains(" - "));
}

#[test]
fn en_passant_capture_removes_the_bypassing_pawn() {
    let mut game = Game::new();
    for (army, text) in [
        (Army::White, "e2e4"),
        (Army::Black, "a7a6"),
        (Army::White, "e4e5"),
        (Army::Black, "d7d5"),
        (Army::White, "e5d6"),
    ] {
        game.play_text(army, text, NotationType::Computer).unwrap();
    }

    assert_eq!(
        game.piece_at(parse_square("d6").unwrap()).map(|p| p.kind),
        Some(PieceKind::Pawn)
    );
    assert!(game.piece_at(parse_square("d5").unwrap()).is_none());
    assert_eq!(game.captured_pieces(Army::Black).len(), 1);
    assert!(game.history(Army::White).last().unwrap().en_passant);
}

#[test]
fn en_passant_rejected_after_the_window_closed() {
    // Same pawns, but the bypass happened a move ago.
    let mut game =
        Game::from_fen("rnbqkbnr/pp2pppp/2p5/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3")
            .unwrap();
    assert!(matches!(
        game.play_text(Army::White, "e5d6", NotationType::Computer),
        Err(MoveError::Illegal(_))
    ));
}

#[test]
fn halfmove_clock_draw_on_the_49th_quiet_move() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 48 60").unwrap();
    game.play_text(Army::White, "e1e2", NotationType::Computer)
        .unwrap();
    assert_eq!(game.half_move_clock(), 49);
    assert_eq!(game.result(), Some(GameResult::HalfMoveDraw));
}

#[test]
fn pawn_moves_and_captures_reset_the_clock() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 48 60").unwrap();
    game.play_text(Army::White, "e2e3", NotationType::Computer)
        .unwrap();
    assert_eq!(game.half_move_clock(), 0);
    assert_eq!(game.result(), None);
}

#[test]
fn fullmove_number_increments_after_black() {
    let mut game = Game::new();
    assert_eq!(game.full_move_number(), 1);
    game.play_text(Army::White, "e2e4", NotationType::Computer)
        .unwrap();
    assert_eq!(game.full_move_number(), 1);
    game.play_text(Army::Black, "e7e5", NotationType::Computer)
        .unwrap();
    assert_eq!(game.full_move_number(), 2);
}

#[test]
fn promotion_via_standard_notation() {
    let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    game.play_text(Army::White, "a8=Q", NotationType::Standard)
        .unwrap();
    assert_eq!(
        game.piece_at(parse_square("a8").unwrap()).map(|p| p.kind),
        Some(PieceKind::Queen)
    );
}

#[test]
fn captured_pieces_accumulate_in_order() {
    let mut game = Game::new();
    for (army, text) in [
        (Army::White, "e2e4"),
        (Army::Black, "d7d5"),
        (Army::White, "e4d5"),
        (Army::Black, "d8d5"),
        (Army::White, "b1c3"),
        (Army::Black, "d5d2"),
        (Army::White, "d1d2"),
    ] {
        game.play_text(army, text, NotationType::Computer).unwrap();
    }

    let black_losses: Vec<PieceKind> = game
        .captured_pieces(Army::Black)
        .iter()
        .map(|p| p.kind)
        .collect();
    assert_eq!(black_losses, vec![PieceKind::Pawn, PieceKind::Queen]);

    let white_losses: Vec<PieceKind> = game
        .captured_pieces(Army::White)
        .iter()
        .map(|p| p.kind)
        .collect();
    assert_eq!(white_losses, vec![PieceKind::Pawn, PieceKind::Pawn]);
}

#[test]
fn chess960_games_start_from_a_playable_array() {
    let mut game = Game::new_chess960(Some(518)).unwrap();
    assert!(game.is_chess960());
    game.play_text(Army::White, "e2e4", NotationType::Computer)
        .unwrap();
    assert_eq!(game.full_move_number(), 1);

    assert!(Game::new_chess960(Some(960)).is_none());
}
