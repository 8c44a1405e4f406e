use arbitro::bitboard::BitBoard;
use arbitro::game::{Game, MoveError};
use arbitro::moves::Move;
use arbitro::notation::{parse_square, NotationType};
use arbitro::piece::Army;
use arbitro::rules::BoardType;

#[test]
fn move_board_destinations_are_unoccupied() {
    let game =
        Game::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
    let rules = game.rules();
    let occupied = rules.army_board(Army::White, BoardType::Positions)
        | rules.army_board(Army::Black, BoardType::Positions);

    for army in [Army::White, Army::Black] {
        for piece in game.pieces(army) {
            let moves = rules.square_board(piece.square, BoardType::Moves);
            assert_eq!(
                moves & occupied,
                BitBoard::EMPTY,
                "{army} {:?} on {}",
                piece.kind,
                piece.square
            );
        }
    }
}

#[test]
fn attacks_on_opponent_squares_are_legal_captures() {
    let game =
        Game::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
    let rules = game.rules();
    let black = rules.army_board(Army::Black, BoardType::Positions);

    for piece in game.pieces(Army::White) {
        let captures = rules.square_board(piece.square, BoardType::Attacks) & black;
        for target in captures.squares() {
            let mv = Move::from_to(piece.square, target);
            assert!(
                rules.is_legal_move(Army::White, &mv),
                "{:?} {} takes {}",
                piece.kind,
                piece.square,
                target
            );
        }
    }
}

#[test]
fn sliding_pieces_cannot_jump() {
    let mut game = Game::new();
    for text in ["d1h5", "f1c4", "a1a3"] {
        assert!(
            matches!(
                game.play_text(Army::White, text, NotationType::Computer),
                Err(MoveError::Illegal(_))
            ),
            "{text} should be blocked at the start position"
        );
    }
}

#[test]
fn pawns_never_capture_straight_ahead() {
    let mut game = Game::new();
    game.play_text(Army::White, "e2e4", NotationType::Computer)
        .unwrap();
    game.play_text(Army::Black, "e7e5", NotationType::Computer)
        .unwrap();
    assert!(matches!(
        game.play_text(Army::White, "e4e5", NotationType::Computer),
        Err(MoveError::Illegal(_))
    ));
}

#[test]
fn standard_notation_disambiguates_by_file_and_rank() {
    let mut game = Game::from_fen("k7/8/8/8/R6R/8/8/4K3 w - - 0 1").unwrap();
    game.play_text(Army::White, "Rad4", NotationType::Standard)
        .unwrap();
    assert!(game.piece_at(parse_square("d4").unwrap()).is_some());
    assert!(game.piece_at(parse_square("a4").unwrap()).is_none());
    assert!(game.piece_at(parse_square("h4").unwrap()).is_some());
}

#[test]
fn unresolvable_text_reports_an_error() {
    let mut game = Game::new();
    // No knight reaches e5 from the start position.
    assert_eq!(
        game.play_text(Army::White, "Ne5", NotationType::Standard),
        Err(MoveError::UnresolvedOrigin)
    );
}

#[test]
fn moving_the_opponents_piece_is_illegal() {
    let mut game = Game::new();
    assert!(matches!(
        game.play_text(Army::White, "e7e5", NotationType::Computer),
        Err(MoveError::Illegal(_))
    ));
}

#[test]
fn defend_boards_cover_protected_friends_only() {
    let game = Game::new();
    let rules = game.rules();

    // The b1 knight protects the d2 pawn and nothing across the divide.
    let defends = rules.square_board(parse_square("b1").unwrap(), BoardType::Defends);
    assert!(defends.contains(parse_square("d2").unwrap()));
    assert_eq!(
        defends & rules.army_board(Army::Black, BoardType::Positions),
        BitBoard::EMPTY
    );

    let defenders = rules.square_board(parse_square("d2").unwrap(), BoardType::DefendedBy);
    assert!(defenders.contains(parse_square("b1").unwrap()));
    assert!(defenders.contains(parse_square("d1").unwrap()));
}
