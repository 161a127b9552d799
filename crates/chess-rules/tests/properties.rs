//! Property tests over random playouts from the starting position.

use chess_core::Side;
use chess_rules::pgn::{parse_pgn, to_pgn};
use chess_rules::{is_in_check, make_move, Game, PgnTags, RuleSet, StandardChess};
use proptest::prelude::*;

/// Plays up to `choices.len()` plies, each time picking the legal move at
/// `choice % legal.len()`. Stops early when the game ends.
fn playout(choices: &[usize]) -> Game {
    let mut game = Game::new();
    for &choice in choices {
        if !game.is_active() {
            break;
        }
        let legal = game.legal_moves();
        let mov = legal[choice % legal.len()];
        game.apply_move(mov.coord()).expect("generated move is legal");
    }
    game
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn mover_is_never_left_in_check(choices in prop::collection::vec(any::<usize>(), 0..80)) {
        let game = playout(&choices);
        for played in game.record() {
            let mover = played.position.side_to_move().opposite();
            prop_assert!(!is_in_check(&played.position, mover));
        }
    }

    #[test]
    fn every_legal_move_validates(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        let game = playout(&choices);
        let position = game.position();
        for mov in StandardChess.legal_moves(position).iter() {
            prop_assert_eq!(StandardChess.validate(position, mov.coord()), Ok(*mov));
        }
    }

    #[test]
    fn undo_restores_previous_positions(choices in prop::collection::vec(any::<usize>(), 1..60)) {
        let mut game = playout(&choices);
        prop_assume!(game.is_active());
        let mut expected: Vec<_> = std::iter::once(game.start_position().clone())
            .chain(game.record().iter().map(|p| p.position.clone()))
            .collect();
        expected.pop();
        while let Some(previous) = expected.pop() {
            game.undo().unwrap();
            prop_assert_eq!(game.position(), &previous);
        }
        prop_assert_eq!(game.side_to_move(), Side::White);
    }

    #[test]
    fn every_legal_move_undoes_at_every_ply(choices in prop::collection::vec(any::<usize>(), 1..30)) {
        let mut game = Game::new();
        for &choice in &choices {
            if !game.is_active() {
                break;
            }
            let before = game.position().clone();
            let plies = game.ply_count();
            let legal = game.legal_moves();
            for mov in legal.iter() {
                let mut trial = game.clone();
                trial.apply_move(mov.coord()).unwrap();
                if trial.is_active() {
                    trial.undo().unwrap();
                    prop_assert_eq!(trial.position(), &before);
                    prop_assert_eq!(trial.ply_count(), plies);
                } else {
                    // A finished game keeps its record.
                    prop_assert!(trial.undo().is_err());
                    prop_assert_eq!(&trial.record()[plies].position, &make_move(&before, mov));
                }
            }
            game.apply_move(legal[choice % legal.len()].coord()).unwrap();
        }
    }

    #[test]
    fn pgn_round_trip_preserves_record(choices in prop::collection::vec(any::<usize>(), 1..100)) {
        let game = playout(&choices);
        let text = to_pgn(&game, &PgnTags::default());
        let loaded = parse_pgn(&text).unwrap();
        prop_assert_eq!(loaded.game.record(), game.record());
        prop_assert_eq!(loaded.game.result(), game.result());
    }
}
