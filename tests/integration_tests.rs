//! Integration tests for pushover-rust
//!
//! These exercise the public API end to end: rules, the undo journal, the
//! evaluator, search and the game driver.

use pushover_rust::board::{Board, Color, Direction, Point, Token};
use pushover_rust::difficulty::Difficulty;
use pushover_rust::engine::Engine;
use pushover_rust::eval::evaluate;
use pushover_rust::game::{Game, Outcome};
use pushover_rust::journal::Journal;
use pushover_rust::rules::{Move, apply_move, generate_moves};
use pushover_rust::search::{alpha_beta, minimax};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Play `plies` random legal moves from the starting position.
/// Stops early if the game ends.
fn random_game(seed: u64, plies: usize) -> Game {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut game = Game::new();
    for _ in 0..plies {
        if game.is_over() {
            break;
        }
        let moves = game.legal_moves();
        let mv = &moves[rng.usize(..moves.len())];
        game.play(mv).unwrap();
    }
    game
}

/// Positions reached along a handful of random games.
fn sample_positions() -> Vec<(Board, Color)> {
    let mut positions = Vec::new();
    for seed in 0..8 {
        for plies in [0, 3, 9, 17, 30] {
            let game = random_game(seed, plies);
            positions.push((game.board().clone(), game.to_move()));
        }
    }
    positions
}

// =============================================================================
// Rule properties
// =============================================================================

#[test]
fn test_apply_undo_round_trip() {
    for (board, color) in sample_positions() {
        let mut work = board.clone();
        let mut journal = Journal::new();
        for mv in generate_moves(&board, color) {
            journal.apply(&mut work, &mv, color).unwrap();
            // one reply deep, so nested frames unwind too
            if let Some(reply) = generate_moves(&work, color.opponent()).first() {
                journal.apply(&mut work, reply, color.opponent()).unwrap();
                journal.undo(&mut work).unwrap();
            }
            journal.undo(&mut work).unwrap();
            assert_eq!(work, board, "undo of {mv} did not restore the board");
        }
        assert!(journal.is_empty());
    }
}

#[test]
fn test_generated_moves_always_apply() {
    for (board, color) in sample_positions() {
        for mv in generate_moves(&board, color) {
            if let Move::Push { pushed_line, .. } = &mv {
                let last = *pushed_line.last().unwrap();
                let past = last.step(mv_direction(&mv)).unwrap();
                assert!(board.is_empty_at(past), "{mv} pushes into an occupied cell");
            }
            let mut work = board.clone();
            assert!(apply_move(&mut work, &mv, color).is_ok(), "{mv} rejected");
        }
    }
}

fn mv_direction(mv: &Move) -> Direction {
    match mv {
        Move::Push { direction, .. } => *direction,
        Move::Simple { .. } => unreachable!(),
    }
}

#[test]
fn test_capture_symmetry() {
    // A token at c3 walled in on three sides; the fourth side is closed by
    // a move from e3 to d3. Every pairing of colors captures.
    for surrounded in [Color::Black, Color::White] {
        for mover in [Color::Black, Color::White] {
            let mut board = Board::empty();
            board.set_token_at(Point::new(2, 2), Some(Token::new(surrounded)));
            board.set_token_at(Point::new(1, 2), Some(Token::new(Color::Black)));
            board.set_token_at(Point::new(3, 2), Some(Token::new(Color::White)));
            board.set_token_at(Point::new(2, 1), Some(Token::new(mover.opponent())));
            board.set_token_at(Point::new(2, 4), Some(Token::new(mover)));

            let mv = Move::Simple {
                from: Point::new(2, 4),
                to: Point::new(2, 3),
            };
            let captured = apply_move(&mut board, &mv, mover).unwrap();
            assert_eq!(captured.len(), 1);
            assert_eq!(captured[0].at, Point::new(2, 2));
            assert_eq!(captured[0].color, surrounded);
            assert!(board.token_at(Point::new(2, 2)).unwrap().captured);
        }
    }
}

#[test]
fn test_terminal_scores_are_exact() {
    let black_lost = Board::from_diagram(
        "
        x . x . x
        . x x x .
        . . . . .
        . . . W .
        . . . . .
        ",
    )
    .unwrap();
    assert_eq!(evaluate(&black_lost, Color::White), 1.0);
    assert_eq!(evaluate(&black_lost, Color::Black), 0.0);

    let black_stuck = Board::from_diagram(
        "
        . . . . .
        . . . . .
        . . . . .
        . . . . .
        b W . . .
        ",
    )
    .unwrap();
    assert_eq!(evaluate(&black_stuck, Color::Black), 0.0);
}

// =============================================================================
// Search properties
// =============================================================================

#[test]
fn test_alpha_beta_matches_minimax() {
    for (board, color) in sample_positions().into_iter().step_by(3) {
        for depth in 1..=2 {
            let mut work = board.clone();
            let mut journal = Journal::new();
            let mut pruned_nodes = 0;
            let mut full_nodes = 0;
            let pruned = alpha_beta(
                &mut work,
                &mut journal,
                color,
                color,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                &mut pruned_nodes,
            )
            .unwrap();
            let full = minimax(&mut work, &mut journal, color, color, depth, &mut full_nodes).unwrap();
            assert_eq!(pruned, full);
            assert!(pruned_nodes <= full_nodes);
            assert_eq!(work, board);
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_single_push_scenario() {
    let mut board = Board::empty();
    board.set_token_at(Point::new(2, 1), Some(Token::new(Color::White)));
    board.set_token_at(Point::new(2, 2), Some(Token::new(Color::Black)));

    let push = generate_moves(&board, Color::White)
        .into_iter()
        .find(|m| m.is_push())
        .unwrap();
    assert_eq!(push.from(), Point::new(2, 1));
    assert_eq!(push.pushed_line(), &[Point::new(2, 2)]);

    apply_move(&mut board, &push, Color::White).unwrap();
    assert_eq!(board.token_at(Point::new(2, 2)).unwrap().color, Color::White);
    let pushed = board.token_at(Point::new(2, 3)).unwrap();
    assert_eq!(pushed.color, Color::Black);
    assert!(!pushed.active);
    assert!(board.is_empty_at(Point::new(2, 1)));
}

#[test]
fn test_edge_capture_scenario() {
    let mut board = Board::from_diagram(
        "
        . . . . .
        . . . . .
        . . . . .
        . W . . .
        W B . W .
        ",
    )
    .unwrap();
    let mv = Move::Simple {
        from: Point::new(4, 3),
        to: Point::new(4, 2),
    };
    apply_move(&mut board, &mv, Color::White).unwrap();
    assert!(board.token_at(Point::new(4, 1)).unwrap().captured);
    assert_eq!(board.count_captured().black, 1);
}

#[test]
fn test_single_move_returned_at_every_difficulty() {
    let board = Board::from_diagram(
        "
        . . . . .
        . . . . .
        . . . . .
        . . . . .
        B W W W W
        ",
    )
    .unwrap();
    let only = Move::Simple {
        from: Point::new(4, 0),
        to: Point::new(3, 0),
    };
    assert_eq!(generate_moves(&board, Color::Black), vec![only.clone()]);

    for level in 1..=9 {
        let mut engine = Engine::with_board(board.clone());
        let mut searched = false;
        let mv = engine.best_move_with_progress(Color::Black, Difficulty::new(level), |e| {
            if let pushover_rust::search::SearchEvent::End { nodes, .. } = e {
                searched = *nodes > 0;
            }
        });
        assert_eq!(mv, Some(only.clone()));
        assert!(!searched);
    }
}

// =============================================================================
// Game driver
// =============================================================================

#[test]
fn test_self_play_stays_consistent() {
    let mut game = Game::with_engine(Engine::new().with_seed(11));
    while !game.is_over() && game.turns() < 60 {
        let color = game.to_move();
        let (mv, _) = game.play_engine_move(Difficulty::new(2)).unwrap();
        assert_eq!(game.board().last_move_to, Some(mv.to()));
        assert_ne!(game.to_move(), color);
        assert_eq!(game.board().count_tokens(Color::Black), 6);
        assert_eq!(game.board().count_tokens(Color::White), 6);
    }
    if game.is_over() {
        assert!(matches!(game.outcome(), Outcome::Win { .. }));
    }
}
