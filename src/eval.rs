//! Static position evaluation.
//!
//! Scores a position for one color in `[0, 1]` without any lookahead:
//! captured tokens dominate, tokens one blocked side away from capture
//! ("threatened") break ties. All lookahead comes from [`crate::search`].

use crate::board::{Board, Color};
use crate::constants::{CAPTURE_WEIGHT, CAPTURES_TO_LOSE, EVAL_SCALE, THREAT_WEIGHT};
use crate::rules::has_legal_move;

/// Number of non-captured tokens of `color` with three or more blocked sides.
pub fn count_threatened(board: &Board, color: Color) -> usize {
    board
        .tokens()
        .filter(|(p, t)| t.color == color && board.is_threatened(*p))
        .count()
}

/// Score the position from `color`'s point of view.
///
/// 1.0 is a won position, 0.0 a lost one (six own tokens captured, or no
/// legal move for `color`).
pub fn evaluate(board: &Board, color: Color) -> f64 {
    let captured = board.count_captured();
    let own_captured = captured.of(color);
    let opp_captured = captured.of(color.opponent());

    if opp_captured >= CAPTURES_TO_LOSE {
        return 1.0;
    }
    if own_captured >= CAPTURES_TO_LOSE {
        return 0.0;
    }
    if !has_legal_move(board, color) {
        return 0.0;
    }

    let capture_diff = opp_captured as f64 - own_captured as f64;
    let threat_diff =
        count_threatened(board, color.opponent()) as f64 - count_threatened(board, color) as f64;
    let weighted = CAPTURE_WEIGHT * capture_diff + THREAT_WEIGHT * threat_diff;
    (0.5 + weighted / EVAL_SCALE).clamp(0.0, 1.0)
}
