//! Constants for board geometry, token counts, evaluation and search.
//!
//! The board is a fixed 5x5 grid addressed by `(row, col)` with row 0 at the
//! top. Everything the engine tunes lives here so the rest of the crate stays
//! free of magic numbers.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
pub const N: usize = 5;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = N * N;

/// Tokens each color starts with. Counts never increase during a game.
pub const TOKENS_PER_COLOR: usize = 6;

/// Captured tokens needed to lose the game.
pub const CAPTURES_TO_LOSE: usize = 6;

/// Blocked sides (neighbors or edges) that make a token "threatened".
pub const THREAT_SIDES: usize = 3;

// =============================================================================
// Evaluator Weights
// =============================================================================

/// Weight of the capture differential.
pub const CAPTURE_WEIGHT: f64 = 0.8;

/// Weight of the threat differential.
pub const THREAT_WEIGHT: f64 = 0.2;

/// Divisor mapping the weighted differential (-6..6) onto half the unit range.
pub const EVAL_SCALE: f64 = 12.0;

// =============================================================================
// Difficulty and Search Parameters
// =============================================================================

/// Lowest difficulty setting.
pub const MIN_DIFFICULTY: u8 = 1;

/// Highest difficulty setting.
pub const MAX_DIFFICULTY: u8 = 9;

/// Difficulty used when none is given.
pub const DEFAULT_DIFFICULTY: u8 = 5;

/// Deepest search the engine will run.
pub const MAX_SEARCH_DEPTH: u32 = 5;

/// Candidate count above which search depth is throttled.
pub const WIDE_BRANCHING: usize = 12;

/// Depth cap applied under wide branching.
pub const WIDE_BRANCHING_DEPTH: u32 = 4;

/// Difficulty at or below which the engine samples from the top third.
pub const WEAK_PLAY_DIFFICULTY: u8 = 3;

/// Score window (at difficulty 1) within which root moves count as equal.
pub const EQUALITY_THRESHOLD_BASE: f64 = 0.02;

/// Root candidates evaluated per batch before control returns to the caller.
pub const ROOT_BATCH_SIZE: usize = 3;

/// Score bounds used by the search. Scores live in `[-WIN_SCORE, WIN_SCORE]`.
pub const WIN_SCORE: f64 = 1.0;

// =============================================================================
// Directions
// =============================================================================

/// Row/column offsets in generation order: up, down, left, right.
pub const DELTA: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
