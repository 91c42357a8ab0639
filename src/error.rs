//! Error types for board construction, move application and search.

use thiserror::Error;

use crate::board::{Color, Point};

/// Errors raised while building a board from a text diagram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Diagram does not hold exactly one line per board row
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },

    /// A diagram row has the wrong number of cells
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Unrecognized cell character
    #[error("unknown cell '{ch}' at row {row}, column {col}")]
    UnknownCell { ch: char, row: usize, col: usize },

    /// More tokens of one color than a game ever holds
    #[error("{color} has {count} tokens, at most {max} allowed")]
    TooManyTokens {
        color: Color,
        count: usize,
        max: usize,
    },
}

/// Errors raised when a move does not fit the board it is applied to.
///
/// Generated moves never trigger these; they signal a caller bug.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// No token at the origin cell
    #[error("no token at {0}")]
    EmptyOrigin(Point),

    /// Origin token belongs to the other player
    #[error("token at {at} is not {color}")]
    WrongColor { at: Point, color: Color },

    /// Captured tokens cannot move
    #[error("token at {0} is captured")]
    CapturedMover(Point),

    /// Token was pushed last turn and sits this one out
    #[error("token at {0} is inactive")]
    InactiveMover(Point),

    /// Destination is not the orthogonal neighbor the move claims
    #[error("{to} is not adjacent to {from}")]
    NotAdjacent { from: Point, to: Point },

    /// Simple move into an occupied cell
    #[error("destination {0} is occupied")]
    Occupied(Point),

    /// Push line does not match the contiguous run on the board
    #[error("push line from {0} does not match the board")]
    PushLineMismatch(Point),

    /// The cell past the pushed run is occupied or off the board
    #[error("push from {0} is blocked")]
    PushBlocked(Point),

    /// No legal move for the side to move joins the two cells
    #[error("no legal move from {from} to {to}")]
    IllegalMove { from: Point, to: Point },
}

/// Errors raised by the diff journal and the search built on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A probe move failed to apply
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// Undo requested with no frame on the stack
    #[error("undo requested on an empty journal")]
    EmptyJournal,

    /// Search stopped by the caller between root batches
    #[error("search cancelled")]
    Cancelled,

    /// Search body panicked
    #[error("search panicked: {0}")]
    Panicked(String),
}
