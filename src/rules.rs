//! Rule engine: move generation, move application and surround captures.
//!
//! A token moves one cell orthogonally. Moving into an empty cell is a
//! simple move; moving into an occupied cell pushes the whole contiguous run
//! of tokens in front of it one cell further, which is only legal when the
//! cell past the run is on the board and empty. After every move, any token
//! with all four sides blocked (by tokens of either color or by the board
//! edge) is captured, whoever's move closed the last gap.

use std::fmt;

use crate::board::{Board, Capture, Color, Direction, Point};
use crate::error::RuleError;

/// A legal move shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Move {
    /// Step onto an empty adjacent cell
    Simple { from: Point, to: Point },
    /// Step into an occupied cell, shoving the run that starts there
    Push {
        from: Point,
        to: Point,
        direction: Direction,
        /// Pushed cells, ordered from `to` outward
        pushed_line: Vec<Point>,
    },
}

impl Move {
    pub fn from(&self) -> Point {
        match self {
            Move::Simple { from, .. } | Move::Push { from, .. } => *from,
        }
    }

    pub fn to(&self) -> Point {
        match self {
            Move::Simple { to, .. } | Move::Push { to, .. } => *to,
        }
    }

    /// Cells whose tokens are displaced by the push (empty for simple moves).
    pub fn pushed_line(&self) -> &[Point] {
        match self {
            Move::Simple { .. } => &[],
            Move::Push { pushed_line, .. } => pushed_line,
        }
    }

    pub fn is_push(&self) -> bool {
        matches!(self, Move::Push { .. })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Simple { from, to } => write!(f, "{from}-{to}"),
            Move::Push {
                from,
                to,
                pushed_line,
                ..
            } => write!(f, "{from}-{to} (push {})", pushed_line.len()),
        }
    }
}

/// Generate every legal move for `color`.
///
/// Origins are scanned row-major and directions in up/down/left/right order,
/// so the output order is stable for a given board.
pub fn generate_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, token) in board.tokens() {
        if token.color != color || !token.can_move() {
            continue;
        }
        for direction in Direction::ALL {
            if let Some(mv) = move_in_direction(board, from, direction) {
                moves.push(mv);
            }
        }
    }
    moves
}

/// Whether `color` has at least one legal move. Stops at the first one found.
pub fn has_legal_move(board: &Board, color: Color) -> bool {
    board
        .tokens()
        .filter(|(_, t)| t.color == color && t.can_move())
        .any(|(from, _)| {
            Direction::ALL
                .into_iter()
                .any(|d| move_in_direction(board, from, d).is_some())
        })
}

fn move_in_direction(board: &Board, from: Point, direction: Direction) -> Option<Move> {
    let to = from.step(direction)?;
    if board.is_empty_at(to) {
        return Some(Move::Simple { from, to });
    }
    let pushed_line = push_line(board, to, direction)?;
    Some(Move::Push {
        from,
        to,
        direction,
        pushed_line,
    })
}

/// Collect the contiguous run of occupied cells starting at `start`.
///
/// Returns `None` when the run reaches the board edge, since there is then
/// nowhere to push it.
fn push_line(board: &Board, start: Point, direction: Direction) -> Option<Vec<Point>> {
    let mut line = vec![start];
    let mut cur = start;
    loop {
        let next = cur.step(direction)?;
        if board.is_empty_at(next) {
            return Some(line);
        }
        line.push(next);
        cur = next;
    }
}

/// Apply `mv` for `color` and run the capture check.
///
/// Returns the tokens captured by this move, of either color. Opponent tokens
/// displaced by a push are deactivated; the mover's own pushed tokens are not.
///
/// # Errors
/// Any [`RuleError`] if the move does not fit the board. The board is left
/// untouched in that case.
pub fn apply_move(board: &mut Board, mv: &Move, color: Color) -> Result<Vec<Capture>, RuleError> {
    validate(board, mv, color)?;

    let from = mv.from();
    let to = mv.to();
    if let Move::Push {
        direction,
        pushed_line,
        ..
    } = mv
    {
        // Far end first so no token lands on a cell that has not moved yet
        for &p in pushed_line.iter().rev() {
            let (Some(mut token), Some(dest)) = (board.token_at(p), p.step(*direction)) else {
                return Err(RuleError::PushLineMismatch(from));
            };
            if token.color != color {
                token.active = false;
            }
            board.set_token_at(dest, Some(token));
            board.set_token_at(p, None);
        }
    }

    let mover = board.token_at(from);
    board.set_token_at(to, mover);
    board.set_token_at(from, None);
    board.last_move_from = Some(from);
    board.last_move_to = Some(to);

    Ok(capture_sweep(board))
}

/// Mark every surrounded, not yet captured token as captured.
///
/// Records the result in `board.last_captured` and returns it.
pub fn capture_sweep(board: &mut Board) -> Vec<Capture> {
    let captured: Vec<Capture> = board
        .tokens()
        .filter(|(p, t)| !t.captured && board.is_surrounded(*p))
        .map(|(at, t)| Capture { at, color: t.color })
        .collect();
    for c in &captured {
        if let Some(mut token) = board.token_at(c.at) {
            token.captured = true;
            board.set_token_at(c.at, Some(token));
        }
    }
    board.last_captured = captured.clone();
    captured
}

fn validate(board: &Board, mv: &Move, color: Color) -> Result<(), RuleError> {
    let from = mv.from();
    let to = mv.to();
    let token = board.token_at(from).ok_or(RuleError::EmptyOrigin(from))?;
    if token.color != color {
        return Err(RuleError::WrongColor { at: from, color });
    }
    if token.captured {
        return Err(RuleError::CapturedMover(from));
    }
    if !token.active {
        return Err(RuleError::InactiveMover(from));
    }

    match mv {
        Move::Simple { .. } => {
            if !from.neighbors().any(|n| n == to) {
                return Err(RuleError::NotAdjacent { from, to });
            }
            if !board.is_empty_at(to) {
                return Err(RuleError::Occupied(to));
            }
        }
        Move::Push {
            direction,
            pushed_line,
            ..
        } => {
            if from.step(*direction) != Some(to) {
                return Err(RuleError::NotAdjacent { from, to });
            }
            if board.is_empty_at(to) {
                return Err(RuleError::PushLineMismatch(from));
            }
            match push_line(board, to, *direction) {
                None => return Err(RuleError::PushBlocked(from)),
                Some(line) if line != *pushed_line => {
                    return Err(RuleError::PushLineMismatch(from));
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
