//! Undo journal for search probes.
//!
//! Copying the whole board at every search node is wasteful, so the search
//! applies moves in place and records just enough to put things back: the
//! pre-move contents of every cell the move can possibly touch. A move can
//! only change the occupancy of its origin, its destination and the cells of
//! the pushed run, so capture flags can only flip on those cells and their
//! orthogonal neighbors. That union is the affected set snapshotted in each
//! [`SearchFrame`].
//!
//! The journal is a strict stack. Frames are pushed by [`Journal::apply`] and
//! popped by [`Journal::undo`]; there is no random access and no redo.

use crate::board::{Board, Capture, Color, Point, Token};
use crate::constants::N;
use crate::error::EngineError;
use crate::rules::{Move, apply_move};

/// Everything needed to reverse one applied move.
#[derive(Clone, Debug)]
pub struct SearchFrame {
    pub mv: Move,
    pub color: Color,
    /// Pre-move contents of each affected cell
    cells: Vec<(Point, Option<Token>)>,
    /// Mover's tokens released from inactivity when its turn ended
    released: Vec<Point>,
    /// Tokens captured by this move
    captured: Vec<Capture>,
    last_captured: Vec<Capture>,
    last_move_from: Option<Point>,
    last_move_to: Option<Point>,
}

impl SearchFrame {
    pub fn captured(&self) -> &[Capture] {
        &self.captured
    }
}

/// The cells whose contents may change when `mv` is applied.
///
/// Origin, destination, every pushed token's origin and destination, and the
/// orthogonal neighbors of all of those, deduplicated, row-major.
pub fn affected_cells(mv: &Move) -> Vec<Point> {
    let mut mask = [[false; N]; N];
    let mut mark = |p: Point| {
        mask[p.row][p.col] = true;
        for n in p.neighbors() {
            mask[n.row][n.col] = true;
        }
    };

    mark(mv.from());
    mark(mv.to());
    if let Move::Push {
        direction,
        pushed_line,
        ..
    } = mv
    {
        for &p in pushed_line {
            mark(p);
            if let Some(dest) = p.step(*direction) {
                mark(dest);
            }
        }
    }

    let mut cells = Vec::new();
    for (row, line) in mask.iter().enumerate() {
        for (col, &hit) in line.iter().enumerate() {
            if hit {
                cells.push(Point::new(row, col));
            }
        }
    }
    cells
}

/// LIFO stack of applied search probes.
#[derive(Debug, Default)]
pub struct Journal {
    frames: Vec<SearchFrame>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames currently on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Apply `mv` for `color` as a full turn and push its frame.
    ///
    /// The turn ends by releasing the mover's inactive tokens, matching
    /// what the game driver does between real turns.
    /// Returns the tokens captured by the move.
    pub fn apply(
        &mut self,
        board: &mut Board,
        mv: &Move,
        color: Color,
    ) -> Result<&[Capture], EngineError> {
        let mut cells: Vec<(Point, Option<Token>)> = affected_cells(mv)
            .into_iter()
            .map(|p| (p, board.token_at(p)))
            .collect();
        let last_captured = board.last_captured.clone();
        let last_move_from = board.last_move_from;
        let last_move_to = board.last_move_to;

        let captured = apply_move(board, mv, color)?;

        // A surrounded-but-uncaptured token left on a hand-built board can be
        // swept far from the move. Its only change is the capture flag.
        for c in &captured {
            if !cells.iter().any(|(p, _)| *p == c.at) {
                let before = board.token_at(c.at).map(|t| Token {
                    captured: false,
                    ..t
                });
                cells.push((c.at, before));
            }
        }

        let released: Vec<Point> = board
            .tokens()
            .filter(|(_, t)| t.color == color && !t.captured && !t.active)
            .map(|(p, _)| p)
            .collect();
        board.reset_active(color);

        self.frames.push(SearchFrame {
            mv: mv.clone(),
            color,
            cells,
            released,
            captured,
            last_captured,
            last_move_from,
            last_move_to,
        });
        let frame = self.frames.last().ok_or(EngineError::EmptyJournal)?;
        Ok(frame.captured())
    }

    /// Pop the most recent frame and restore the board to its pre-move state.
    pub fn undo(&mut self, board: &mut Board) -> Result<SearchFrame, EngineError> {
        let frame = self.frames.pop().ok_or(EngineError::EmptyJournal)?;
        for &p in &frame.released {
            if let Some(mut t) = board.token_at(p) {
                t.active = false;
                board.set_token_at(p, Some(t));
            }
        }
        for &(p, token) in &frame.cells {
            board.set_token_at(p, token);
        }
        board.last_captured.clone_from(&frame.last_captured);
        board.last_move_from = frame.last_move_from;
        board.last_move_to = frame.last_move_to;
        Ok(frame)
    }
}
