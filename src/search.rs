//! Minimax search with alpha-beta pruning.
//!
//! The search works on one board in place: every probe is applied through a
//! [`Journal`], searched, then undone before the next sibling is tried.
//! Scores are from the root player's point of view in `[-1, 1]`; the root
//! player maximizes and the opponent minimizes.
//!
//! [`RootSearch`] drives the top level in small batches so a host can regain
//! control between batches (to redraw, report progress or cancel). Batches
//! only ever split between root candidates; the recursive descent itself
//! always runs to completion with the journal balanced.

use std::time::Instant;

use tracing::{debug, warn};

use crate::board::{Board, Color};
use crate::constants::{CAPTURES_TO_LOSE, ROOT_BATCH_SIZE, WIN_SCORE};
use crate::difficulty::Difficulty;
use crate::error::EngineError;
use crate::eval::evaluate;
use crate::journal::Journal;
use crate::rules::{Move, generate_moves, has_legal_move};

/// Static score of `board` for `root`, mapped onto `[-1, 1]`.
#[inline]
pub fn static_score(board: &Board, root: Color) -> f64 {
    2.0 * evaluate(board, root) - 1.0
}

/// Terminal checks shared by both searches, in order: capture limit,
/// side to move immobilized, depth exhausted.
fn terminal_score(board: &Board, root: Color, to_move: Color, depth: u32) -> Option<f64> {
    let captured = board.count_captured();
    if captured.of(root.opponent()) >= CAPTURES_TO_LOSE {
        return Some(WIN_SCORE);
    }
    if captured.of(root) >= CAPTURES_TO_LOSE {
        return Some(-WIN_SCORE);
    }
    if !has_legal_move(board, to_move) {
        return Some(if to_move == root { -WIN_SCORE } else { WIN_SCORE });
    }
    if depth == 0 {
        return Some(static_score(board, root));
    }
    None
}

/// Alpha-beta search from `to_move`'s turn, scored for `root`.
///
/// `nodes` is incremented once per visited node.
#[allow(clippy::too_many_arguments)]
pub fn alpha_beta(
    board: &mut Board,
    journal: &mut Journal,
    root: Color,
    to_move: Color,
    depth: u32,
    mut alpha: f64,
    mut beta: f64,
    nodes: &mut u64,
) -> Result<f64, EngineError> {
    *nodes += 1;
    if let Some(score) = terminal_score(board, root, to_move, depth) {
        return Ok(score);
    }

    let maximizing = to_move == root;
    let mut best = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    for mv in generate_moves(board, to_move) {
        journal.apply(board, &mv, to_move)?;
        let score = alpha_beta(
            board,
            journal,
            root,
            to_move.opponent(),
            depth - 1,
            alpha,
            beta,
            nodes,
        );
        journal.undo(board)?;
        let score = score?;

        if maximizing {
            best = best.max(score);
            alpha = alpha.max(best);
        } else {
            best = best.min(score);
            beta = beta.min(best);
        }
        if beta <= alpha {
            break;
        }
    }
    Ok(best)
}

/// Plain minimax over the same tree as [`alpha_beta`], without pruning.
///
/// Visits every node; useful for checking that pruning never changes a score.
pub fn minimax(
    board: &mut Board,
    journal: &mut Journal,
    root: Color,
    to_move: Color,
    depth: u32,
    nodes: &mut u64,
) -> Result<f64, EngineError> {
    *nodes += 1;
    if let Some(score) = terminal_score(board, root, to_move, depth) {
        return Ok(score);
    }

    let maximizing = to_move == root;
    let mut best = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    for mv in generate_moves(board, to_move) {
        journal.apply(board, &mv, to_move)?;
        let score = minimax(board, journal, root, to_move.opponent(), depth - 1, nodes);
        journal.undo(board)?;
        let score = score?;
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }
    Ok(best)
}

/// A root move with its search score.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub mv: Move,
    pub score: f64,
}

/// Progress after one root batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub evaluated: usize,
    pub total: usize,
    pub depth: u32,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            100
        } else {
            (self.evaluated * 100 / self.total) as u8
        }
    }
}

/// Status events reported while a search runs.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchEvent {
    /// Candidates enumerated; `depth` is 0 when no search will run
    Start { candidates: usize, depth: u32 },
    /// Search depth in use
    Depth { depth: u32 },
    /// A batch of root candidates finished
    Progress(Progress),
    /// Search complete
    End {
        best: Option<Move>,
        score: Option<f64>,
        nodes: u64,
    },
}

/// Result of a finished root search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub best: Option<Move>,
    /// Score of the chosen move; `None` when no search ran
    pub score: Option<f64>,
    /// Candidates best first (empty when no search ran)
    pub ranked: Vec<Candidate>,
    pub depth: u32,
    pub nodes: u64,
}

/// Batched root-level search over a borrowed board.
///
/// Each call to [`Iterator::next`] scores up to [`ROOT_BATCH_SIZE`]
/// candidates and hands control back. The board is identical to its
/// starting state between batches.
pub struct RootSearch<'a> {
    board: &'a mut Board,
    journal: Journal,
    color: Color,
    difficulty: Difficulty,
    depth: u32,
    /// Set when zero or one legal move exists; no scoring happens then
    forced: Option<Option<Move>>,
    candidates: Vec<Move>,
    scored: Vec<Candidate>,
    nodes: u64,
    started: Instant,
}

impl<'a> RootSearch<'a> {
    /// Enumerate root moves for `color` and drop self-capturing ones.
    ///
    /// If every move captures one of the mover's own tokens, all moves are
    /// kept: a forced suicidal move is still a move.
    pub fn new(
        board: &'a mut Board,
        color: Color,
        difficulty: Difficulty,
    ) -> Result<Self, EngineError> {
        let started = Instant::now();
        let mut journal = Journal::new();
        let moves = generate_moves(board, color);

        if moves.len() <= 1 {
            return Ok(Self {
                board,
                journal,
                color,
                difficulty,
                depth: 0,
                forced: Some(moves.into_iter().next()),
                candidates: Vec::new(),
                scored: Vec::new(),
                nodes: 0,
                started,
            });
        }

        let mut safe = Vec::with_capacity(moves.len());
        for mv in &moves {
            let self_capture = journal
                .apply(board, mv, color)?
                .iter()
                .any(|c| c.color == color);
            journal.undo(board)?;
            if !self_capture {
                safe.push(mv.clone());
            }
        }
        let candidates = if safe.is_empty() {
            warn!("every {color} move self-captures; keeping all {}", moves.len());
            moves
        } else {
            safe
        };

        let depth = difficulty.search_depth(candidates.len());
        if depth < difficulty.base_depth() {
            debug!(
                "{} candidates: depth throttled from {} to {depth}",
                candidates.len(),
                difficulty.base_depth()
            );
        }

        Ok(Self {
            board,
            journal,
            color,
            difficulty,
            depth,
            forced: None,
            scored: Vec::with_capacity(candidates.len()),
            candidates,
            nodes: 0,
            started,
        })
    }

    /// Resolved search depth, 0 when no search runs.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of root candidates that will be scored.
    pub fn total(&self) -> usize {
        match &self.forced {
            Some(mv) => usize::from(mv.is_some()),
            None => self.candidates.len(),
        }
    }

    /// Whether the result is decided without searching.
    pub fn is_forced(&self) -> bool {
        self.forced.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.forced.is_some() || self.scored.len() == self.candidates.len()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            evaluated: if self.is_forced() {
                self.total()
            } else {
                self.scored.len()
            },
            total: self.total(),
            depth: self.depth,
        }
    }

    fn score_candidate(&mut self, mv: &Move) -> Result<f64, EngineError> {
        self.journal.apply(self.board, mv, self.color)?;
        let score = if self.depth <= 1 {
            self.nodes += 1;
            Ok(static_score(self.board, self.color))
        } else {
            alpha_beta(
                self.board,
                &mut self.journal,
                self.color,
                self.color.opponent(),
                self.depth - 1,
                -WIN_SCORE,
                WIN_SCORE,
                &mut self.nodes,
            )
        };
        self.journal.undo(self.board)?;
        score
    }

    /// Rank the scored candidates and pick one per the difficulty policy.
    pub fn finish(self, rng: &mut fastrand::Rng) -> SearchOutcome {
        if let Some(best) = self.forced {
            return SearchOutcome {
                best,
                score: None,
                ranked: Vec::new(),
                depth: 0,
                nodes: 0,
            };
        }

        let mut ranked = self.scored;
        // stable: equal scores keep generation order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        let scores: Vec<f64> = ranked.iter().map(|c| c.score).collect();
        let pick = self.difficulty.choose(&scores, rng);
        let (best, score) = match pick.and_then(|i| ranked.get(i)) {
            Some(c) => (Some(c.mv.clone()), Some(c.score)),
            None => (None, None),
        };

        debug!(
            color = %self.color,
            difficulty = %self.difficulty,
            depth = self.depth,
            candidates = ranked.len(),
            nodes = self.nodes,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "search finished"
        );

        SearchOutcome {
            best,
            score,
            ranked,
            depth: self.depth,
            nodes: self.nodes,
        }
    }
}

impl Iterator for RootSearch<'_> {
    type Item = Result<Progress, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done() {
            return None;
        }
        let start = self.scored.len();
        let end = (start + ROOT_BATCH_SIZE).min(self.candidates.len());
        for i in start..end {
            let mv = self.candidates[i].clone();
            match self.score_candidate(&mv) {
                Ok(score) => self.scored.push(Candidate { mv, score }),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(self.progress()))
    }
}
