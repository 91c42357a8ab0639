//! Engine facade used by a game loop or UI.
//!
//! The [`Engine`] owns the board for the lifetime of a match. Real turns go
//! through [`Engine::apply_move`]; [`Engine::best_move`] searches the same
//! board in place and always hands it back unchanged, even when the search
//! fails. Searches run one at a time: the board is borrowed exclusively for
//! the whole call, and [`Engine::spawn_search`] works on its own copy.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::board::{Board, Capture, CaptureCount, Color};
use crate::difficulty::Difficulty;
use crate::error::{EngineError, RuleError};
use crate::rules::{self, Move};
use crate::search::{RootSearch, SearchEvent};

pub struct Engine {
    board: Board,
    rng: fastrand::Rng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine holding the starting position.
    pub fn new() -> Self {
        Self::with_board(Board::new())
    }

    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            rng: fastrand::Rng::new(),
        }
    }

    /// Seed move selection for reproducible play.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the position, e.g. when starting a new game.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn generate_moves(&self, color: Color) -> Vec<Move> {
        rules::generate_moves(&self.board, color)
    }

    /// Play a real turn's move. Returns the tokens it captured.
    pub fn apply_move(&mut self, mv: &Move, color: Color) -> Result<Vec<Capture>, RuleError> {
        rules::apply_move(&mut self.board, mv, color)
    }

    pub fn count_captured(&self) -> CaptureCount {
        self.board.count_captured()
    }

    pub fn reset_active(&mut self, color: Color) {
        self.board.reset_active(color);
    }

    /// Best move for `color`, or `None` when there is none.
    pub fn best_move(&mut self, color: Color, difficulty: Difficulty) -> Option<Move> {
        self.best_move_with_progress(color, difficulty, |_| {})
    }

    /// Like [`Engine::best_move`], reporting [`SearchEvent`]s to `on_event`.
    ///
    /// The callback is for display only; it never changes the result.
    /// Failures inside the search (errors or panics) are logged and reported
    /// as `None`, with the board restored to its state at the call.
    pub fn best_move_with_progress(
        &mut self,
        color: Color,
        difficulty: Difficulty,
        mut on_event: impl FnMut(&SearchEvent),
    ) -> Option<Move> {
        let saved = self.board.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            run_search(
                &mut self.board,
                color,
                difficulty,
                &mut self.rng,
                &mut on_event,
                None,
            )
        }));

        let failure = match result {
            Ok(Ok(mv)) => return mv,
            Ok(Err(e)) => e,
            Err(payload) => EngineError::Panicked(panic_message(payload.as_ref())),
        };
        error!(%color, %difficulty, "search failed, no move chosen: {failure}");
        self.board = saved;
        None
    }

    /// Search a copy of the current board on a background thread.
    ///
    /// Events stream over the handle's channel. Cancellation is honored
    /// between root batches.
    pub fn spawn_search(&mut self, color: Color, difficulty: Difficulty) -> SearchHandle {
        let mut board = self.board.clone();
        let mut rng = fastrand::Rng::with_seed(self.rng.u64(..));
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        let flag = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            let mut send = |event: &SearchEvent| {
                // receiver may be gone; the search still finishes cleanly
                let _ = tx.send(event.clone());
            };
            run_search(&mut board, color, difficulty, &mut rng, &mut send, Some(flag.as_ref()))
        });

        SearchHandle {
            events: rx,
            cancel,
            handle,
        }
    }
}

/// A search running on a background thread.
pub struct SearchHandle {
    events: Receiver<SearchEvent>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<Option<Move>, EngineError>>,
}

impl SearchHandle {
    pub fn events(&self) -> &Receiver<SearchEvent> {
        &self.events
    }

    /// Ask the search to stop after the current root batch.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Wait for the search to end.
    pub fn join(self) -> Result<Option<Move>, EngineError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(payload) => Err(EngineError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn run_search(
    board: &mut Board,
    color: Color,
    difficulty: Difficulty,
    rng: &mut fastrand::Rng,
    on_event: &mut dyn FnMut(&SearchEvent),
    cancel: Option<&AtomicBool>,
) -> Result<Option<Move>, EngineError> {
    let cancelled = || cancel.is_some_and(|c| c.load(Ordering::Relaxed));

    let mut search = RootSearch::new(board, color, difficulty)?;
    on_event(&SearchEvent::Start {
        candidates: search.total(),
        depth: search.depth(),
    });
    if !search.is_forced() {
        on_event(&SearchEvent::Depth {
            depth: search.depth(),
        });
    }

    while !search.is_done() {
        if cancelled() {
            debug!(%color, "search cancelled");
            return Err(EngineError::Cancelled);
        }
        match search.next() {
            Some(progress) => on_event(&SearchEvent::Progress(progress?)),
            None => break,
        }
    }

    let outcome = search.finish(rng);
    on_event(&SearchEvent::End {
        best: outcome.best.clone(),
        score: outcome.score,
        nodes: outcome.nodes,
    });
    Ok(outcome.best)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;
    use crate::search::Progress;

    #[test]
    fn test_best_move_is_legal_and_board_unchanged() {
        let mut engine = Engine::new().with_seed(42);
        let before = engine.board().clone();
        for level in [1, 4, 7] {
            let mv = engine
                .best_move(Color::Black, Difficulty::new(level))
                .unwrap();
            assert!(engine.generate_moves(Color::Black).contains(&mv));
            assert_eq!(engine.board(), &before);
        }
    }

    #[test]
    fn test_no_move_returns_none() {
        let board = Board::from_diagram(
            "
            b . . . .
            . . . . .
            . . . . .
            . . . . .
            . . . . W
            ",
        )
        .unwrap();
        let mut engine = Engine::with_board(board);
        let mut events = Vec::new();
        let mv = engine.best_move_with_progress(Color::Black, Difficulty::new(9), |e| {
            events.push(e.clone())
        });
        assert_eq!(mv, None);
        assert_eq!(
            events,
            vec![
                SearchEvent::Start {
                    candidates: 0,
                    depth: 0
                },
                SearchEvent::End {
                    best: None,
                    score: None,
                    nodes: 0
                },
            ]
        );
    }

    #[test]
    fn test_progress_events_do_not_change_result() {
        let mut quiet = Engine::new().with_seed(9);
        let mut noisy = Engine::new().with_seed(9);
        let a = quiet.best_move(Color::White, Difficulty::new(5));
        let mut events = Vec::new();
        let b = noisy.best_move_with_progress(Color::White, Difficulty::new(5), |e| {
            events.push(e.clone())
        });
        assert_eq!(a, b);
        assert!(matches!(events.first(), Some(SearchEvent::Start { .. })));
        assert!(matches!(events.get(1), Some(SearchEvent::Depth { depth: 3 })));
        assert!(matches!(events.last(), Some(SearchEvent::End { .. })));
        let percents: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                SearchEvent::Progress(p) => Some(p.percent()),
                _ => None,
            })
            .collect();
        assert_eq!(percents.last(), Some(&100));
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_spawned_search_streams_events() {
        let mut engine = Engine::new().with_seed(5);
        let handle = engine.spawn_search(Color::Black, Difficulty::new(3));
        let mv = handle.join().unwrap().unwrap();
        assert!(engine.generate_moves(Color::Black).contains(&mv));
        assert_eq!(engine.board(), &Board::new());
    }

    #[test]
    fn test_cancelled_search_reports_cancelled() {
        let mut engine = Engine::new();
        let handle = engine.spawn_search(Color::Black, Difficulty::new(9));
        handle.cancel();
        // cancellation may land after the last batch on a fast machine
        match handle.join() {
            Err(EngineError::Cancelled) | Ok(Some(_)) => {}
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_cancel_before_first_batch() {
        let mut board = Board::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut events = Vec::new();
        let flag = AtomicBool::new(true);
        let result = run_search(
            &mut board,
            Color::Black,
            Difficulty::new(3),
            &mut rng,
            &mut |e: &SearchEvent| events.push(e.clone()),
            Some(&flag),
        );
        assert_eq!(result, Err(EngineError::Cancelled));
        assert_eq!(board, Board::new());
        assert!(events.iter().all(|e| !matches!(e, SearchEvent::Progress(_))));
    }

    #[test]
    fn test_cancel_lands_between_batches() {
        let mut board = Board::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut events = Vec::new();
        let flag = AtomicBool::new(false);
        let result = run_search(
            &mut board,
            Color::Black,
            Difficulty::new(1),
            &mut rng,
            &mut |e: &SearchEvent| {
                if matches!(e, SearchEvent::Progress(_)) {
                    flag.store(true, Ordering::Relaxed);
                }
                events.push(e.clone());
            },
            Some(&flag),
        );
        assert_eq!(result, Err(EngineError::Cancelled));
        assert_eq!(board, Board::new());

        let batches: Vec<&Progress> = events
            .iter()
            .filter_map(|e| match e {
                SearchEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].evaluated < batches[0].total);
        assert!(!matches!(events.last(), Some(SearchEvent::End { .. })));
    }

    #[test]
    fn test_apply_move_and_captures() {
        let board = Board::from_diagram(
            "
            . . . . .
            . . . . .
            . . . . .
            . W . . .
            W B . W .
            ",
        )
        .unwrap();
        let mut engine = Engine::with_board(board);
        let mv = Move::Simple {
            from: Point::new(4, 3),
            to: Point::new(4, 2),
        };
        let captured = engine.apply_move(&mv, Color::White).unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(engine.count_captured().black, 1);
    }
}
