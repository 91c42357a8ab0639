//! Turn-alternation driver around an [`Engine`].
//!
//! Black moves first. A token pushed by the opponent sits out its owner's
//! next turn: when a side finishes its move, its own tokens are reactivated,
//! so anything the opponent pushes during the following move stays frozen
//! through exactly one turn of its owner.

use std::fmt;

use tracing::{error, info};

use crate::board::{Board, Capture, Color, Point};
use crate::difficulty::Difficulty;
use crate::engine::Engine;
use crate::error::RuleError;
use crate::rules::{Move, has_legal_move};

/// Why a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WinReason {
    /// The loser had six tokens captured
    Captures,
    /// The loser had no legal move on its turn
    Immobilized,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Win { winner: Color, reason: WinReason },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ongoing => write!(f, "ongoing"),
            Outcome::Win {
                winner,
                reason: WinReason::Captures,
            } => write!(f, "{winner} wins by captures"),
            Outcome::Win {
                winner,
                reason: WinReason::Immobilized,
            } => write!(f, "{winner} wins by immobilization"),
        }
    }
}

pub struct Game {
    engine: Engine,
    to_move: Color,
    turns: usize,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_engine(Engine::new())
    }

    /// Start from whatever position `engine` holds, Black to move.
    pub fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            to_move: Color::Black,
            turns: 0,
        }
    }

    /// Put the starting position back, Black to move.
    pub fn reset(&mut self) {
        self.engine.set_board(Board::new());
        self.to_move = Color::Black;
        self.turns = 0;
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    /// Moves played so far.
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.engine.generate_moves(self.to_move)
    }

    pub fn outcome(&self) -> Outcome {
        if let Some(loser) = self.engine.count_captured().loser() {
            return Outcome::Win {
                winner: loser.opponent(),
                reason: WinReason::Captures,
            };
        }
        if !has_legal_move(self.board(), self.to_move) {
            return Outcome::Win {
                winner: self.to_move.opponent(),
                reason: WinReason::Immobilized,
            };
        }
        Outcome::Ongoing
    }

    pub fn is_over(&self) -> bool {
        self.outcome() != Outcome::Ongoing
    }

    /// Play `mv` for the side to move and pass the turn.
    pub fn play(&mut self, mv: &Move) -> Result<Vec<Capture>, RuleError> {
        let color = self.to_move;
        let captured = self.engine.apply_move(mv, color)?;
        self.engine.reset_active(color);
        self.to_move = color.opponent();
        self.turns += 1;
        info!(turn = self.turns, %color, "played {mv}, {} captured", captured.len());
        Ok(captured)
    }

    /// Play the legal move joining `from` and `to` for the side to move.
    pub fn play_between(&mut self, from: Point, to: Point) -> Result<Vec<Capture>, RuleError> {
        let mv = self
            .legal_moves()
            .into_iter()
            .find(|m| m.from() == from && m.to() == to)
            .ok_or(RuleError::IllegalMove { from, to })?;
        self.play(&mv)
    }

    /// Let the engine choose and play a move for the side to move.
    ///
    /// Returns `None` when the engine has no move to offer.
    pub fn play_engine_move(&mut self, difficulty: Difficulty) -> Option<(Move, Vec<Capture>)> {
        let mv = self.engine.best_move(self.to_move, difficulty)?;
        let captured = self
            .play(&mv)
            .inspect_err(|e| error!(color = %self.to_move, "engine move {mv} rejected: {e}"))
            .ok()?;
        Some((mv, captured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_moves_first_and_turns_alternate() {
        let mut game = Game::new();
        assert_eq!(game.to_move(), Color::Black);
        let mv = game.legal_moves().remove(0);
        game.play(&mv).unwrap();
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(game.turns(), 1);
        assert_eq!(game.outcome(), Outcome::Ongoing);
    }

    #[test]
    fn test_pushed_token_sits_out_one_turn() {
        let board = Board::from_diagram(
            "
            . . . . .
            . . . . .
            . W B . .
            . . . . .
            B . . . .
            ",
        )
        .unwrap();
        let mut game = Game::with_engine(Engine::with_board(board));
        // black spends a turn so white is to move
        game.play_between(Point::new(4, 0), Point::new(3, 0)).unwrap();
        game.play_between(Point::new(2, 1), Point::new(2, 2)).unwrap();

        let frozen = Point::new(2, 3);
        assert!(!game.board().token_at(frozen).unwrap().active);
        assert!(game.legal_moves().iter().all(|m| m.from() != frozen));

        game.play_between(Point::new(3, 0), Point::new(4, 0)).unwrap();
        game.play_between(Point::new(2, 2), Point::new(1, 2)).unwrap();
        assert!(game.board().token_at(frozen).unwrap().active);
        assert!(game.legal_moves().iter().any(|m| m.from() == frozen));
    }

    #[test]
    fn test_illegal_coordinates_rejected() {
        let mut game = Game::new();
        let err = game
            .play_between(Point::new(0, 0), Point::new(2, 0))
            .unwrap_err();
        assert!(matches!(err, RuleError::IllegalMove { .. }));
        assert_eq!(game.turns(), 0);
    }

    #[test]
    fn test_outcome_by_captures_and_immobilization() {
        let board = Board::from_diagram(
            "
            x . x . x
            . . . . .
            x . x . x
            . . . . .
            . . W . .
            ",
        )
        .unwrap();
        let game = Game::with_engine(Engine::with_board(board));
        assert_eq!(
            game.outcome(),
            Outcome::Win {
                winner: Color::White,
                reason: WinReason::Captures
            }
        );

        let board = Board::from_diagram(
            "
            x . . . .
            . . . . .
            . . . . .
            . . . . .
            . . W . .
            ",
        )
        .unwrap();
        let game = Game::with_engine(Engine::with_board(board));
        assert_eq!(
            game.outcome(),
            Outcome::Win {
                winner: Color::White,
                reason: WinReason::Immobilized
            }
        );
        assert_eq!(game.outcome().to_string(), "white wins by immobilization");
    }

    #[test]
    fn test_engine_move_none_when_immobilized() {
        let board = Board::from_diagram(
            "
            b W . . .
            . . . . .
            . . . . .
            . . . . .
            . . . . .
            ",
        )
        .unwrap();
        let mut game = Game::with_engine(Engine::with_board(board.clone()));
        assert_eq!(game.play_engine_move(Difficulty::new(9)), None);
        assert_eq!(game.turns(), 0);
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.board(), &board);
    }

    #[test]
    fn test_engine_move_advances_game() {
        let mut game = Game::with_engine(Engine::new().with_seed(1));
        let (mv, _) = game.play_engine_move(Difficulty::new(2)).unwrap();
        assert_eq!(game.turns(), 1);
        assert_eq!(game.board().last_move_to, Some(mv.to()));
    }
}
