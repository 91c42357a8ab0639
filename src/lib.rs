//! Pushover-Rust: a small engine for a 5x5 push-and-surround board game.
//!
//! Two players each own six tokens. A token moves one cell orthogonally, or
//! pushes a contiguous run of tokens one cell along, provided the cell past
//! the run is empty. Any token blocked on all four sides (by tokens or the
//! board edge) is captured. Six captures, or no legal move on your turn,
//! loses the game.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, evaluator weights and search tuning
//! - [`board`] - Board state, coordinates and text diagrams
//! - [`rules`] - Move generation, move application and the capture sweep
//! - [`journal`] - Reversible apply/undo stack used by the search
//! - [`eval`] - Static position evaluator
//! - [`search`] - Alpha-beta search and the batched root driver
//! - [`difficulty`] - Difficulty levels, depth table and move selection
//! - [`engine`] - Engine facade with fault containment and background search
//! - [`game`] - Turn alternation and game outcome
//! - [`protocol`] - Line-oriented text protocol
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use pushover_rust::board::Color;
//! use pushover_rust::difficulty::Difficulty;
//! use pushover_rust::engine::Engine;
//!
//! let mut engine = Engine::new().with_seed(7);
//! let mv = engine.best_move(Color::Black, Difficulty::new(3)).unwrap();
//! engine.apply_move(&mv, Color::Black).unwrap();
//! println!("Black played {mv}");
//! println!("{}", engine.board());
//! ```

pub mod board;
pub mod constants;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod eval;
pub mod game;
pub mod journal;
pub mod protocol;
pub mod rules;
pub mod search;
