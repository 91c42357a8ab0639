//! Pushover-Rust command line.
//!
//! ## Usage
//!
//! - `pushover-rust` - Show a demo
//! - `pushover-rust protocol` - Serve the text protocol on stdin/stdout
//! - `pushover-rust selfplay` - Let the engine play itself
//! - `pushover-rust demo` - Run the search demo
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=debug`) to see search statistics on stderr.

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pushover_rust::board::Color;
use pushover_rust::constants::MAX_DIFFICULTY;
use pushover_rust::difficulty::Difficulty;
use pushover_rust::engine::Engine;
use pushover_rust::game::Game;
use pushover_rust::protocol::ProtocolEngine;
use pushover_rust::search::SearchEvent;

/// Pushover-Rust: a 5x5 push-and-surround game engine
#[derive(Parser)]
#[command(name = "pushover-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the line-oriented text protocol for use with a UI
    Protocol,
    /// Play a full game engine against engine
    Selfplay {
        /// Difficulty for Black (1-9)
        #[arg(long, default_value_t = 5)]
        black: u8,
        /// Difficulty for White (1-9)
        #[arg(long, default_value_t = 5)]
        white: u8,
        /// Seed for reproducible games
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many moves
        #[arg(long, default_value_t = 200)]
        max_turns: usize,
    },
    /// Run a simple demo of the engine
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Protocol) => {
            let mut engine = ProtocolEngine::new();
            engine.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Commands::Selfplay {
            black,
            white,
            seed,
            max_turns,
        }) => run_selfplay(
            Difficulty::new(black),
            Difficulty::new(white),
            seed,
            max_turns,
        ),
        Some(Commands::Demo) | None => run_demo(),
    }
    Ok(())
}

fn run_selfplay(black: Difficulty, white: Difficulty, seed: Option<u64>, max_turns: usize) {
    let engine = match seed {
        Some(seed) => Engine::new().with_seed(seed),
        None => Engine::new(),
    };
    let mut game = Game::with_engine(engine);
    println!("{}", game.board());

    while !game.is_over() && game.turns() < max_turns {
        let color = game.to_move();
        let difficulty = match color {
            Color::Black => black,
            Color::White => white,
        };
        let Some((mv, captured)) = game.play_engine_move(difficulty) else {
            println!("{color} has no move to offer");
            break;
        };
        println!("{:>3}. {color} {mv}", game.turns());
        for c in &captured {
            println!("     {} captured at {}", c.color, c.at);
        }
    }

    println!("\n{}", game.board());
    let captured = game.engine().count_captured();
    println!("Captures: black {} white {}", captured.black, captured.white);
    println!("Result: {} after {} moves", game.outcome(), game.turns());
}

fn run_demo() {
    println!("Pushover-Rust: 5x5 push-and-surround engine\n");

    println!("=== Starting Position ===");
    let mut engine = Engine::new();
    println!("{}", engine.board());
    let moves = engine.generate_moves(Color::Black);
    println!("Black has {} legal moves\n", moves.len());

    println!("=== Search Demo ===");
    let difficulty = Difficulty::new(MAX_DIFFICULTY);
    println!("Searching for Black at difficulty {difficulty}...");
    let best = engine.best_move_with_progress(Color::Black, difficulty, |event| match event {
        SearchEvent::Depth { depth } => println!("  depth {depth}"),
        SearchEvent::Progress(p) => println!("  {}% ({}/{})", p.percent(), p.evaluated, p.total),
        SearchEvent::End { score, nodes, .. } => {
            println!("  {nodes} nodes, score {:.3}", score.unwrap_or(0.0))
        }
        SearchEvent::Start { .. } => {}
    });
    match best {
        Some(mv) => {
            println!("Best move: {mv}");
            if engine.apply_move(&mv, Color::Black).is_ok() {
                println!("{}", engine.board());
            }
        }
        None => println!("No move found"),
    }
}
