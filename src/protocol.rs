//! Line-oriented text protocol for driving a game from another process.
//!
//! One command per line, optionally prefixed by a numeric id. Responses are
//! `=id text` on success and `?id text` on failure, each followed by a blank
//! line, so a UI can pair answers with requests.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version` - Engine identification
//! - `list_commands`, `known_command <cmd>` - Command discovery
//! - `quit` - End the session
//! - `clear_board` - Start a new game
//! - `showboard` - Print the board diagram
//! - `to_move` - Color to move
//! - `captures` - Captured token counts
//! - `legal_moves` - Legal moves for the side to move
//! - `difficulty <1-9>` - Set engine difficulty
//! - `play <from> <to>` - Play a move for the side to move, e.g. `play b2 b3`
//! - `genmove` - Let the engine play for the side to move
//! - `outcome` - Game result so far

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::board::parse_point;
use crate::difficulty::Difficulty;
use crate::game::Game;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "captures",
    "clear_board",
    "difficulty",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "name",
    "outcome",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "to_move",
    "version",
];

/// Protocol session state.
pub struct ProtocolEngine {
    game: Game,
    difficulty: Difficulty,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::with_game(Game::new(), Difficulty::default())
    }

    pub fn with_game(game: Game, difficulty: Difficulty) -> Self {
        Self { game, difficulty }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Serve commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            debug!(%command, ?args, "protocol command");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command id off the front of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "clear_board" => {
                self.game.reset();
                (true, String::new())
            }

            "showboard" => (true, format!("\n{}", self.game.board())),

            "to_move" => (true, self.game.to_move().to_string()),

            "captures" => {
                let c = self.game.engine().count_captured();
                (true, format!("black {} white {}", c.black, c.white))
            }

            "legal_moves" => {
                let moves: Vec<String> = self
                    .game
                    .legal_moves()
                    .iter()
                    .map(|m| format!("{} {}", m.from(), m.to()))
                    .collect();
                (true, moves.join("\n"))
            }

            "difficulty" => match args.first().map(|a| a.parse::<u8>()) {
                Some(Ok(level)) => {
                    self.difficulty = Difficulty::new(level);
                    (true, self.difficulty.to_string())
                }
                Some(Err(_)) => (false, "invalid difficulty".to_string()),
                None => (true, self.difficulty.to_string()),
            },

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let (Some(from), Some(to)) = (parse_point(args[0]), parse_point(args[1])) else {
                    return (false, "invalid coordinate".to_string());
                };
                match self.game.play_between(from, to) {
                    Ok(captured) => (true, captured.len().to_string()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => match self.game.play_engine_move(self.difficulty) {
                Some((mv, _)) => (true, format!("{} {}", mv.from(), mv.to())),
                None => (true, "none".to_string()),
            },

            "outcome" => (true, self.game.outcome().to_string()),

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
