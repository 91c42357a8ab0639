//! Board model: a 5x5 grid of token slots and pure queries over it.
//!
//! Nothing in here knows how moves, pushes or captures work. The rule engine
//! in [`crate::rules`] drives the mutators; this module only keeps the grid
//! consistent and answers questions about neighborhoods.

use std::fmt;

use crate::constants::{CAPTURES_TO_LOSE, DELTA, N, THREAT_SIDES, TOKENS_PER_COLOR};
use crate::error::BoardError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Parse a color name ("black", "b", "white", "w"), case-insensitive.
pub fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" | "b" => Some(Color::Black),
        "white" | "w" => Some(Color::White),
        _ => None,
    }
}

/// A token on the grid.
///
/// Captured tokens stay where they are and can still be pushed around, but
/// never move on their own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub color: Color,
    /// False while the token sits out a turn after being pushed by the opponent
    pub active: bool,
    pub captured: bool,
}

impl Token {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            active: true,
            captured: false,
        }
    }

    /// Whether the owner may select this token as a mover.
    #[inline]
    pub fn can_move(&self) -> bool {
        self.active && !self.captured
    }
}

/// A cell address. Row 0 is the top row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighboring cell in `dir`, or `None` off the board.
    #[inline]
    pub fn step(self, dir: Direction) -> Option<Point> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        if row < N && col < N {
            Some(Point::new(row, col))
        } else {
            None
        }
    }

    /// In-bounds orthogonal neighbors, in direction order.
    pub fn neighbors(self) -> impl Iterator<Item = Point> {
        Direction::ALL.into_iter().filter_map(move |d| self.step(d))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = (b'a' + self.col as u8) as char;
        write!(f, "{c}{}", self.row + 1)
    }
}

/// Parse a coordinate such as "c3" (column letter, then row number).
///
/// Returns `None` for anything off the board.
pub fn parse_point(s: &str) -> Option<Point> {
    let bytes = s.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let col = bytes[0].to_ascii_lowercase().checked_sub(b'a')? as usize;
    let row = bytes[1].checked_sub(b'1')? as usize;
    if row < N && col < N {
        Some(Point::new(row, col))
    } else {
        None
    }
}

/// Orthogonal directions. Declaration order is the move generation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    #[inline]
    pub fn delta(self) -> (isize, isize) {
        DELTA[self as usize]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(s)
    }
}

/// A token marked captured by the most recent capture check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub at: Point,
    pub color: Color,
}

/// Captured token totals per color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureCount {
    pub black: usize,
    pub white: usize,
}

impl CaptureCount {
    pub fn of(&self, color: Color) -> usize {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    /// The color that has lost, if either side reached the capture limit.
    pub fn loser(&self) -> Option<Color> {
        if self.black >= CAPTURES_TO_LOSE {
            Some(Color::Black)
        } else if self.white >= CAPTURES_TO_LOSE {
            Some(Color::White)
        } else {
            None
        }
    }
}

const BLACK_START: [Point; TOKENS_PER_COLOR] = [
    Point::new(0, 0),
    Point::new(0, 2),
    Point::new(0, 4),
    Point::new(1, 1),
    Point::new(1, 2),
    Point::new(1, 3),
];

const WHITE_START: [Point; TOKENS_PER_COLOR] = [
    Point::new(4, 0),
    Point::new(4, 2),
    Point::new(4, 4),
    Point::new(3, 1),
    Point::new(3, 2),
    Point::new(3, 3),
];

/// The 5x5 grid plus presentation metadata about the last move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Token>; N]; N],
    /// Origin of the last applied move (display only)
    pub last_move_from: Option<Point>,
    /// Destination of the last applied move (display only)
    pub last_move_to: Option<Point>,
    /// Tokens captured by the most recent capture check
    pub last_captured: Vec<Capture>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board in the starting formation.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for &p in &BLACK_START {
            board.set_token_at(p, Some(Token::new(Color::Black)));
        }
        for &p in &WHITE_START {
            board.set_token_at(p, Some(Token::new(Color::White)));
        }
        board
    }

    /// A board with no tokens.
    pub fn empty() -> Self {
        Self {
            cells: [[None; N]; N],
            last_move_from: None,
            last_move_to: None,
            last_captured: Vec::new(),
        }
    }

    /// Build a board from a text diagram, one line per row.
    ///
    /// Cells: `.` empty, `B`/`W` active, `b`/`w` inactive, `x`/`o` captured
    /// black/white. Whitespace inside a row is ignored and blank lines are
    /// skipped.
    ///
    /// Captured tokens never move or reactivate, so their activity bit is not
    /// part of the diagram: `x`/`o` parse as active and print the same either
    /// way. Parsing a printed board reproduces it up to that bit.
    pub fn from_diagram(diagram: &str) -> Result<Self, BoardError> {
        let rows: Vec<Vec<char>> = diagram
            .lines()
            .map(|l| l.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|r| !r.is_empty())
            .collect();
        if rows.len() != N {
            return Err(BoardError::RowCount {
                expected: N,
                found: rows.len(),
            });
        }

        let mut board = Self::empty();
        for (row, chars) in rows.iter().enumerate() {
            if chars.len() != N {
                return Err(BoardError::RowLength {
                    row,
                    expected: N,
                    found: chars.len(),
                });
            }
            for (col, &ch) in chars.iter().enumerate() {
                let token = match ch {
                    '.' => None,
                    'B' | 'b' | 'x' => Some(Token {
                        color: Color::Black,
                        active: ch != 'b',
                        captured: ch == 'x',
                    }),
                    'W' | 'w' | 'o' => Some(Token {
                        color: Color::White,
                        active: ch != 'w',
                        captured: ch == 'o',
                    }),
                    _ => return Err(BoardError::UnknownCell { ch, row, col }),
                };
                board.set_token_at(Point::new(row, col), token);
            }
        }

        for color in [Color::Black, Color::White] {
            let count = board.count_tokens(color);
            if count > TOKENS_PER_COLOR {
                return Err(BoardError::TooManyTokens {
                    color,
                    count,
                    max: TOKENS_PER_COLOR,
                });
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn token_at(&self, p: Point) -> Option<Token> {
        self.cells[p.row][p.col]
    }

    #[inline]
    pub fn set_token_at(&mut self, p: Point, token: Option<Token>) {
        self.cells[p.row][p.col] = token;
    }

    #[inline]
    pub fn is_empty_at(&self, p: Point) -> bool {
        self.token_at(p).is_none()
    }

    /// All tokens with their cells, in row-major order.
    pub fn tokens(&self) -> impl Iterator<Item = (Point, Token)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .filter_map(move |(col, t)| t.map(|t| (Point::new(row, col), t)))
        })
    }

    pub fn count_tokens(&self, color: Color) -> usize {
        self.tokens().filter(|(_, t)| t.color == color).count()
    }

    pub fn count_captured(&self) -> CaptureCount {
        let mut count = CaptureCount::default();
        for (_, t) in self.tokens().filter(|(_, t)| t.captured) {
            match t.color {
                Color::Black => count.black += 1,
                Color::White => count.white += 1,
            }
        }
        count
    }

    /// Number of the four sides of `p` that are occupied or off the board.
    pub fn blocked_sides(&self, p: Point) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&d| p.step(d).is_none_or(|n| !self.is_empty_at(n)))
            .count()
    }

    /// True iff every orthogonal neighbor of `p` is occupied or off the board.
    pub fn is_surrounded(&self, p: Point) -> bool {
        self.blocked_sides(p) == Direction::ALL.len()
    }

    /// True iff the token at `p` is one blocked side away from capture.
    pub fn is_threatened(&self, p: Point) -> bool {
        matches!(self.token_at(p), Some(t) if !t.captured)
            && self.blocked_sides(p) >= THREAT_SIDES
    }

    /// Reactivate every non-captured token of `color`.
    pub fn reset_active(&mut self, color: Color) {
        for line in self.cells.iter_mut() {
            for t in line.iter_mut().flatten() {
                if t.color == color && !t.captured {
                    t.active = true;
                }
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..N {
            write!(f, " {}", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for (row, line) in self.cells.iter().enumerate() {
            write!(f, "{}", row + 1)?;
            for cell in line {
                let ch = match cell {
                    None => '.',
                    Some(t) => match (t.color, t.captured, t.active) {
                        (Color::Black, true, _) => 'x',
                        (Color::Black, false, true) => 'B',
                        (Color::Black, false, false) => 'b',
                        (Color::White, true, _) => 'o',
                        (Color::White, false, true) => 'W',
                        (Color::White, false, false) => 'w',
                    },
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
