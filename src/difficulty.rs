//! Difficulty policy: search depth and move selection per difficulty level.
//!
//! | Difficulty | Depth | Selection                              |
//! |------------|-------|----------------------------------------|
//! | 1-2        | 1     | random pick from the top third         |
//! | 3          | 2     | random pick from the top third         |
//! | 4          | 2     | random pick among near-equal best moves |
//! | 5-6        | 3     | random pick among near-equal best moves |
//! | 7-8        | 4     | random pick among near-equal best moves |
//! | 9          | 5     | random pick among near-equal best moves |
//!
//! Depth drops to 4 when more than 12 root candidates remain, so the
//! worst case at difficulty 9 stays interactive.

use std::fmt;

use crate::constants::{
    DEFAULT_DIFFICULTY, EQUALITY_THRESHOLD_BASE, MAX_DIFFICULTY, MAX_SEARCH_DEPTH, MIN_DIFFICULTY,
    WEAK_PLAY_DIFFICULTY, WIDE_BRANCHING, WIDE_BRANCHING_DEPTH,
};

/// Difficulty level, always within `1..=9`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u8);

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Difficulty {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl Difficulty {
    /// Clamp `level` into the supported range.
    pub fn new(level: u8) -> Self {
        Self(level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Search depth before any branching throttle.
    pub fn base_depth(self) -> u32 {
        match self.0 {
            ..=2 => 1,
            3..=4 => 2,
            5..=6 => 3,
            7..=8 => 4,
            _ => MAX_SEARCH_DEPTH,
        }
    }

    /// Search depth for a root with `candidates` moves to score.
    pub fn search_depth(self, candidates: usize) -> u32 {
        let depth = self.base_depth();
        if candidates > WIDE_BRANCHING {
            depth.min(WIDE_BRANCHING_DEPTH)
        } else {
            depth
        }
    }

    /// Score window within which root moves count as equally good.
    pub fn equality_threshold(self) -> f64 {
        EQUALITY_THRESHOLD_BASE * f64::from(10 - self.0) / 9.0
    }

    /// Low settings sample from the top third instead of playing the best move.
    pub fn is_weak(self) -> bool {
        self.0 <= WEAK_PLAY_DIFFICULTY
    }

    /// Pick an index into `scores`, which must be sorted best first.
    ///
    /// Returns `None` only for an empty slice.
    pub fn choose(self, scores: &[f64], rng: &mut fastrand::Rng) -> Option<usize> {
        let best = *scores.first()?;
        let pool = if self.is_weak() {
            scores.len().div_ceil(3)
        } else {
            let threshold = self.equality_threshold();
            scores.iter().take_while(|&&s| s >= best - threshold).count()
        };
        if pool > 1 {
            Some(rng.usize(..pool))
        } else {
            Some(0)
        }
    }
}
