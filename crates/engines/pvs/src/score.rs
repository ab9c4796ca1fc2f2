//! Search score constants and mate-distance arithmetic.
//!
//! Scores are centipawns from the side to move's point of view. A mate
//! found `n` plies from the root scores `MATE - n`; being mated in `n`
//! plies scores `-MATE + n`. Anything at or beyond [`MATE_BOUND`] is a
//! mate score.

use chess_core::Score;

pub const DRAW: i32 = 0;
pub const MATE: i32 = 1_000_000;
/// Strictly outside every reachable score.
pub const INF: i32 = MATE + 1;

/// Deepest ply the search ever visits.
pub const MAX_PLY: usize = 246;
/// Deepest iteration the driver starts.
pub const MAX_DEPTH: i32 = 120;

/// Scores at least this far from zero are mates.
pub const MATE_BOUND: i32 = MATE - 1000;

#[inline]
pub const fn mate_in(ply: usize) -> i32 {
    MATE - ply as i32
}

#[inline]
pub const fn mated_in(ply: usize) -> i32 {
    -MATE + ply as i32
}

#[inline]
pub const fn is_mate(score: i32) -> bool {
    score.abs() >= MATE_BOUND
}

/// Converts a root-relative mate score into a node-relative one before it
/// is written to the transposition table.
#[inline]
pub const fn to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

/// Inverse of [`to_tt`]: re-expands a stored mate score for the probing ply.
#[inline]
pub const fn from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

/// Protocol rendering: mates become full moves, the rest stays centipawns.
pub fn to_uci(score: i32) -> Score {
    if score >= MATE_BOUND {
        Score::Mate((MATE - score + 1) / 2)
    } else if score <= -MATE_BOUND {
        Score::Mate(-(MATE + score) / 2)
    } else {
        Score::Cp(score)
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod score_tests;
