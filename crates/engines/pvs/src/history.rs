//! Move-ordering statistics owned by one search thread.
//!
//! All tables hold `i16` values kept inside `±HISTORY_MAX` by the gravity
//! update `v += b - v * |b| / HISTORY_MAX`, which lets recent results
//! outweigh old ones without ever overflowing.

use chess_core::{Color, Move, Piece, PieceKind};

use crate::score::MAX_PLY;

pub const HISTORY_MAX: i32 = 16_384;

/// The move played one or two plies earlier, as seen by continuation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContKey {
    pub piece: Piece,
    pub to: u8,
}

/// Continuation context of a node: 1 ply back, then 2 plies back.
pub type ContContext = [Option<ContKey>; 2];

const QUIET_SIZE: usize = 2 * 64 * 64;
const CAPTURE_SIZE: usize = 12 * 64 * 6;
const CONT_SIZE: usize = 12 * 64 * 12 * 64;

#[inline]
fn gravity(entry: &mut i16, bonus: i32) {
    let bonus = bonus.clamp(-HISTORY_MAX, HISTORY_MAX);
    let v = *entry as i32;
    *entry = (v + bonus - v * bonus.abs() / HISTORY_MAX) as i16;
}

/// Bonus for the move that caused a cutoff at `depth`.
#[inline]
pub fn stat_bonus(depth: i32) -> i32 {
    (depth * 160 - 80).clamp(0, 1_600)
}

/// Penalty for moves searched before the cutoff move.
#[inline]
pub fn stat_malus(depth: i32) -> i32 {
    (depth * 180 - 60).clamp(0, 1_800)
}

#[inline]
fn quiet_index(color: Color, mv: Move) -> usize {
    (color.idx() * 64 + mv.from() as usize) * 64 + mv.to() as usize
}

#[inline]
fn capture_index(piece: Piece, to: u8, captured: PieceKind) -> usize {
    (piece.idx() * 64 + to as usize) * 6 + captured.idx()
}

#[inline]
fn cont_index(prev: ContKey, piece: Piece, to: u8) -> usize {
    ((prev.piece.idx() * 64 + prev.to as usize) * 12 + piece.idx()) * 64 + to as usize
}

pub struct History {
    /// Butterfly table `[color][from][to]`.
    quiet: Vec<i16>,
    /// `[piece][to][captured kind]`.
    capture: Vec<i16>,
    /// `[prev piece][prev to][piece][to]`, one table per ply offset.
    continuation: [Vec<i16>; 2],
    killers: Vec<[Move; 2]>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            quiet: vec![0; QUIET_SIZE],
            capture: vec![0; CAPTURE_SIZE],
            continuation: [vec![0; CONT_SIZE], vec![0; CONT_SIZE]],
            killers: vec![[Move::NONE; 2]; MAX_PLY + 2],
        }
    }

    /// Forget everything (new game).
    pub fn clear(&mut self) {
        self.quiet.fill(0);
        self.capture.fill(0);
        for table in &mut self.continuation {
            table.fill(0);
        }
        self.clear_killers();
    }

    /// Killers only make sense within one search.
    pub fn clear_killers(&mut self) {
        self.killers.fill([Move::NONE; 2]);
    }

    #[inline]
    pub fn quiet(&self, color: Color, mv: Move) -> i32 {
        self.quiet[quiet_index(color, mv)] as i32
    }

    #[inline]
    pub fn capture(&self, piece: Piece, to: u8, captured: PieceKind) -> i32 {
        self.capture[capture_index(piece, to, captured)] as i32
    }

    /// Sum of both continuation tables for `piece` moving to `to`.
    #[inline]
    pub fn continuation(&self, cont: &ContContext, piece: Piece, to: u8) -> i32 {
        cont.iter()
            .zip(&self.continuation)
            .filter_map(|(key, table)| key.map(|prev| table[cont_index(prev, piece, to)] as i32))
            .sum()
    }

    pub fn update_quiet(&mut self, color: Color, mv: Move, piece: Piece, cont: &ContContext, bonus: i32) {
        gravity(&mut self.quiet[quiet_index(color, mv)], bonus);
        for (key, table) in cont.iter().zip(self.continuation.iter_mut()) {
            if let Some(prev) = key {
                gravity(&mut table[cont_index(*prev, piece, mv.to())], bonus);
            }
        }
    }

    pub fn update_capture(&mut self, piece: Piece, to: u8, captured: PieceKind, bonus: i32) {
        gravity(&mut self.capture[capture_index(piece, to, captured)], bonus);
    }

    #[inline]
    pub fn killers(&self, ply: usize) -> [Move; 2] {
        self.killers[ply]
    }

    pub fn store_killer(&mut self, ply: usize, mv: Move) {
        let slot = &mut self.killers[ply];
        if slot[0] != mv {
            slot[1] = slot[0];
            slot[0] = mv;
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod history_tests;
