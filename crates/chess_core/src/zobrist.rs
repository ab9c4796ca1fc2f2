//! Zobrist keys for position fingerprints.
//!
//! A position's fingerprint is the XOR of:
//! - one key per (piece, square) pair on the board (12 × 64),
//! - the side key when black is to move,
//! - one key per castling right still held,
//! - the file key of the en-passant square, only while an en-passant
//!   capture is actually available to the side to move.
//!
//! `Position` keeps the fingerprint up to date with XOR deltas during
//! make/unmake; `Position::compute_hash` rebuilds it from scratch.

use crate::types::Piece;

/// Key material, generated at compile time from a fixed xorshift seed.
pub struct ZobristKeys {
    /// Indexed by `[Piece::idx()][square]`.
    pub pieces: [[u64; 64]; 12],
    pub side_to_move: u64,
    /// One key per castling bit (white OO, white OOO, black OO, black OOO).
    pub castling: [u64; 4],
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    pub const fn new() -> Self {
        const fn xorshift64(mut state: u64) -> u64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;

        let mut pieces = [[0u64; 64]; 12];
        let mut piece = 0;
        while piece < 12 {
            let mut sq = 0;
            while sq < 64 {
                state = xorshift64(state);
                pieces[piece][sq] = state;
                sq += 1;
            }
            piece += 1;
        }

        state = xorshift64(state);
        let side_to_move = state;

        let mut castling = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            state = xorshift64(state);
            castling[i] = state;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            state = xorshift64(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: u8) -> u64 {
        self.pieces[piece.idx()][sq as usize]
    }

    /// Combined key for a 4-bit castling-rights mask.
    #[inline]
    pub fn castling_key(&self, rights: u8) -> u64 {
        let mut key = 0;
        for (bit, k) in self.castling.iter().enumerate() {
            if rights & (1 << bit) != 0 {
                key ^= k;
            }
        }
        key
    }

    #[inline(always)]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

#[cfg(test)]
#[path = "zobrist_tests.rs"]
mod zobrist_tests;
