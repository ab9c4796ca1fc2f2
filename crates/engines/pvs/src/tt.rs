//! Lockless transposition table shared by all search threads.
//!
//! Each entry is two `AtomicU64` words, `key ^ data` and `data`, read and
//! written with `Relaxed` ordering and no locks. Two threads writing the same
//! slot at once can leave a key word from one store next to a data word from
//! the other; `key ^ data` then no longer reproduces the probing key and the
//! slot reads as a miss. A returned hit is therefore always a complete entry
//! written for this exact key, and its move must still be validated against
//! the position before it is played.

use std::sync::atomic::{AtomicU64, Ordering};

use chess_core::Move;
use tracing::debug;

use crate::config::{ConfigError, HASH_DEFAULT_MB, HASH_MAX_MB, HASH_MIN_MB, check_range};
use crate::score;

const ENTRIES_PER_BUCKET: usize = 4;
const BUCKET_BYTES: usize = 64;
const GENERATION_CYCLE: u8 = 4;

/// Sentinel for a missing static eval in the packed 16-bit field.
const EVAL_NONE: i16 = i16::MIN;

/// How a stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    None = 0,
    /// Fail low: the true score is at most this.
    Upper = 1,
    /// Fail high: the true score is at least this.
    Lower = 2,
    Exact = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Bound {
        match bits & 3 {
            1 => Bound::Upper,
            2 => Bound::Lower,
            3 => Bound::Exact,
            _ => Bound::None,
        }
    }
}

/// Decoded entry, score already re-expanded for the probing ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtHit {
    pub mv: Option<Move>,
    pub score: i32,
    pub eval: Option<i32>,
    pub depth: i32,
    pub bound: Bound,
}

impl TtHit {
    /// Whether this entry alone decides a node searched to `depth` with the
    /// window `(alpha, beta)`.
    #[inline]
    pub fn is_usable(&self, depth: i32, alpha: i32, beta: i32) -> bool {
        self.depth >= depth
            && match self.bound {
                Bound::Exact => true,
                Bound::Upper => self.score <= alpha,
                Bound::Lower => self.score >= beta,
                Bound::None => false,
            }
    }
}

// Data word layout, low to high:
//   move 16 | score 21 (signed) | eval 16 (signed) | depth+1 7 | bound 2 | generation 2
const SCORE_SHIFT: u32 = 16;
const EVAL_SHIFT: u32 = 37;
const DEPTH_SHIFT: u32 = 53;
const BOUND_SHIFT: u32 = 60;
const GEN_SHIFT: u32 = 62;
const SCORE_MASK: u64 = (1 << 21) - 1;

const MIN_DEPTH: i32 = -1;
const MAX_STORED_DEPTH: i32 = 126;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Packed(u64);

impl Packed {
    fn new(mv: Option<Move>, score: i32, eval: Option<i32>, depth: i32, bound: Bound, generation: u8) -> Self {
        debug_assert!(score.abs() <= score::INF);
        let mv = mv.map_or(0, Move::raw) as u64;
        let score = (score as u32 as u64) & SCORE_MASK;
        let eval = eval.map_or(EVAL_NONE, |e| e.clamp(-32_000, 32_000) as i16) as u16 as u64;
        let depth = (depth.clamp(MIN_DEPTH, MAX_STORED_DEPTH) - MIN_DEPTH) as u64;
        Packed(
            mv | score << SCORE_SHIFT
                | eval << EVAL_SHIFT
                | depth << DEPTH_SHIFT
                | (bound as u64) << BOUND_SHIFT
                | (generation as u64 & 3) << GEN_SHIFT,
        )
    }

    fn mv(self) -> Option<Move> {
        let raw = self.0 as u16;
        (raw != 0).then(|| Move::from_raw(raw))
    }

    fn with_move(self, mv: Move) -> Packed {
        Packed(self.0 & !0xffff | mv.raw() as u64)
    }

    fn score(self) -> i32 {
        let raw = ((self.0 >> SCORE_SHIFT) & SCORE_MASK) as u32;
        ((raw << 11) as i32) >> 11
    }

    fn eval(self) -> Option<i32> {
        let raw = (self.0 >> EVAL_SHIFT) as u16 as i16;
        (raw != EVAL_NONE).then_some(raw as i32)
    }

    fn depth(self) -> i32 {
        ((self.0 >> DEPTH_SHIFT) & 0x7f) as i32 + MIN_DEPTH
    }

    fn bound(self) -> Bound {
        Bound::from_bits(self.0 >> BOUND_SHIFT)
    }

    fn generation(self) -> u8 {
        (self.0 >> GEN_SHIFT) as u8 & 3
    }

    fn is_empty(self) -> bool {
        self.bound() == Bound::None
    }
}

#[derive(Default)]
struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    #[inline]
    fn load(&self) -> (u64, Packed) {
        let data = self.data.load(Ordering::Relaxed);
        let key = self.key.load(Ordering::Relaxed) ^ data;
        (key, Packed(data))
    }

    #[inline]
    fn save(&self, key: u64, data: Packed) {
        self.key.store(key ^ data.0, Ordering::Relaxed);
        self.data.store(data.0, Ordering::Relaxed);
    }

    fn clear(&self) {
        self.key.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

#[derive(Default)]
#[repr(align(64))]
struct Bucket {
    slots: [Slot; ENTRIES_PER_BUCKET],
}

const _: () = assert!(std::mem::size_of::<Bucket>() == BUCKET_BYTES);

fn check_size(mb: usize) -> Result<(), ConfigError> {
    let mb = i64::try_from(mb).unwrap_or(i64::MAX);
    check_range("hash_mb", mb, HASH_MIN_MB as i64, HASH_MAX_MB as i64)
}

pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    generation: u8,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self {
            buckets: Self::allocate(HASH_DEFAULT_MB),
            generation: 0,
        }
    }
}

impl TranspositionTable {
    /// Table of `mb` MiB; sizes outside the configured range are rejected.
    pub fn new(mb: usize) -> Result<Self, ConfigError> {
        check_size(mb)?;
        Ok(Self {
            buckets: Self::allocate(mb),
            generation: 0,
        })
    }

    fn allocate(mb: usize) -> Vec<Bucket> {
        let count = (mb * 1024 * 1024 / BUCKET_BYTES).max(1);
        let mut buckets = Vec::with_capacity(count);
        buckets.resize_with(count, Bucket::default);
        buckets
    }

    /// Reallocates to `mb` MiB, dropping all entries.
    pub fn resize(&mut self, mb: usize) -> Result<(), ConfigError> {
        check_size(mb)?;
        self.buckets = Self::allocate(mb);
        self.generation = 0;
        debug!(mb, buckets = self.buckets.len(), "transposition table resized");
        Ok(())
    }

    pub fn clear(&mut self) {
        for bucket in &self.buckets {
            for slot in &bucket.slots {
                slot.clear();
            }
        }
        self.generation = 0;
    }

    /// Called once per `go`; entries from earlier searches age out first.
    pub fn new_search(&mut self) {
        self.generation = (self.generation + 1) % GENERATION_CYCLE;
    }

    pub fn size_mb(&self) -> usize {
        self.buckets.len() * BUCKET_BYTES / (1024 * 1024)
    }

    #[inline]
    fn bucket(&self, key: u64) -> &Bucket {
        let folded = (key >> 32) ^ (key & 0xffff_ffff);
        &self.buckets[(folded % self.buckets.len() as u64) as usize]
    }

    pub fn probe(&self, key: u64, ply: usize) -> Option<TtHit> {
        self.bucket(key).slots.iter().find_map(|slot| {
            let (stored_key, data) = slot.load();
            (stored_key == key && !data.is_empty()).then(|| TtHit {
                mv: data.mv(),
                score: score::from_tt(data.score(), ply),
                eval: data.eval(),
                depth: data.depth(),
                bound: data.bound(),
            })
        })
    }

    /// Records a search result. `score` is root-relative and is normalised
    /// to the storing node before packing.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        key: u64,
        mv: Option<Move>,
        score: i32,
        eval: Option<i32>,
        depth: i32,
        bound: Bound,
        ply: usize,
    ) {
        debug_assert!(bound != Bound::None);
        let bucket = self.bucket(key);
        let fresh = Packed::new(mv, score::to_tt(score, ply), eval, depth, bound, self.generation);

        // Same position: only exact or at-least-as-deep results overwrite.
        for slot in &bucket.slots {
            let (stored_key, old) = slot.load();
            if stored_key != key || old.is_empty() {
                continue;
            }
            if bound == Bound::Exact || depth >= old.depth() {
                let merged = match (mv, old.mv()) {
                    (None, Some(old_move)) => fresh.with_move(old_move),
                    _ => fresh,
                };
                slot.save(key, merged);
            } else if let (Some(new_move), None) = (mv, old.mv()) {
                slot.save(key, old.with_move(new_move));
            }
            return;
        }

        if let Some(slot) = bucket.slots.iter().find(|slot| slot.load().1.is_empty()) {
            slot.save(key, fresh);
            return;
        }

        // Shallowest entry goes; every generation of age counts as 8 plies.
        let victim = bucket
            .slots
            .iter()
            .min_by_key(|slot| {
                let (_, data) = slot.load();
                let age = (GENERATION_CYCLE + self.generation - data.generation()) % GENERATION_CYCLE;
                data.depth() - 8 * age as i32
            })
            .unwrap_or(&bucket.slots[0]);
        victim.save(key, fresh);
    }

    /// Per-mille fill of the current generation, sampled from the front.
    pub fn hashfull(&self) -> u32 {
        let sample = self.buckets.len().min(250);
        let used: usize = self.buckets[..sample]
            .iter()
            .flat_map(|bucket| bucket.slots.iter())
            .filter(|slot| {
                let (_, data) = slot.load();
                !data.is_empty() && data.generation() == self.generation
            })
            .count();
        (used * 1000 / (sample * ENTRIES_PER_BUCKET)) as u32
    }
}

#[cfg(test)]
#[path = "tt_tests.rs"]
mod tt_tests;
