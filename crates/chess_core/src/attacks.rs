//! Attack tables for move generation, check detection and exchange evaluation.
//!
//! - Knight, king and pawn attacks are leaper tables computed at compile time.
//! - Rook and bishop attacks use magic bitboards: the relevant blockers are
//!   multiplied by a per-square magic and shifted into a dense index into one
//!   shared attack table. The magics are searched for on first use with a
//!   seeded generator and each one is verified exhaustively against the ray
//!   cast below before it is accepted.
//! - `between` / `line` tables describe alignment of two squares (pins,
//!   check blocking, en-passant discovered checks).

use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::bitboard::Bitboard;
use crate::types::{Color, PieceKind};

/// Pre-computed knight attacks for each square.
pub static KNIGHT_ATTACKS: [Bitboard; 64] = {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let bb = Bitboard::from_square(sq);

        // Knight moves: all 8 L-shaped jumps with proper masking
        let mut result = 0u64;

        // Up 2, right 1
        result |= (bb.0 << 17) & Bitboard::NOT_FILE_A.0;
        // Up 2, left 1
        result |= (bb.0 << 15) & Bitboard::NOT_FILE_H.0;
        // Up 1, right 2
        result |= (bb.0 << 10) & Bitboard::NOT_FILE_AB.0;
        // Up 1, left 2
        result |= (bb.0 << 6) & Bitboard::NOT_FILE_GH.0;
        // Down 1, right 2
        result |= (bb.0 >> 6) & Bitboard::NOT_FILE_AB.0;
        // Down 1, left 2
        result |= (bb.0 >> 10) & Bitboard::NOT_FILE_GH.0;
        // Down 2, right 1
        result |= (bb.0 >> 15) & Bitboard::NOT_FILE_A.0;
        // Down 2, left 1
        result |= (bb.0 >> 17) & Bitboard::NOT_FILE_H.0;

        attacks[sq as usize] = Bitboard(result);
        sq += 1;
    }
    attacks
};

/// Pre-computed king attacks for each square.
pub static KING_ATTACKS: [Bitboard; 64] = {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let bb = Bitboard::from_square(sq);

        let mut result = 0u64;

        // All 8 directions
        result |= bb.0 << 8; // North
        result |= bb.0 >> 8; // South
        result |= (bb.0 << 1) & Bitboard::NOT_FILE_A.0; // East
        result |= (bb.0 >> 1) & Bitboard::NOT_FILE_H.0; // West
        result |= (bb.0 << 9) & Bitboard::NOT_FILE_A.0; // North-East
        result |= (bb.0 << 7) & Bitboard::NOT_FILE_H.0; // North-West
        result |= (bb.0 >> 7) & Bitboard::NOT_FILE_A.0; // South-East
        result |= (bb.0 >> 9) & Bitboard::NOT_FILE_H.0; // South-West

        attacks[sq as usize] = Bitboard(result);
        sq += 1;
    }
    attacks
};

/// Pre-computed pawn attacks for White (attacking north-east and north-west).
pub static WHITE_PAWN_ATTACKS: [Bitboard; 64] = {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let bb = Bitboard::from_square(sq);

        let mut result = 0u64;
        result |= (bb.0 << 9) & Bitboard::NOT_FILE_A.0; // North-East
        result |= (bb.0 << 7) & Bitboard::NOT_FILE_H.0; // North-West

        attacks[sq as usize] = Bitboard(result);
        sq += 1;
    }
    attacks
};

/// Pre-computed pawn attacks for Black (attacking south-east and south-west).
pub static BLACK_PAWN_ATTACKS: [Bitboard; 64] = {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let bb = Bitboard::from_square(sq);

        let mut result = 0u64;
        result |= (bb.0 >> 7) & Bitboard::NOT_FILE_A.0; // South-East
        result |= (bb.0 >> 9) & Bitboard::NOT_FILE_H.0; // South-West

        attacks[sq as usize] = Bitboard(result);
        sq += 1;
    }
    attacks
};

/// Get pawn attacks for a pawn of `color` on `sq`.
#[inline(always)]
pub fn pawn_attacks(color: Color, sq: u8) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[sq as usize],
        Color::Black => BLACK_PAWN_ATTACKS[sq as usize],
    }
}

/// Get knight attacks for a given square.
#[inline(always)]
pub fn knight_attacks(sq: u8) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

/// Get king attacks for a given square.
#[inline(always)]
pub fn king_attacks(sq: u8) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

/// Squares attacked by a `kind` piece of `color` on `sq` given `occupied`.
#[inline]
pub fn attacks_of(kind: PieceKind, color: Color, sq: u8, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Pawn => pawn_attacks(color, sq),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Queen => queen_attacks(sq, occupied),
        PieceKind::King => king_attacks(sq),
    }
}

// =============================================================================
// Reference ray casting (used to build and verify the magic tables)
// =============================================================================

/// Pre-computed ray attacks in each direction.
/// RAYS[direction][square] gives all squares in that direction from sq (not including sq).
/// Directions: 0=N, 1=NE, 2=E, 3=SE, 4=S, 5=SW, 6=W, 7=NW
pub static RAYS: [[Bitboard; 64]; 8] = {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];

    let mut sq = 0u8;
    while sq < 64 {
        let file = sq % 8;
        let rank = sq / 8;

        // North (direction 0)
        {
            let mut bb = 0u64;
            let mut r = rank + 1;
            while r < 8 {
                bb |= 1u64 << (r * 8 + file);
                r += 1;
            }
            rays[0][sq as usize] = Bitboard(bb);
        }

        // North-East (direction 1)
        {
            let mut bb = 0u64;
            let mut r = rank + 1;
            let mut f = file + 1;
            while r < 8 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
                r += 1;
                f += 1;
            }
            rays[1][sq as usize] = Bitboard(bb);
        }

        // East (direction 2)
        {
            let mut bb = 0u64;
            let mut f = file + 1;
            while f < 8 {
                bb |= 1u64 << (rank * 8 + f);
                f += 1;
            }
            rays[2][sq as usize] = Bitboard(bb);
        }

        // South-East (direction 3)
        {
            let mut bb = 0u64;
            let mut r = rank.wrapping_sub(1);
            let mut f = file + 1;
            while r < 8 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
                r = r.wrapping_sub(1);
                f += 1;
            }
            rays[3][sq as usize] = Bitboard(bb);
        }

        // South (direction 4)
        {
            let mut bb = 0u64;
            let mut r = rank.wrapping_sub(1);
            while r < 8 {
                bb |= 1u64 << (r * 8 + file);
                r = r.wrapping_sub(1);
            }
            rays[4][sq as usize] = Bitboard(bb);
        }

        // South-West (direction 5)
        {
            let mut bb = 0u64;
            let mut r = rank.wrapping_sub(1);
            let mut f = file.wrapping_sub(1);
            while r < 8 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
                r = r.wrapping_sub(1);
                f = f.wrapping_sub(1);
            }
            rays[5][sq as usize] = Bitboard(bb);
        }

        // West (direction 6)
        {
            let mut bb = 0u64;
            let mut f = file.wrapping_sub(1);
            while f < 8 {
                bb |= 1u64 << (rank * 8 + f);
                f = f.wrapping_sub(1);
            }
            rays[6][sq as usize] = Bitboard(bb);
        }

        // North-West (direction 7)
        {
            let mut bb = 0u64;
            let mut r = rank + 1;
            let mut f = file.wrapping_sub(1);
            while r < 8 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
                r += 1;
                f = f.wrapping_sub(1);
            }
            rays[7][sq as usize] = Bitboard(bb);
        }

        sq += 1;
    }
    rays
};

/// Returns the ray in direction `dir` from `sq`, cut after the first blocker.
fn cast_ray(dir: usize, sq: u8, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir][sq as usize];
    let blockers = ray & occupied;
    // Directions 0..=2 and 7 grow towards h8, so the nearest blocker is the LSB.
    let nearest = if dir <= 2 || dir == 7 {
        blockers.lsb()
    } else {
        blockers.msb()
    };
    match nearest {
        Some(blocker_sq) => ray & !RAYS[dir][blocker_sq as usize],
        None => ray,
    }
}

/// Brute-force bishop attacks by walking the four diagonal rays.
pub fn bishop_attacks_slow(sq: u8, occupied: Bitboard) -> Bitboard {
    cast_ray(1, sq, occupied)
        | cast_ray(3, sq, occupied)
        | cast_ray(5, sq, occupied)
        | cast_ray(7, sq, occupied)
}

/// Brute-force rook attacks by walking the four orthogonal rays.
pub fn rook_attacks_slow(sq: u8, occupied: Bitboard) -> Bitboard {
    cast_ray(0, sq, occupied)
        | cast_ray(2, sq, occupied)
        | cast_ray(4, sq, occupied)
        | cast_ray(6, sq, occupied)
}

// =============================================================================
// Magic bitboards
// =============================================================================

const MAGIC_SEED: u64 = 0x5EED_CAFE_F00D_0001;
const ROOK_TABLE_SIZE: usize = 102_400;
const BISHOP_TABLE_SIZE: usize = 5_248;

#[derive(Clone, Copy, Default)]
struct Magic {
    mask: u64,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl Magic {
    #[inline(always)]
    fn index(&self, occupied: Bitboard) -> usize {
        self.offset + ((occupied.0 & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

struct SliderTables {
    rook: [Magic; 64],
    bishop: [Magic; 64],
    attacks: Vec<Bitboard>,
}

#[derive(Clone, Copy)]
enum Slider {
    Rook,
    Bishop,
}

impl Slider {
    fn slow_attacks(self, sq: u8, occupied: Bitboard) -> Bitboard {
        match self {
            Slider::Rook => rook_attacks_slow(sq, occupied),
            Slider::Bishop => bishop_attacks_slow(sq, occupied),
        }
    }

    /// Blockers that can change the attack set: edge squares never matter
    /// unless the slider sits on that edge's line.
    fn relevant_mask(self, sq: u8) -> Bitboard {
        match self {
            Slider::Rook => {
                (RAYS[0][sq as usize] & !Bitboard::RANK_8)
                    | (RAYS[4][sq as usize] & !Bitboard::RANK_1)
                    | (RAYS[2][sq as usize] & !Bitboard::FILE_H)
                    | (RAYS[6][sq as usize] & !Bitboard::FILE_A)
            }
            Slider::Bishop => {
                let edges = Bitboard::RANK_1 | Bitboard::RANK_8 | Bitboard::FILE_A | Bitboard::FILE_H;
                bishop_attacks_slow(sq, Bitboard::EMPTY) & !edges
            }
        }
    }
}

impl SliderTables {
    fn build() -> Self {
        let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
        let mut attacks = vec![Bitboard::EMPTY; ROOK_TABLE_SIZE + BISHOP_TABLE_SIZE];
        let mut rook = [Magic::default(); 64];
        let mut bishop = [Magic::default(); 64];
        let mut offset = 0usize;

        for (slider, magics) in [(Slider::Rook, &mut rook), (Slider::Bishop, &mut bishop)] {
            for sq in 0..64u8 {
                let magic = find_magic(slider, sq, offset, &mut rng, &mut attacks);
                offset += 1usize << (64 - magic.shift);
                magics[sq as usize] = magic;
            }
        }
        debug_assert_eq!(offset, attacks.len());
        debug!(entries = offset, "built magic slider tables");

        Self {
            rook,
            bishop,
            attacks,
        }
    }
}

/// Enumerates every subset of `mask` (carry-rippler), including the empty set.
fn blocker_subsets(mask: Bitboard) -> Vec<Bitboard> {
    let mut subsets = Vec::with_capacity(1 << mask.popcount());
    let mut subset = 0u64;
    loop {
        subsets.push(Bitboard(subset));
        subset = subset.wrapping_sub(mask.0) & mask.0;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// Searches for a magic for `sq` and writes its attack sets into
/// `table[offset..]`. A candidate is only accepted once every blocker subset
/// maps to a slot holding exactly the ray-cast attack set.
fn find_magic(
    slider: Slider,
    sq: u8,
    offset: usize,
    rng: &mut StdRng,
    table: &mut [Bitboard],
) -> Magic {
    let mask = slider.relevant_mask(sq);
    let bits = mask.popcount();
    let size = 1usize << bits;
    let subsets = blocker_subsets(mask);
    let reference: Vec<Bitboard> = subsets
        .iter()
        .map(|&occ| slider.slow_attacks(sq, occ))
        .collect();

    // Slot ownership is tracked per attempt so the table never needs clearing.
    let mut epoch = vec![0u32; size];
    let mut attempt = 0u32;

    loop {
        let candidate = rng.next_u64() & rng.next_u64() & rng.next_u64();
        if (mask.0.wrapping_mul(candidate) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        attempt += 1;

        let magic = Magic {
            mask: mask.0,
            magic: candidate,
            shift: 64 - bits,
            offset,
        };

        let verified = subsets.iter().zip(&reference).all(|(&occ, &attack)| {
            let slot = magic.index(occ) - offset;
            if epoch[slot] != attempt {
                epoch[slot] = attempt;
                table[offset + slot] = attack;
                true
            } else {
                table[offset + slot] == attack
            }
        });

        if verified {
            return magic;
        }
    }
}

static SLIDERS: LazyLock<SliderTables> = LazyLock::new(SliderTables::build);

/// Forces the slider tables to be built now rather than on first lookup.
pub fn init() {
    LazyLock::force(&SLIDERS);
    LazyLock::force(&ALIGNMENT);
}

/// Bishop attacks from `sq` given the board occupancy.
#[inline(always)]
pub fn bishop_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    let tables = &*SLIDERS;
    tables.attacks[tables.bishop[sq as usize].index(occupied)]
}

/// Rook attacks from `sq` given the board occupancy.
#[inline(always)]
pub fn rook_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    let tables = &*SLIDERS;
    tables.attacks[tables.rook[sq as usize].index(occupied)]
}

/// Queen attacks (union of bishop and rook attacks).
#[inline(always)]
pub fn queen_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

// =============================================================================
// Square alignment
// =============================================================================

struct Alignment {
    between: Vec<Bitboard>,
    line: Vec<Bitboard>,
}

impl Alignment {
    fn build() -> Self {
        let mut between = vec![Bitboard::EMPTY; 64 * 64];
        let mut line = vec![Bitboard::EMPTY; 64 * 64];
        for a in 0..64u8 {
            for b in 0..64u8 {
                if a == b {
                    continue;
                }
                let (a_bb, b_bb) = (Bitboard::from_square(a), Bitboard::from_square(b));
                let idx = a as usize * 64 + b as usize;
                for slider in [Slider::Rook, Slider::Bishop] {
                    if slider.slow_attacks(a, Bitboard::EMPTY).contains(b) {
                        line[idx] = (slider.slow_attacks(a, Bitboard::EMPTY)
                            & slider.slow_attacks(b, Bitboard::EMPTY))
                            | a_bb
                            | b_bb;
                        between[idx] = slider.slow_attacks(a, b_bb) & slider.slow_attacks(b, a_bb);
                    }
                }
            }
        }
        Self { between, line }
    }
}

static ALIGNMENT: LazyLock<Alignment> = LazyLock::new(Alignment::build);

/// Squares strictly between `a` and `b` when they share a line, else empty.
#[inline(always)]
pub fn between(a: u8, b: u8) -> Bitboard {
    ALIGNMENT.between[a as usize * 64 + b as usize]
}

/// The full board line through `a` and `b` (both included), else empty.
#[inline(always)]
pub fn line(a: u8, b: u8) -> Bitboard {
    ALIGNMENT.line[a as usize * 64 + b as usize]
}

/// True when `a`, `b` and `c` lie on one line.
#[inline(always)]
pub fn aligned(a: u8, b: u8, c: u8) -> bool {
    line(a, b).contains(c)
}

#[cfg(test)]
#[path = "attacks_tests.rs"]
mod attacks_tests;
