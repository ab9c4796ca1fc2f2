//! Move generation.
//!
//! Candidates are produced per piece kind from the attack tables, then
//! filtered through [`is_legal`] so callers only ever see legal moves.
//! [`GenType`] selects which subset to emit, letting the search generate
//! captures and quiet moves in separate stages.

use std::ops::Deref;

use crate::attacks::{aligned, attacks_of, between, bishop_attacks, line, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::*;
use crate::types::*;

/// Which moves to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenType {
    All,
    /// Captures (en passant included) and every promotion.
    Noisy,
    /// Everything `Noisy` leaves out, castling included.
    Quiet,
    /// Captures only, capture-promotions included.
    Captures,
}

/// Upper bound on legal moves in any reachable position is 218.
pub const MAX_MOVES: usize = 256;

/// Fixed-capacity move buffer that lives on the stack.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NONE; MAX_MOVES],
            len: 0,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Keeps only the moves for which `keep` returns true (order preserved).
    pub fn retain(&mut self, mut keep: impl FnMut(Move) -> bool) {
        let mut write = 0;
        for read in 0..self.len {
            let mv = self.moves[read];
            if keep(mv) {
                self.moves[write] = mv;
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MoveList {
    type Target = [Move];

    #[inline(always)]
    fn deref(&self) -> &[Move] {
        &self.moves[..self.len]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Generate all legal moves, returning a freshly allocated vector.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    legal_moves_into(pos, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across calls.
pub fn legal_moves_into(pos: &Position, out: &mut Vec<Move>) {
    let mut list = MoveList::new();
    generate(pos, GenType::All, &mut list);
    out.clear();
    out.extend_from_slice(&list);
}

/// Fills `list` with the legal moves of kind `gen_type`.
pub fn generate(pos: &Position, gen_type: GenType, list: &mut MoveList) {
    list.clear();
    generate_pseudo(pos, gen_type, list);
    list.retain(|mv| is_legal(pos, mv));
}

fn generate_pseudo(pos: &Position, gen_type: GenType, list: &mut MoveList) {
    let us = pos.side_to_move();
    let occupied = pos.occupied();
    let enemies = pos.color_bb(us.other());

    gen_pawns(pos, gen_type, list);

    let targets = match gen_type {
        GenType::All => !pos.color_bb(us),
        GenType::Noisy | GenType::Captures => enemies,
        GenType::Quiet => !occupied,
    };
    for kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        for from in pos.pieces(us, kind) {
            for to in attacks_of(kind, us, from, occupied) & targets {
                list.push(Move::new(from, to));
            }
        }
    }

    if matches!(gen_type, GenType::All | GenType::Quiet) && !pos.in_check() {
        gen_castling(pos, list);
    }
}

#[inline(always)]
fn push_promotions(list: &mut MoveList, from: u8, to: u8) {
    for kind in PieceKind::PROMOTIONS {
        list.push(Move::promotion(from, to, kind));
    }
}

fn gen_pawns(pos: &Position, gen_type: GenType, list: &mut MoveList) {
    let us = pos.side_to_move();
    let white = us == Color::White;
    let pawns = pos.pieces(us, PieceKind::Pawn);
    let empty = !pos.occupied();
    let enemies = pos.color_bb(us.other());
    let (promo_rank, third_rank, up) = if white {
        (Bitboard::RANK_8, Bitboard::RANK_3, 8i8)
    } else {
        (Bitboard::RANK_1, Bitboard::RANK_6, -8i8)
    };
    let back = |to: u8, steps: i8| (to as i8 - up * steps) as u8;

    let single = pawns.forward(white) & empty;

    if matches!(gen_type, GenType::All | GenType::Quiet) {
        let double = (single & third_rank).forward(white) & empty;
        for to in single & !promo_rank {
            list.push(Move::new(back(to, 1), to));
        }
        for to in double {
            list.push(Move::new(back(to, 2), to));
        }
    }

    if matches!(gen_type, GenType::All | GenType::Noisy) {
        for to in single & promo_rank {
            push_promotions(list, back(to, 1), to);
        }
    }

    if gen_type != GenType::Quiet {
        for from in pawns {
            for to in pawn_attacks(us, from) & enemies {
                if promo_rank.contains(to) {
                    push_promotions(list, from, to);
                } else {
                    list.push(Move::new(from, to));
                }
            }
        }
        if let Some(ep) = pos.ep_square() {
            for from in pawn_attacks(us.other(), ep) & pawns {
                list.push(Move::en_passant(from, ep));
            }
        }
    }
}

/// (right, king from, king to, squares that must be empty, squares the king crosses)
const CASTLES: [(u8, u8, u8, Bitboard, [u8; 2]); 4] = [
    (CASTLE_WHITE_OO, 4, 6, Bitboard::WHITE_OO_PATH, [5, 6]),
    (CASTLE_WHITE_OOO, 4, 2, Bitboard::WHITE_OOO_PATH, [3, 2]),
    (CASTLE_BLACK_OO, 60, 62, Bitboard::BLACK_OO_PATH, [61, 62]),
    (CASTLE_BLACK_OOO, 60, 58, Bitboard::BLACK_OOO_PATH, [59, 58]),
];

fn castle_path(mv: Move) -> Option<(u8, Bitboard, [u8; 2])> {
    CASTLES
        .iter()
        .find(|c| c.1 == mv.from() && c.2 == mv.to())
        .map(|&(right, _, _, path, crossed)| (right, path, crossed))
}

fn gen_castling(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let home = if us == Color::White { 4 } else { 60 };
    for (right, from, to, path, _) in CASTLES {
        if from == home && pos.can_castle(right) && (pos.occupied() & path).is_empty() {
            list.push(Move::castle(from, to));
        }
    }
}

/// Full legality test for a move already known to be pseudo-legal.
pub fn is_legal(pos: &Position, mv: Move) -> bool {
    let us = pos.side_to_move();
    let them = us.other();
    let from = mv.from();
    let to = mv.to();
    let Some(ksq) = pos.king_sq(us) else {
        return false;
    };
    let from_bb = Bitboard::from_square(from);
    let to_bb = Bitboard::from_square(to);

    if mv.is_en_passant() {
        // Two pawns leave the capture rank at once; recheck the king from scratch.
        let victim = if us == Color::White { to - 8 } else { to + 8 };
        let victim_bb = Bitboard::from_square(victim);
        let occupied = (pos.occupied() ^ from_bb ^ victim_bb) | to_bb;
        let attackers = pos.attackers_to(ksq, occupied) & pos.color_bb(them) & !victim_bb;
        return attackers.is_empty();
    }

    if from == ksq {
        if mv.is_castle() {
            return match castle_path(mv) {
                Some((_, _, crossed)) => {
                    !pos.in_check() && crossed.iter().all(|&sq| !pos.is_square_attacked(sq, them))
                }
                None => false,
            };
        }
        return !pos.is_square_attacked_with(to, them, pos.occupied() ^ from_bb);
    }

    let checkers = pos.checkers();
    if checkers.more_than_one() {
        return false;
    }
    if let Some(checker) = checkers.lsb()
        && !(between(ksq, checker) | Bitboard::from_square(checker)).contains(to)
    {
        return false;
    }

    // A piece off every line through the king cannot be pinned, and one
    // moving along its pin line stays shielded.
    if line(ksq, from).is_empty() || aligned(ksq, from, to) {
        return true;
    }
    let occupied = (pos.occupied() ^ from_bb) | to_bb;
    let queens = pos.pieces(them, PieceKind::Queen);
    let diagonal = (pos.pieces(them, PieceKind::Bishop) | queens) & !to_bb;
    let orthogonal = (pos.pieces(them, PieceKind::Rook) | queens) & !to_bb;
    (bishop_attacks(ksq, occupied) & diagonal).is_empty()
        && (rook_attacks(ksq, occupied) & orthogonal).is_empty()
}

/// Checks whether an arbitrary move (hash move, killer) could have been
/// generated in this position. Legality still needs [`is_legal`].
pub fn is_pseudo_legal(pos: &Position, mv: Move) -> bool {
    if mv.is_none() {
        return false;
    }
    let us = pos.side_to_move();
    let from = mv.from();
    let to = mv.to();
    let Some(piece) = pos.piece_at(from) else {
        return false;
    };
    if piece.color != us || pos.color_bb(us).contains(to) {
        return false;
    }

    if mv.is_castle() {
        return piece.kind == PieceKind::King
            && !pos.in_check()
            && castle_path(mv).is_some_and(|(right, path, _)| {
                pos.can_castle(right) && (pos.occupied() & path).is_empty()
            });
    }

    if piece.kind != PieceKind::Pawn {
        return !mv.is_promotion()
            && !mv.is_en_passant()
            && attacks_of(piece.kind, us, from, pos.occupied()).contains(to);
    }

    let promo_rank = if us == Color::White {
        Bitboard::RANK_8
    } else {
        Bitboard::RANK_1
    };
    if mv.is_promotion() != promo_rank.contains(to) {
        return false;
    }
    if mv.is_en_passant() {
        return pos.ep_square() == Some(to) && pawn_attacks(us, from).contains(to);
    }
    if pos.color_bb(us.other()).contains(to) {
        return pawn_attacks(us, from).contains(to);
    }
    if pos.occupied().contains(to) {
        return false;
    }
    let white = us == Color::White;
    let single = Bitboard::from_square(from).forward(white);
    if single.contains(to) {
        return true;
    }
    let start_rank = if white { Bitboard::RANK_2 } else { Bitboard::RANK_7 };
    start_rank.contains(from)
        && (single & pos.occupied()).is_empty()
        && single.forward(white).contains(to)
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
