//! Static exchange evaluation.

use chess_core::attacks::{bishop_attacks, rook_attacks};
use chess_core::{Bitboard, Move, PieceKind, Position};

/// Exchange values indexed by `PieceKind::idx()`.
pub const SEE_VALUES: [i32; 6] = [100, 320, 330, 500, 950, 0];

#[inline]
pub fn see_value(kind: PieceKind) -> i32 {
    SEE_VALUES[kind.idx()]
}

/// Does `mv` win at least `threshold` material once every recapture on the
/// target square has been played out, least valuable attacker first?
///
/// Sliders hidden behind a capturing piece join the exchange as it leaves.
/// Pins are ignored. Castling, en passant and promotions are scored as an
/// even trade.
pub fn see_ge(pos: &Position, mv: Move, threshold: i32) -> bool {
    if mv.is_castle() || mv.is_en_passant() || mv.is_promotion() {
        return threshold <= 0;
    }
    let from = mv.from();
    let to = mv.to();
    let Some(mover) = pos.piece_at(from) else {
        return false;
    };

    let mut swap = pos.piece_at(to).map_or(0, |p| see_value(p.kind)) - threshold;
    if swap < 0 {
        return false;
    }
    swap = see_value(mover.kind) - swap;
    if swap <= 0 {
        return true;
    }

    let diagonal = pos.pieces_of_kind(PieceKind::Bishop) | pos.pieces_of_kind(PieceKind::Queen);
    let orthogonal = pos.pieces_of_kind(PieceKind::Rook) | pos.pieces_of_kind(PieceKind::Queen);

    let mut occupied = pos.occupied() ^ Bitboard::from_square(from) ^ Bitboard::from_square(to);
    let mut attackers = pos.attackers_to(to, occupied);
    let mut stm = mover.color;
    let mut res = true;

    loop {
        stm = stm.other();
        attackers &= occupied;
        let ours = attackers & pos.color_bb(stm);
        if ours.is_empty() {
            break;
        }
        res = !res;

        let Some((kind, sq)) = least_valuable(pos, ours) else {
            break;
        };
        if kind == PieceKind::King {
            // The king may only recapture when nothing defends the square.
            return if (attackers & !pos.color_bb(stm)).is_empty() {
                res
            } else {
                !res
            };
        }

        swap = see_value(kind) - swap;
        if swap < res as i32 {
            break;
        }

        occupied ^= Bitboard::from_square(sq);
        if matches!(kind, PieceKind::Pawn | PieceKind::Bishop | PieceKind::Queen) {
            attackers |= bishop_attacks(to, occupied) & diagonal;
        }
        if matches!(kind, PieceKind::Rook | PieceKind::Queen) {
            attackers |= rook_attacks(to, occupied) & orthogonal;
        }
    }
    res
}

fn least_valuable(pos: &Position, attackers: Bitboard) -> Option<(PieceKind, u8)> {
    PieceKind::ALL.into_iter().find_map(|kind| {
        (attackers & pos.pieces_of_kind(kind))
            .lsb()
            .map(|sq| (kind, sq))
    })
}

#[cfg(test)]
#[path = "see_tests.rs"]
mod see_tests;
