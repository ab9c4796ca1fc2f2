//! Bitboard position with incremental make/unmake.
//!
//! Everything that cannot be recomputed cheaply from the piece placement
//! lives in [`StateInfo`]. `make_move` pushes the current state on an explicit
//! history stack and `unmake_move` pops it, so an unmake restores the position
//! bit-for-bit, fingerprint included.

use std::fmt;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::types::*;
use crate::zobrist::ZOBRIST;

pub const CASTLE_WHITE_OO: u8 = 1;
pub const CASTLE_WHITE_OOO: u8 = 2;
pub const CASTLE_BLACK_OO: u8 = 4;
pub const CASTLE_BLACK_OOO: u8 = 8;
pub const CASTLE_ALL: u8 = 15;

/// Castling bits lost when a piece leaves or lands on `sq`.
#[inline(always)]
const fn castling_lost(sq: u8) -> u8 {
    match sq {
        0 => CASTLE_WHITE_OOO,
        4 => CASTLE_WHITE_OO | CASTLE_WHITE_OOO,
        7 => CASTLE_WHITE_OO,
        56 => CASTLE_BLACK_OOO,
        60 => CASTLE_BLACK_OO | CASTLE_BLACK_OOO,
        63 => CASTLE_BLACK_OO,
        _ => 0,
    }
}

/// Irreversible part of a position, saved on every make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateInfo {
    pub castling: u8,
    /// Square passed over by the last double push, if any.
    pub ep_square: Option<u8>,
    pub halfmove_clock: u32,
    /// Plies since the last null move (bounds the repetition scan).
    pub plies_from_null: u32,
    pub hash: u64,
    /// Piece captured by the move that produced this state.
    pub captured: Option<Piece>,
    /// Enemy pieces giving check to the side to move.
    pub checkers: Bitboard,
}

impl StateInfo {
    const fn empty() -> Self {
        StateInfo {
            castling: 0,
            ep_square: None,
            halfmove_clock: 0,
            plies_from_null: 0,
            hash: 0,
            captured: None,
            checkers: Bitboard::EMPTY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pieces: [[Bitboard; 6]; 2],
    colors: [Bitboard; 2],
    occupied: Bitboard,
    mailbox: [Option<Piece>; 64],
    side_to_move: Color,
    game_ply: u32,
    state: StateInfo,
    history: Vec<StateInfo>,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    /// A board with no pieces. Callers must place both kings before use.
    pub(crate) fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            mailbox: [None; 64],
            side_to_move: Color::White,
            game_ply: 0,
            state: StateInfo::empty(),
            history: Vec::with_capacity(256),
        }
    }

    pub fn startpos() -> Self {
        let mut p = Self::empty();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for f in 0..8u8 {
            p.put_piece(Piece::new(Color::White, back[f as usize]), f);
            p.put_piece(Piece::new(Color::White, PieceKind::Pawn), 8 + f);
            p.put_piece(Piece::new(Color::Black, PieceKind::Pawn), 48 + f);
            p.put_piece(Piece::new(Color::Black, back[f as usize]), 56 + f);
        }
        p.state.castling = CASTLE_ALL;
        p.refresh_derived_state();
        p
    }

    /// Recomputes the fingerprint and checkers after a bulk setup.
    pub(crate) fn refresh_derived_state(&mut self) {
        self.state.hash = self.compute_hash();
        self.state.checkers = self.compute_checkers();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.mailbox[sq as usize]
    }

    #[inline(always)]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[color.idx()][kind.idx()]
    }

    /// Both colors' pieces of `kind`.
    #[inline(always)]
    pub fn pieces_of_kind(&self, kind: PieceKind) -> Bitboard {
        self.pieces[0][kind.idx()] | self.pieces[1][kind.idx()]
    }

    #[inline(always)]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color.idx()]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline(always)]
    pub fn hash(&self) -> u64 {
        self.state.hash
    }

    #[inline(always)]
    pub fn castling_rights(&self) -> u8 {
        self.state.castling
    }

    #[inline(always)]
    pub fn can_castle(&self, right: u8) -> bool {
        self.state.castling & right != 0
    }

    #[inline(always)]
    pub fn ep_square(&self) -> Option<u8> {
        self.state.ep_square
    }

    #[inline(always)]
    pub fn halfmove_clock(&self) -> u32 {
        self.state.halfmove_clock
    }

    /// Plies played since the position was set up, offset by the FEN move
    /// number.
    #[inline(always)]
    pub fn game_ply(&self) -> u32 {
        self.game_ply
    }

    pub fn fullmove_number(&self) -> u32 {
        1 + self.game_ply / 2
    }

    #[inline(always)]
    pub fn state(&self) -> &StateInfo {
        &self.state
    }

    pub fn king_sq(&self, color: Color) -> Option<u8> {
        self.pieces(color, PieceKind::King).lsb()
    }

    #[inline(always)]
    pub fn checkers(&self) -> Bitboard {
        self.state.checkers
    }

    #[inline(always)]
    pub fn in_check(&self) -> bool {
        !self.state.checkers.is_empty()
    }

    /// True if `color` owns anything besides pawns and the king.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let c = color.idx();
        !(self.pieces[c][PieceKind::Knight.idx()]
            | self.pieces[c][PieceKind::Bishop.idx()]
            | self.pieces[c][PieceKind::Rook.idx()]
            | self.pieces[c][PieceKind::Queen.idx()])
        .is_empty()
    }

    // ------------------------------------------------------------------
    // Attacks
    // ------------------------------------------------------------------

    /// All pieces of either color attacking `sq` given `occupied`.
    pub fn attackers_to(&self, sq: u8, occupied: Bitboard) -> Bitboard {
        let bishops_queens =
            self.pieces_of_kind(PieceKind::Bishop) | self.pieces_of_kind(PieceKind::Queen);
        let rooks_queens =
            self.pieces_of_kind(PieceKind::Rook) | self.pieces_of_kind(PieceKind::Queen);

        (pawn_attacks(Color::White, sq) & self.pieces(Color::Black, PieceKind::Pawn))
            | (pawn_attacks(Color::Black, sq) & self.pieces(Color::White, PieceKind::Pawn))
            | (knight_attacks(sq) & self.pieces_of_kind(PieceKind::Knight))
            | (king_attacks(sq) & self.pieces_of_kind(PieceKind::King))
            | (bishop_attacks(sq, occupied) & bishops_queens)
            | (rook_attacks(sq, occupied) & rooks_queens)
    }

    /// Is `sq` attacked by any piece of color `by`?
    pub fn is_square_attacked(&self, sq: u8, by: Color) -> bool {
        self.is_square_attacked_with(sq, by, self.occupied)
    }

    /// Same as [`is_square_attacked`](Self::is_square_attacked) with a
    /// custom occupancy (e.g. with the king lifted off the board).
    pub fn is_square_attacked_with(&self, sq: u8, by: Color, occupied: Bitboard) -> bool {
        let them = by.idx();
        let queens = self.pieces[them][PieceKind::Queen.idx()];
        !(pawn_attacks(by.other(), sq) & self.pieces[them][PieceKind::Pawn.idx()]).is_empty()
            || !(knight_attacks(sq) & self.pieces[them][PieceKind::Knight.idx()]).is_empty()
            || !(king_attacks(sq) & self.pieces[them][PieceKind::King.idx()]).is_empty()
            || !(bishop_attacks(sq, occupied) & (self.pieces[them][PieceKind::Bishop.idx()] | queens))
                .is_empty()
            || !(rook_attacks(sq, occupied) & (self.pieces[them][PieceKind::Rook.idx()] | queens))
                .is_empty()
    }

    fn compute_checkers(&self) -> Bitboard {
        let us = self.side_to_move;
        match self.king_sq(us) {
            Some(ksq) => self.attackers_to(ksq, self.occupied) & self.color_bb(us.other()),
            None => Bitboard::EMPTY,
        }
    }

    // ------------------------------------------------------------------
    // Hashing
    // ------------------------------------------------------------------

    /// True when a pawn of `us` could capture en passant on `ep`.
    #[inline(always)]
    fn ep_capturable(&self, ep: u8, us: Color) -> bool {
        !(pawn_attacks(us.other(), ep) & self.pieces(us, PieceKind::Pawn)).is_empty()
    }

    /// Fingerprint contribution of the current en-passant square.
    #[inline(always)]
    fn ep_hash(&self) -> u64 {
        match self.state.ep_square {
            Some(ep) if self.ep_capturable(ep, self.side_to_move) => ZOBRIST.ep_key(ep % 8),
            _ => 0,
        }
    }

    /// Full recomputation of the fingerprint from the board.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for sq in self.occupied {
            if let Some(piece) = self.mailbox[sq as usize] {
                hash ^= ZOBRIST.piece_key(piece, sq);
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.side_to_move;
        }
        hash ^= ZOBRIST.castling_key(self.state.castling);
        hash ^ self.ep_hash()
    }

    // ------------------------------------------------------------------
    // Piece placement
    // ------------------------------------------------------------------

    #[inline(always)]
    pub(crate) fn put_piece(&mut self, piece: Piece, sq: u8) {
        let bb = Bitboard::from_square(sq);
        self.pieces[piece.color.idx()][piece.kind.idx()] |= bb;
        self.colors[piece.color.idx()] |= bb;
        self.occupied |= bb;
        self.mailbox[sq as usize] = Some(piece);
    }

    #[inline(always)]
    fn remove_piece(&mut self, piece: Piece, sq: u8) {
        let bb = Bitboard::from_square(sq);
        self.pieces[piece.color.idx()][piece.kind.idx()] ^= bb;
        self.colors[piece.color.idx()] ^= bb;
        self.occupied ^= bb;
        self.mailbox[sq as usize] = None;
    }

    #[inline(always)]
    fn move_piece(&mut self, piece: Piece, from: u8, to: u8) {
        let bb = Bitboard::from_square(from) | Bitboard::from_square(to);
        self.pieces[piece.color.idx()][piece.kind.idx()] ^= bb;
        self.colors[piece.color.idx()] ^= bb;
        self.occupied ^= bb;
        self.mailbox[from as usize] = None;
        self.mailbox[to as usize] = Some(piece);
    }

    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub(crate) fn set_setup_state(&mut self, castling: u8, ep: Option<u8>, halfmove: u32, ply: u32) {
        self.state.castling = castling;
        self.state.ep_square = ep;
        self.state.halfmove_clock = halfmove;
        self.state.plies_from_null = halfmove;
        self.game_ply = ply;
    }

    // ------------------------------------------------------------------
    // Make / unmake
    // ------------------------------------------------------------------

    /// Plays `mv`, which must be legal in this position.
    ///
    /// # Panics
    ///
    /// Panics if the origin square is empty.
    pub fn make_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.other();
        let from = mv.from();
        let to = mv.to();
        let Some(piece) = self.mailbox[from as usize] else {
            panic!("make_move {mv}: no piece on {}", sq_to_coord(from));
        };

        let mut next = StateInfo {
            castling: self.state.castling,
            ep_square: None,
            halfmove_clock: self.state.halfmove_clock + 1,
            plies_from_null: self.state.plies_from_null + 1,
            hash: self.state.hash ^ ZOBRIST.side_to_move ^ self.ep_hash(),
            captured: None,
            checkers: Bitboard::EMPTY,
        };

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(from, to);
            let rook = Piece::new(us, PieceKind::Rook);
            self.move_piece(piece, from, to);
            self.move_piece(rook, rook_from, rook_to);
            next.hash ^= ZOBRIST.piece_key(piece, from)
                ^ ZOBRIST.piece_key(piece, to)
                ^ ZOBRIST.piece_key(rook, rook_from)
                ^ ZOBRIST.piece_key(rook, rook_to);
        } else {
            let capture_sq = if mv.is_en_passant() {
                ep_victim_square(us, to)
            } else {
                to
            };
            if let Some(victim) = self.mailbox[capture_sq as usize] {
                debug_assert!(victim.color == them && victim.kind != PieceKind::King);
                self.remove_piece(victim, capture_sq);
                next.hash ^= ZOBRIST.piece_key(victim, capture_sq);
                next.captured = Some(victim);
                next.halfmove_clock = 0;
            }

            match mv.promo() {
                Some(kind) => {
                    let promoted = Piece::new(us, kind);
                    self.remove_piece(piece, from);
                    self.put_piece(promoted, to);
                    next.hash ^= ZOBRIST.piece_key(piece, from) ^ ZOBRIST.piece_key(promoted, to);
                }
                None => {
                    self.move_piece(piece, from, to);
                    next.hash ^= ZOBRIST.piece_key(piece, from) ^ ZOBRIST.piece_key(piece, to);
                }
            }

            if piece.kind == PieceKind::Pawn {
                next.halfmove_clock = 0;
                if from.abs_diff(to) == 16 {
                    next.ep_square = Some((from + to) / 2);
                }
            }
        }

        let lost = castling_lost(from) | castling_lost(to);
        if next.castling & lost != 0 {
            next.hash ^= ZOBRIST.castling_key(next.castling);
            next.castling &= !lost;
            next.hash ^= ZOBRIST.castling_key(next.castling);
        }

        let prev = std::mem::replace(&mut self.state, next);
        self.history.push(prev);
        self.side_to_move = them;
        self.game_ply += 1;

        // The new side to move is `them`: fold in the ep key if they can use it.
        self.state.hash ^= self.ep_hash();
        self.state.checkers = self.compute_checkers();
    }

    /// Takes back `mv`, which must be the last move made.
    pub fn unmake_move(&mut self, mv: Move) {
        let them = self.side_to_move;
        let us = them.other();
        let from = mv.from();
        let to = mv.to();
        let captured = self.state.captured;

        self.side_to_move = us;
        self.game_ply -= 1;

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(from, to);
            self.move_piece(Piece::new(us, PieceKind::King), to, from);
            self.move_piece(Piece::new(us, PieceKind::Rook), rook_to, rook_from);
        } else {
            if let Some(kind) = mv.promo() {
                self.remove_piece(Piece::new(us, kind), to);
                self.put_piece(Piece::new(us, PieceKind::Pawn), from);
            } else if let Some(piece) = self.mailbox[to as usize] {
                self.move_piece(piece, to, from);
            }

            if let Some(victim) = captured {
                let capture_sq = if mv.is_en_passant() {
                    ep_victim_square(us, to)
                } else {
                    to
                };
                self.put_piece(victim, capture_sq);
            }
        }

        debug_assert!(!self.history.is_empty(), "unmake_move without make_move");
        if let Some(prev) = self.history.pop() {
            self.state = prev;
        }
    }

    /// Passes the turn. Only valid when the side to move is not in check.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check());
        let next = StateInfo {
            castling: self.state.castling,
            ep_square: None,
            halfmove_clock: self.state.halfmove_clock + 1,
            plies_from_null: 0,
            hash: self.state.hash ^ ZOBRIST.side_to_move ^ self.ep_hash(),
            captured: None,
            checkers: Bitboard::EMPTY,
        };
        let prev = std::mem::replace(&mut self.state, next);
        self.history.push(prev);
        self.side_to_move = self.side_to_move.other();
        self.game_ply += 1;
    }

    pub fn unmake_null_move(&mut self) {
        self.side_to_move = self.side_to_move.other();
        self.game_ply -= 1;
        if let Some(prev) = self.history.pop() {
            self.state = prev;
        }
    }

    // ------------------------------------------------------------------
    // Draw rules
    // ------------------------------------------------------------------

    pub fn is_fifty_move_draw(&self) -> bool {
        self.state.halfmove_clock >= 100
    }

    /// Two-fold repetition: the current fingerprint occurred earlier with the
    /// same side to move, within the reversible part of the game.
    pub fn is_repetition(&self) -> bool {
        let window = self.state.halfmove_clock.min(self.state.plies_from_null) as usize;
        let len = self.history.len();
        let mut back = 4;
        while back <= window && back <= len {
            if self.history[len - back].hash == self.state.hash {
                return true;
            }
            back += 2;
        }
        false
    }

    /// Neither side can mate: bare kings, a single minor, or bishops all on
    /// one square color.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy_or_pawns = self.pieces_of_kind(PieceKind::Pawn)
            | self.pieces_of_kind(PieceKind::Rook)
            | self.pieces_of_kind(PieceKind::Queen);
        if !heavy_or_pawns.is_empty() {
            return false;
        }
        let knights = self.pieces_of_kind(PieceKind::Knight);
        let bishops = self.pieces_of_kind(PieceKind::Bishop);
        if (knights | bishops).popcount() <= 1 {
            return true;
        }
        knights.is_empty()
            && ((bishops & Bitboard::DARK_SQUARES).is_empty()
                || (bishops & Bitboard::LIGHT_SQUARES).is_empty())
    }

    pub fn is_draw(&self) -> bool {
        self.is_fifty_move_draw() || self.is_insufficient_material() || self.is_repetition()
    }
}

/// Rook origin and destination for a castling king move `from -> to`.
#[inline(always)]
pub fn castle_rook_squares(from: u8, to: u8) -> (u8, u8) {
    if to > from {
        (from + 3, from + 1)
    } else {
        (from - 4, from - 1)
    }
}

/// Square of the pawn removed by an en-passant capture landing on `to`.
#[inline(always)]
fn ep_victim_square(us: Color, to: u8) -> u8 {
    match us {
        Color::White => to - 8,
        Color::Black => to + 8,
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let ch = self
                    .piece_at(rank * 8 + file)
                    .map_or('.', |p| p.to_fen_char());
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", self.to_fen())?;
        write!(f, "Key: {:016X}", self.hash())
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
