//! Staged, lazily scored move ordering.
//!
//! A picker hands out one move at a time: the hash move first, then
//! captures that survive static exchange, the two killers, quiet moves
//! ordered by history, and finally the losing captures and the quiets that
//! history dislikes. Each stage generates and scores only when reached, so
//! a cutoff on the hash move never pays for move generation. Every move
//! returned is legal and no move is returned twice.

use chess_core::attacks::{bishop_attacks, knight_attacks, pawn_attacks, rook_attacks};
use chess_core::{
    Bitboard, Color, GenType, MAX_MOVES, Move, MoveList, Piece, PieceKind, Position, generate,
    is_legal, is_pseudo_legal,
};

use crate::history::{ContContext, History};
use crate::see::{see_ge, see_value};

/// Quiet moves scoring below this wait until after the losing captures.
const GOOD_QUIET_THRESHOLD: i32 = -7_000;

/// Bonus for moving a piece out of an attack by a cheaper piece, by kind.
const ESCAPE_BONUS: [i32; 6] = [0, 6_000, 6_000, 10_000, 16_000, 0];
/// Penalty for moving onto a square a cheaper enemy piece attacks.
const EN_PRISE_PENALTY: [i32; 6] = [0, 4_000, 4_000, 8_000, 12_000, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveClass {
    GoodNoisy,
    BadNoisy,
    Killer,
    GoodQuiet,
    BadQuiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<PieceKind>,
    pub score: i32,
    pub class: MoveClass,
}

impl ScoredMove {
    pub(crate) const EMPTY: ScoredMove = ScoredMove {
        mv: Move::NONE,
        piece: Piece::new(Color::White, PieceKind::Pawn),
        captured: None,
        score: 0,
        class: MoveClass::BadQuiet,
    };

    #[inline]
    pub fn is_quiet(&self) -> bool {
        self.captured.is_none() && !self.mv.is_promotion()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    TtMove,
    GenNoisy,
    GoodNoisy,
    Killer1,
    Killer2,
    GenQuiet,
    GoodQuiet,
    BadNoisy,
    BadQuiet,
    QsTtMove,
    QsGenNoisy,
    QsNoisy,
    End,
}

/// Piece kind captured by `mv`, en passant included.
#[inline]
pub fn captured_kind(pos: &Position, mv: Move) -> Option<PieceKind> {
    if mv.is_en_passant() {
        Some(PieceKind::Pawn)
    } else if mv.is_castle() {
        None
    } else {
        pos.piece_at(mv.to()).map(|p| p.kind)
    }
}

#[inline]
pub fn is_noisy(pos: &Position, mv: Move) -> bool {
    mv.is_promotion() || captured_kind(pos, mv).is_some()
}

/// Squares attacked by enemy pawns, by enemy minors or less, by enemy rooks
/// or less.
struct Threats {
    by_pawn: Bitboard,
    by_minor: Bitboard,
    by_rook: Bitboard,
}

impl Threats {
    fn new(pos: &Position, us: Color) -> Self {
        let them = us.other();
        let occupied = pos.occupied();
        let mut by_pawn = Bitboard::EMPTY;
        for sq in pos.pieces(them, PieceKind::Pawn) {
            by_pawn |= pawn_attacks(them, sq);
        }
        let mut by_minor = by_pawn;
        for sq in pos.pieces(them, PieceKind::Knight) {
            by_minor |= knight_attacks(sq);
        }
        for sq in pos.pieces(them, PieceKind::Bishop) {
            by_minor |= bishop_attacks(sq, occupied);
        }
        let mut by_rook = by_minor;
        for sq in pos.pieces(them, PieceKind::Rook) {
            by_rook |= rook_attacks(sq, occupied);
        }
        Threats {
            by_pawn,
            by_minor,
            by_rook,
        }
    }

    /// Squares where a piece of `kind` can be hit by something cheaper.
    fn against(&self, kind: PieceKind) -> Bitboard {
        match kind {
            PieceKind::Queen => self.by_rook,
            PieceKind::Rook => self.by_minor,
            PieceKind::Knight | PieceKind::Bishop => self.by_pawn,
            PieceKind::Pawn | PieceKind::King => Bitboard::EMPTY,
        }
    }
}

pub struct MovePicker {
    stage: Stage,
    tt_move: Option<Move>,
    killers: [Move; 2],
    cont: ContContext,
    skip_quiets: bool,
    moves: [ScoredMove; MAX_MOVES],
    cur: usize,
    /// `[0, good_noisy_end)` good captures, `[good_noisy_end, noisy_end)` bad ones.
    good_noisy_end: usize,
    noisy_end: usize,
    bad_cur: usize,
    good_quiet_end: usize,
    end: usize,
}

impl MovePicker {
    /// Picker for the main search. `tt_move` and `killers` may be stale or
    /// illegal; they are validated here.
    pub fn new(pos: &Position, tt_move: Option<Move>, killers: [Move; 2], cont: ContContext) -> Self {
        let tt_move = tt_move.filter(|&mv| is_pseudo_legal(pos, mv) && is_legal(pos, mv));
        Self::with_stage(Stage::TtMove, tt_move, killers, cont)
    }

    /// Picker for quiescence search. Out of check only noisy moves are
    /// produced; in check every evasion is.
    pub fn new_qsearch(pos: &Position, tt_move: Option<Move>) -> Self {
        if pos.in_check() {
            return Self::new(pos, tt_move, [Move::NONE; 2], [None; 2]);
        }
        let tt_move = tt_move
            .filter(|&mv| is_pseudo_legal(pos, mv) && is_noisy(pos, mv) && is_legal(pos, mv));
        Self::with_stage(Stage::QsTtMove, tt_move, [Move::NONE; 2], [None; 2])
    }

    fn with_stage(stage: Stage, tt_move: Option<Move>, killers: [Move; 2], cont: ContContext) -> Self {
        MovePicker {
            stage,
            tt_move,
            killers,
            cont,
            skip_quiets: false,
            moves: [ScoredMove::EMPTY; MAX_MOVES],
            cur: 0,
            good_noisy_end: 0,
            noisy_end: 0,
            bad_cur: 0,
            good_quiet_end: 0,
            end: 0,
        }
    }

    /// Stops handing out quiet moves (late-move pruning). Losing captures
    /// still follow.
    pub fn skip_quiets(&mut self) {
        self.skip_quiets = true;
    }

    pub fn next(&mut self, pos: &Position, history: &History) -> Option<ScoredMove> {
        loop {
            match self.stage {
                Stage::TtMove => {
                    self.stage = Stage::GenNoisy;
                    if let Some(mv) = self.tt_move
                        && let Some(sm) = self.describe(pos, history, mv)
                    {
                        return Some(sm);
                    }
                }
                Stage::GenNoisy => {
                    self.generate_noisy(pos, history, true);
                    self.stage = Stage::GoodNoisy;
                }
                Stage::GoodNoisy => {
                    if let Some(sm) = self.select(self.good_noisy_end) {
                        return Some(sm);
                    }
                    self.stage = Stage::Killer1;
                }
                Stage::Killer1 | Stage::Killer2 => {
                    let slot = if self.stage == Stage::Killer1 { 0 } else { 1 };
                    self.stage = if slot == 0 { Stage::Killer2 } else { Stage::GenQuiet };
                    if let Some(sm) = self.killer(pos, history, slot) {
                        return Some(sm);
                    }
                }
                Stage::GenQuiet => {
                    if !self.skip_quiets {
                        self.generate_quiet(pos, history);
                    }
                    self.stage = Stage::GoodQuiet;
                }
                Stage::GoodQuiet => {
                    if !self.skip_quiets
                        && let Some(sm) = self.select(self.good_quiet_end)
                    {
                        return Some(sm);
                    }
                    self.bad_cur = self.good_noisy_end;
                    self.stage = Stage::BadNoisy;
                }
                Stage::BadNoisy => {
                    if self.bad_cur < self.noisy_end {
                        let sm = self.moves[self.bad_cur];
                        self.bad_cur += 1;
                        return Some(sm);
                    }
                    self.cur = self.good_quiet_end;
                    self.stage = Stage::BadQuiet;
                }
                Stage::BadQuiet => {
                    if !self.skip_quiets
                        && let Some(sm) = self.select(self.end)
                    {
                        return Some(sm);
                    }
                    self.stage = Stage::End;
                }
                Stage::QsTtMove => {
                    self.stage = Stage::QsGenNoisy;
                    if let Some(mv) = self.tt_move
                        && let Some(sm) = self.describe(pos, history, mv)
                    {
                        return Some(sm);
                    }
                }
                Stage::QsGenNoisy => {
                    self.generate_noisy(pos, history, false);
                    self.stage = Stage::QsNoisy;
                }
                Stage::QsNoisy => {
                    if let Some(sm) = self.select(self.noisy_end) {
                        return Some(sm);
                    }
                    self.stage = Stage::End;
                }
                Stage::End => return None,
            }
        }
    }

    /// Takes the best remaining move in `[cur, end)`.
    fn select(&mut self, end: usize) -> Option<ScoredMove> {
        if self.cur >= end {
            return None;
        }
        let best = (self.cur..end).max_by_key(|&i| self.moves[i].score)?;
        self.moves.swap(self.cur, best);
        self.cur += 1;
        Some(self.moves[self.cur - 1])
    }

    fn describe(&self, pos: &Position, history: &History, mv: Move) -> Option<ScoredMove> {
        let piece = pos.piece_at(mv.from())?;
        Some(if is_noisy(pos, mv) {
            score_noisy(pos, history, mv, piece, false)
        } else {
            let threats = Threats::new(pos, piece.color);
            score_quiet(history, &self.cont, &threats, mv, piece)
        })
    }

    fn killer(&self, pos: &Position, history: &History, slot: usize) -> Option<ScoredMove> {
        if self.skip_quiets {
            return None;
        }
        let mv = self.killers[slot];
        if Some(mv) == self.tt_move
            || (slot == 1 && mv == self.killers[0])
            || !is_pseudo_legal(pos, mv)
            || is_noisy(pos, mv)
            || !is_legal(pos, mv)
        {
            return None;
        }
        let piece = pos.piece_at(mv.from())?;
        Some(ScoredMove {
            mv,
            piece,
            captured: None,
            score: history.quiet(piece.color, mv),
            class: MoveClass::Killer,
        })
    }

    /// Scores noisy moves into `moves[0..]`. With `split`, losing captures
    /// are moved behind the winning ones.
    fn generate_noisy(&mut self, pos: &Position, history: &History, split: bool) {
        let mut list = MoveList::new();
        generate(pos, GenType::Noisy, &mut list);
        let mut n = 0;
        for &mv in &list {
            if Some(mv) == self.tt_move {
                continue;
            }
            let Some(piece) = pos.piece_at(mv.from()) else {
                continue;
            };
            self.moves[n] = score_noisy(pos, history, mv, piece, split);
            n += 1;
        }
        self.noisy_end = n;

        let mut good = 0;
        if split {
            for i in 0..n {
                if self.moves[i].class == MoveClass::GoodNoisy {
                    self.moves.swap(good, i);
                    good += 1;
                }
            }
        } else {
            good = n;
        }
        self.good_noisy_end = good;
        self.cur = 0;
    }

    /// Scores quiet moves behind the noisy block, good ones first.
    fn generate_quiet(&mut self, pos: &Position, history: &History) {
        let mut list = MoveList::new();
        generate(pos, GenType::Quiet, &mut list);
        let threats = Threats::new(pos, pos.side_to_move());
        let start = self.noisy_end;
        let mut n = start;
        for &mv in &list {
            if Some(mv) == self.tt_move || self.killers.contains(&mv) {
                continue;
            }
            let Some(piece) = pos.piece_at(mv.from()) else {
                continue;
            };
            self.moves[n] = score_quiet(history, &self.cont, &threats, mv, piece);
            n += 1;
        }
        self.end = n;

        let mut good = start;
        for i in start..n {
            if self.moves[i].class == MoveClass::GoodQuiet {
                self.moves.swap(good, i);
                good += 1;
            }
        }
        self.good_quiet_end = good;
        self.cur = start;
    }
}

fn score_noisy(pos: &Position, history: &History, mv: Move, piece: Piece, use_see: bool) -> ScoredMove {
    let captured = captured_kind(pos, mv);
    let victim_value = captured.map_or(0, see_value);
    let (score, good) = match mv.promo() {
        Some(kind) => (
            see_value(kind) - see_value(PieceKind::Pawn) + victim_value,
            kind == PieceKind::Queen,
        ),
        None => {
            let hist = captured.map_or(0, |kind| history.capture(piece, mv.to(), kind));
            let score = 8 * victim_value + hist;
            (score, !use_see || see_ge(pos, mv, -score / 16))
        }
    };
    ScoredMove {
        mv,
        piece,
        captured,
        score,
        class: if good {
            MoveClass::GoodNoisy
        } else {
            MoveClass::BadNoisy
        },
    }
}

fn score_quiet(history: &History, cont: &ContContext, threats: &Threats, mv: Move, piece: Piece) -> ScoredMove {
    let mut score = history.quiet(piece.color, mv) + history.continuation(cont, piece, mv.to());

    let danger = threats.against(piece.kind);
    let k = piece.kind.idx();
    if danger.contains(mv.from()) && !danger.contains(mv.to()) {
        score += ESCAPE_BONUS[k];
    } else if !danger.contains(mv.from()) && danger.contains(mv.to()) {
        score -= EN_PRISE_PENALTY[k];
    }

    ScoredMove {
        mv,
        piece,
        captured: None,
        score,
        class: if score >= GOOD_QUIET_THRESHOLD {
            MoveClass::GoodQuiet
        } else {
            MoveClass::BadQuiet
        },
    }
}

#[cfg(test)]
#[path = "movepicker_tests.rs"]
mod movepicker_tests;
