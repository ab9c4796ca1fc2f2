//! Iterative deepening principal variation search for one worker.
//!
//! Every worker searches the same root on its own copy of the position
//! with its own history tables. Workers meet only in the transposition
//! table, the node counter and the stop flags.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chess_core::time_control::CHECK_INTERVAL;
use chess_core::{Color, InfoSink, Move, PieceKind, Position, SearchInfo, TimeControl};
use tracing::debug;

use crate::eval::Evaluator;
use crate::history::{ContContext, ContKey, stat_bonus, stat_malus};
use crate::movepicker::{MovePicker, ScoredMove};
use crate::score::{DRAW, INF, MATE_BOUND, MAX_PLY, is_mate, mate_in, mated_in, to_uci};
use crate::see::{see_ge, see_value};
use crate::thread::ThreadData;
use crate::tt::{Bound, TranspositionTable};

const ASPIRATION_MIN_DEPTH: i32 = 4;
const ASPIRATION_DELTA: i32 = 25;

const RFP_MAX_DEPTH: i32 = 8;
const RFP_MARGIN: i32 = 80;

const NMP_MIN_DEPTH: i32 = 3;

const FUTILITY_MAX_DEPTH: i32 = 6;
const FUTILITY_BASE: i32 = 100;
const FUTILITY_PER_DEPTH: i32 = 90;

const LMP_MAX_DEPTH: i32 = 8;

const SEE_PRUNE_MAX_DEPTH: i32 = 8;
const SEE_QUIET_MARGIN: i32 = 50;
const SEE_NOISY_MARGIN: i32 = 90;

const LMR_MIN_DEPTH: i32 = 3;

/// Qsearch skips captures that cannot lift the eval back to alpha even
/// with this much to spare.
const DELTA_MARGIN: i32 = 200;

/// Tried moves remembered per node for history penalties.
const MAX_TRIED: usize = 32;

static LMR_TABLE: LazyLock<[[i32; 64]; 64]> = LazyLock::new(|| {
    let mut table = [[0; 64]; 64];
    for (depth, row) in table.iter_mut().enumerate().skip(1) {
        for (played, r) in row.iter_mut().enumerate().skip(1) {
            *r = ((depth as f64).ln() * (played as f64).ln() / 2.25) as i32;
        }
    }
    table
});

#[inline]
fn reduction(depth: i32, played: usize) -> i32 {
    LMR_TABLE[(depth as usize).min(63)][played.min(63)]
}

#[inline]
fn lmp_limit(depth: i32, improving: bool) -> usize {
    ((3 + depth * depth) / (2 - improving as i32)) as usize
}

/// Cross-thread state owned by one `go`.
#[derive(Debug, Default)]
pub(crate) struct SharedState {
    pub nodes: AtomicU64,
    /// Raised once the main worker is finished or a thread failed.
    pub done: AtomicBool,
}

/// Result of the deepest iteration a worker completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Iteration {
    pub depth: i32,
    pub score: i32,
    pub seldepth: usize,
    pub pv: Vec<Move>,
}

#[derive(Debug)]
pub(crate) struct WorkerReport {
    pub id: usize,
    pub nodes: u64,
    pub aborted: bool,
    pub completed: Option<Iteration>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    /// Move played from this ply; `None` after a null move.
    cont: Option<ContKey>,
    static_eval: Option<i32>,
}

/// One line of the triangular PV table.
#[derive(Clone)]
struct PvLine {
    moves: [Move; MAX_PLY + 1],
    len: usize,
}

impl PvLine {
    const EMPTY: PvLine = PvLine {
        moves: [Move::NONE; MAX_PLY + 1],
        len: 0,
    };

    fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }
}

pub(crate) struct Worker<'a, E: Evaluator> {
    id: usize,
    pos: Position,
    td: &'a mut ThreadData<E>,
    tt: &'a TranspositionTable,
    tc: &'a TimeControl,
    shared: &'a SharedState,
    nodes: u64,
    flushed: u64,
    seldepth: usize,
    root_depth: i32,
    aborted: bool,
    stack: Vec<Frame>,
    pv: Vec<PvLine>,
    completed: Option<Iteration>,
}

impl<'a, E: Evaluator> Worker<'a, E> {
    pub fn new(
        pos: &Position,
        td: &'a mut ThreadData<E>,
        tt: &'a TranspositionTable,
        tc: &'a TimeControl,
        shared: &'a SharedState,
    ) -> Self {
        Self {
            id: td.id,
            pos: pos.clone(),
            td,
            tt,
            tc,
            shared,
            nodes: 0,
            flushed: 0,
            seldepth: 0,
            root_depth: 0,
            aborted: false,
            stack: vec![Frame::default(); MAX_PLY + 2],
            pv: vec![PvLine::EMPTY; MAX_PLY + 2],
            completed: None,
        }
    }

    /// Iterative deepening up to `max_depth`. Only the main worker reports
    /// progress and honours the soft time limit.
    pub fn run(mut self, max_depth: i32, info: Option<&InfoSink>) -> WorkerReport {
        self.td.history.clear_killers();
        self.td.eval.reset(&self.pos);

        let mut score = 0;
        for depth in 1..=max_depth {
            if self.id > 0 && depth > 1 && (depth as usize + self.id) % 2 == 0 {
                continue;
            }
            self.root_depth = depth;
            self.seldepth = 0;
            score = self.aspiration(depth, score);
            if self.aborted {
                break;
            }

            let iteration = Iteration {
                depth,
                score,
                seldepth: self.seldepth,
                pv: self.pv[0].as_slice().to_vec(),
            };
            if self.id == 0 {
                self.report(&iteration, info);
            }
            self.completed = Some(iteration);

            if self.id == 0 && self.tc.soft_limit_reached() {
                break;
            }
        }

        self.flush_nodes();
        WorkerReport {
            id: self.id,
            nodes: self.nodes,
            aborted: self.aborted,
            completed: self.completed,
        }
    }

    fn report(&self, it: &Iteration, info: Option<&InfoSink>) {
        let nodes = self.shared.nodes.load(Ordering::Relaxed) + (self.nodes - self.flushed);
        debug!(depth = it.depth, score = it.score, nodes, "iteration complete");
        if let Some(sink) = info {
            sink(&SearchInfo {
                depth: it.depth as u8,
                seldepth: it.seldepth as u8,
                score: to_uci(it.score),
                nodes,
                time: self.tc.elapsed(),
                hashfull: self.tt.hashfull(),
                pv: it.pv.clone(),
            });
        }
    }

    fn aspiration(&mut self, depth: i32, prev: i32) -> i32 {
        let mut delta = ASPIRATION_DELTA;
        let (mut alpha, mut beta) = if depth >= ASPIRATION_MIN_DEPTH {
            ((prev - delta).max(-INF), (prev + delta).min(INF))
        } else {
            (-INF, INF)
        };

        loop {
            let score = self.negamax(depth, alpha, beta, 0);
            if self.aborted {
                return score;
            }
            if score <= alpha {
                beta = (alpha + beta) / 2;
                alpha = (score - delta).max(-INF);
            } else if score >= beta {
                beta = (score + delta).min(INF);
            } else {
                return score;
            }
            delta += delta / 2;
        }
    }

    fn flush_nodes(&mut self) -> u64 {
        let pending = self.nodes - self.flushed;
        self.flushed = self.nodes;
        self.shared.nodes.fetch_add(pending, Ordering::Relaxed) + pending
    }

    /// Counts a node and polls the stop conditions. The clock and the node
    /// limit are looked at every `CHECK_INTERVAL` local nodes.
    fn should_abort(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        self.nodes += 1;
        let stopped = if self.nodes - self.flushed >= CHECK_INTERVAL {
            let total = self.flush_nodes();
            self.tc.should_stop(total) || self.tc.check_time()
        } else {
            self.tc.is_stopped()
        };
        self.aborted = stopped || self.shared.done.load(Ordering::Relaxed);
        self.aborted
    }

    fn cont_context(&self, ply: usize) -> ContContext {
        [
            ply.checked_sub(1).and_then(|p| self.stack[p].cont),
            ply.checked_sub(2).and_then(|p| self.stack[p].cont),
        ]
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let (head, tail) = self.pv.split_at_mut(ply + 1);
        let line = &mut head[ply];
        let child = &tail[0];
        line.moves[0] = mv;
        line.moves[1..=child.len].copy_from_slice(child.as_slice());
        line.len = child.len + 1;
    }

    fn make(&mut self, ply: usize, sm: &ScoredMove) {
        self.stack[ply].cont = Some(ContKey {
            piece: sm.piece,
            to: sm.mv.to(),
        });
        self.td.eval.on_make_move(&self.pos, sm.mv);
        self.pos.make_move(sm.mv);
    }

    fn unmake(&mut self, mv: Move) {
        self.pos.unmake_move(mv);
        self.td.eval.on_unmake_move();
    }

    fn negamax(&mut self, depth: i32, mut alpha: i32, mut beta: i32, ply: usize) -> i32 {
        let root = ply == 0;
        let pv_node = beta - alpha > 1;
        self.pv[ply].len = 0;

        if depth <= 0 {
            return self.qsearch(alpha, beta, ply);
        }
        if self.should_abort() {
            return 0;
        }
        self.seldepth = self.seldepth.max(ply);

        let in_check = self.pos.in_check();
        if !root {
            if self.pos.is_draw() {
                return DRAW;
            }
            if ply >= MAX_PLY {
                return if in_check { DRAW } else { self.td.eval.evaluate(&self.pos) };
            }
            alpha = alpha.max(mated_in(ply));
            beta = beta.min(mate_in(ply + 1));
            if alpha >= beta {
                return alpha;
            }
        }

        let key = self.pos.hash();
        let tt_hit = self.tt.probe(key, ply);
        let tt_move = tt_hit.and_then(|hit| hit.mv);
        if !pv_node
            && let Some(hit) = tt_hit
            && hit.is_usable(depth, alpha, beta)
        {
            return hit.score;
        }

        let static_eval = if in_check {
            None
        } else {
            Some(match tt_hit.and_then(|hit| hit.eval) {
                Some(eval) => eval,
                None => self.td.eval.evaluate(&self.pos),
            })
        };
        self.stack[ply].static_eval = static_eval;
        let improving = match (static_eval, ply.checked_sub(2).and_then(|p| self.stack[p].static_eval)) {
            (Some(eval), Some(earlier)) => eval > earlier,
            _ => false,
        };
        let after_null = ply > 0 && self.stack[ply - 1].cont.is_none();

        if !pv_node && let Some(eval) = static_eval {
            if depth <= RFP_MAX_DEPTH
                && !is_mate(beta)
                && eval - RFP_MARGIN * (depth - improving as i32) >= beta
            {
                return eval;
            }

            if depth >= NMP_MIN_DEPTH
                && eval >= beta
                && !after_null
                && !is_mate(beta)
                && self.pos.has_non_pawn_material(self.pos.side_to_move())
            {
                let r = 3 + depth / 4;
                self.stack[ply].cont = None;
                self.pos.make_null_move();
                let score = -self.negamax(depth - 1 - r, -beta, -beta + 1, ply + 1);
                self.pos.unmake_null_move();
                if self.aborted {
                    return 0;
                }
                if score >= beta {
                    return if is_mate(score) { beta } else { score };
                }
            }
        }

        let us = self.pos.side_to_move();
        let cont = self.cont_context(ply);
        let mut picker = MovePicker::new(&self.pos, tt_move, self.td.history.killers(ply), cont);

        let mut best_score = -INF;
        let mut best_move = None;
        let mut played = 0usize;
        let mut quiets = [ScoredMove::EMPTY; MAX_TRIED];
        let mut quiet_count = 0;
        let mut captures = [ScoredMove::EMPTY; MAX_TRIED];
        let mut capture_count = 0;

        while let Some(sm) = picker.next(&self.pos, &self.td.history) {
            let mv = sm.mv;
            let quiet = sm.is_quiet();

            if !root && best_score > -MATE_BOUND {
                if quiet && depth <= LMP_MAX_DEPTH && played >= lmp_limit(depth, improving) {
                    picker.skip_quiets();
                    continue;
                }
                if quiet
                    && depth <= FUTILITY_MAX_DEPTH
                    && static_eval.is_some_and(|eval| {
                        eval + FUTILITY_BASE + FUTILITY_PER_DEPTH * depth <= alpha
                    })
                {
                    picker.skip_quiets();
                    continue;
                }
                let see_margin = if quiet { SEE_QUIET_MARGIN } else { SEE_NOISY_MARGIN };
                if depth <= SEE_PRUNE_MAX_DEPTH && !see_ge(&self.pos, mv, -see_margin * depth) {
                    continue;
                }
            }

            self.make(ply, &sm);
            played += 1;
            let gives_check = self.pos.in_check();
            let extend = ply < 2 * self.root_depth as usize
                && (gives_check || mv.promo() == Some(PieceKind::Queen));
            let new_depth = depth - 1 + extend as i32;

            let mut score;
            if played == 1 {
                score = -self.negamax(new_depth, -beta, -alpha, ply + 1);
            } else {
                let mut r = 0;
                if depth >= LMR_MIN_DEPTH && quiet && !in_check && !gives_check {
                    r = reduction(depth, played);
                    r += !improving as i32;
                    r -= pv_node as i32;
                    r -= sm.score / 8_192;
                    r = r.clamp(0, (new_depth - 1).max(0));
                }
                score = -self.negamax(new_depth - r, -alpha - 1, -alpha, ply + 1);
                if score > alpha && r > 0 {
                    score = -self.negamax(new_depth, -alpha - 1, -alpha, ply + 1);
                }
                if score > alpha && score < beta {
                    score = -self.negamax(new_depth, -beta, -alpha, ply + 1);
                }
            }
            self.unmake(mv);

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    best_move = Some(mv);
                    alpha = score;
                    if pv_node {
                        self.update_pv(ply, mv);
                    }
                    if alpha >= beta {
                        self.on_cutoff(depth, ply, us, &sm, &quiets[..quiet_count], &captures[..capture_count]);
                        break;
                    }
                }
            }

            if quiet && quiet_count < MAX_TRIED {
                quiets[quiet_count] = sm;
                quiet_count += 1;
            } else if sm.captured.is_some() && capture_count < MAX_TRIED {
                captures[capture_count] = sm;
                capture_count += 1;
            }
        }

        if played == 0 {
            return if in_check { mated_in(ply) } else { DRAW };
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_move.is_some() {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(key, best_move, best_score, static_eval, depth, bound, ply);
        best_score
    }

    fn on_cutoff(
        &mut self,
        depth: i32,
        ply: usize,
        us: Color,
        best: &ScoredMove,
        quiets: &[ScoredMove],
        captures: &[ScoredMove],
    ) {
        let bonus = stat_bonus(depth);
        let malus = stat_malus(depth);
        let cont = self.cont_context(ply);
        let history = &mut self.td.history;

        if best.is_quiet() {
            history.store_killer(ply, best.mv);
            history.update_quiet(us, best.mv, best.piece, &cont, bonus);
            for tried in quiets {
                history.update_quiet(us, tried.mv, tried.piece, &cont, -malus);
            }
        } else if let Some(kind) = best.captured {
            history.update_capture(best.piece, best.mv.to(), kind, bonus);
        }
        for tried in captures {
            if let Some(kind) = tried.captured {
                history.update_capture(tried.piece, tried.mv.to(), kind, -malus);
            }
        }
    }

    fn qsearch(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        if self.should_abort() {
            return 0;
        }
        self.seldepth = self.seldepth.max(ply);

        if self.pos.is_draw() {
            return DRAW;
        }
        let in_check = self.pos.in_check();
        if ply >= MAX_PLY {
            return if in_check { DRAW } else { self.td.eval.evaluate(&self.pos) };
        }

        let pv_node = beta - alpha > 1;
        let key = self.pos.hash();
        let tt_hit = self.tt.probe(key, ply);
        if !pv_node
            && let Some(hit) = tt_hit
            && hit.is_usable(-1, alpha, beta)
        {
            return hit.score;
        }

        let (static_eval, mut best_score) = if in_check {
            (None, -INF)
        } else {
            let eval = match tt_hit.and_then(|hit| hit.eval) {
                Some(eval) => eval,
                None => self.td.eval.evaluate(&self.pos),
            };
            if eval >= beta {
                return eval;
            }
            alpha = alpha.max(eval);
            (Some(eval), eval)
        };

        let mut picker = MovePicker::new_qsearch(&self.pos, tt_hit.and_then(|hit| hit.mv));
        let mut best_move = None;
        let mut played = 0usize;

        while let Some(sm) = picker.next(&self.pos, &self.td.history) {
            if let Some(eval) = static_eval {
                if sm.mv.promo().is_none()
                    && eval + sm.captured.map_or(0, see_value) + DELTA_MARGIN <= alpha
                {
                    continue;
                }
                if !see_ge(&self.pos, sm.mv, 0) {
                    continue;
                }
            }

            self.make(ply, &sm);
            played += 1;
            let score = -self.qsearch(-beta, -alpha, ply + 1);
            self.unmake(sm.mv);

            if self.aborted {
                return 0;
            }
            if score > best_score {
                best_score = score;
                if score > alpha {
                    best_move = Some(sm.mv);
                    alpha = score;
                    if alpha >= beta {
                        break;
                    }
                }
            }
        }

        if in_check && played == 0 {
            return mated_in(ply);
        }

        let bound = if best_score >= beta { Bound::Lower } else { Bound::Upper };
        self.tt.store(key, best_move, best_score, static_eval, -1, bound, ply);
        best_score
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
