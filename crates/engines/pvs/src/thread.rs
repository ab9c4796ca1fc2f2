//! Lazy SMP: one OS thread per worker, all sharing the transposition table.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use chess_core::{InfoSink, Position, Score, SearchError, SearchResult, TimeControl, legal_moves};
use tracing::{debug, warn};

use crate::eval::Evaluator;
use crate::history::History;
use crate::score::{DRAW, mated_in, to_uci};
use crate::search::{Iteration, SharedState, Worker, WorkerReport};
use crate::tt::TranspositionTable;

/// Deep recursion plus a move buffer per ply needs more than the default.
const STACK_SIZE: usize = 64 * 1024 * 1024;

/// State a worker keeps between searches.
pub struct ThreadData<E> {
    pub(crate) id: usize,
    pub(crate) history: History,
    pub(crate) eval: E,
}

impl<E: Evaluator> ThreadData<E> {
    pub fn new(id: usize, eval: E) -> Self {
        Self {
            id,
            history: History::new(),
            eval,
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// What one `go` asks of the workers.
pub(crate) struct SearchJob<'a> {
    pub pos: &'a Position,
    pub tt: &'a TranspositionTable,
    pub tc: &'a TimeControl,
    pub max_depth: i32,
    /// Keep the main worker alive until stopped from outside.
    pub infinite: bool,
    pub info: Option<&'a InfoSink>,
}

/// Runs every worker on `job` and merges their results.
pub(crate) fn search<E: Evaluator>(
    threads: &mut [ThreadData<E>],
    job: SearchJob<'_>,
) -> Result<SearchResult, SearchError> {
    let moves = legal_moves(job.pos);
    let Some(&fallback) = moves.first() else {
        let score = if job.pos.in_check() { mated_in(0) } else { DRAW };
        return Ok(SearchResult {
            best_move: None,
            ponder: None,
            pv: Vec::new(),
            score: to_uci(score),
            depth: 0,
            seldepth: 0,
            nodes: 0,
            elapsed: job.tc.elapsed(),
            stopped: false,
        });
    };

    let shared = SharedState::default();
    let reports = spawn_workers(threads, &job, &shared)?;
    let nodes = shared.nodes.load(Ordering::Relaxed);

    let main_aborted = reports.first().is_some_and(|r| r.aborted);
    let Some((report, best)) = pick_result(&reports) else {
        warn!("no iteration completed, playing the first legal move");
        return Ok(SearchResult {
            best_move: Some(fallback),
            ponder: None,
            pv: vec![fallback],
            score: Score::Cp(0),
            depth: 0,
            seldepth: 0,
            nodes,
            elapsed: job.tc.elapsed(),
            stopped: true,
        });
    };
    debug!(worker = report.id, depth = best.depth, "result selected");

    let pv = if best.pv.is_empty() { vec![fallback] } else { best.pv.clone() };
    Ok(SearchResult {
        best_move: pv.first().copied(),
        ponder: pv.get(1).copied(),
        score: to_uci(best.score),
        depth: best.depth as u8,
        seldepth: best.seldepth as u8,
        nodes,
        elapsed: job.tc.elapsed(),
        stopped: main_aborted,
        pv,
    })
}

fn spawn_workers<E: Evaluator>(
    threads: &mut [ThreadData<E>],
    job: &SearchJob<'_>,
    shared: &SharedState,
) -> Result<Vec<WorkerReport>, SearchError> {
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(threads.len());
        let mut spawn_error = None;

        for td in threads.iter_mut() {
            let id = td.id;
            let worker = Worker::new(job.pos, td, job.tt, job.tc, shared);
            let info = if id == 0 { job.info } else { None };
            let (max_depth, infinite, tc) = (job.max_depth, job.infinite, job.tc);

            let spawned = thread::Builder::new()
                .name(format!("search-{id}"))
                .stack_size(STACK_SIZE)
                .spawn_scoped(s, move || {
                    let report = worker.run(max_depth, info);
                    if id == 0 {
                        while infinite && !tc.is_stopped() {
                            thread::sleep(Duration::from_millis(1));
                        }
                        shared.done.store(true, Ordering::Relaxed);
                    }
                    report
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        if spawn_error.is_some() {
            shared.done.store(true, Ordering::Relaxed);
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut panicked = false;
        for handle in handles {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => {
                    panicked = true;
                    shared.done.store(true, Ordering::Relaxed);
                }
            }
        }

        if let Some(err) = spawn_error {
            return Err(SearchError::ThreadSpawn(err.to_string()));
        }
        if panicked {
            return Err(SearchError::WorkerPanicked);
        }
        Ok(reports)
    })
}

/// Deepest completed iteration wins, then the higher score, then the
/// busier worker. Reports come in worker order, so the main worker keeps
/// exact ties.
fn pick_result(reports: &[WorkerReport]) -> Option<(&WorkerReport, &Iteration)> {
    reports
        .iter()
        .filter_map(|r| r.completed.as_ref().map(|it| (r, it)))
        .fold(None, |best, (r, it)| match best {
            Some((br, bi)) if (it.depth, it.score, r.nodes) <= (bi.depth, bi.score, br.nodes) => {
                Some((br, bi))
            }
            _ => Some((r, it)),
        })
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod thread_tests;
