//! Time control and search limits for chess engines.
//!
//! `SearchLimits` describes what a `go` command asked for. When a search
//! starts, the engine turns it into a [`TimeControl`], which owns the
//! deadlines and shares the stop flag with every [`StopHandle`] clone, so
//! another thread can cancel the search at any time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::types::Color;

/// Moves assumed to remain when the GUI does not send `movestogo`.
pub const DEFAULT_MOVES_TO_GO: u32 = 30;

/// How often to look at the wall clock, in nodes.
pub const CHECK_INTERVAL: u64 = 1024;

/// Cloneable cancellation flag for an in-flight search.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Remaining clock time as sent with `go wtime ... btime ...`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pub wtime: Duration,
    pub btime: Duration,
    pub winc: Duration,
    pub binc: Duration,
    pub movestogo: Option<u32>,
}

impl Clock {
    /// Soft and hard time budget for `side` after subtracting `overhead`.
    ///
    /// The soft budget is `remaining / movestogo + 3/4 increment`; the hard
    /// budget allows overrunning it three times but never more than a quarter
    /// of the remaining time. Both are at least one millisecond.
    pub fn budget(&self, side: Color, overhead: Duration) -> (Duration, Duration) {
        let (remaining, inc) = match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        let moves_to_go = self.movestogo.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
        let base = remaining / moves_to_go + inc * 3 / 4;
        let hard = (base * 3).min(remaining / 4);
        let soft = base.min(hard);

        let floor = Duration::from_millis(1);
        (
            soft.saturating_sub(overhead).max(floor),
            hard.saturating_sub(overhead).max(floor),
        )
    }
}

/// What a single `go` command asked for.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    /// Maximum iteration depth in plies (None = engine default).
    pub depth: Option<u8>,
    /// Fixed time for this move.
    pub move_time: Option<Duration>,
    /// Node budget shared by all search threads.
    pub nodes: Option<u64>,
    /// Tournament clock; only used when `move_time` is absent.
    pub clock: Option<Clock>,
    /// Search until stopped.
    pub infinite: bool,
    /// Cancels the search from outside.
    pub stop: StopHandle,
}

impl SearchLimits {
    /// Create limits with only depth constraint (no time limit).
    pub fn depth(depth: u8) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }

    /// Create limits with only time constraint (infinite depth).
    pub fn time(move_time: Duration) -> Self {
        Self {
            move_time: Some(move_time),
            ..Self::default()
        }
    }

    pub fn nodes(nodes: u64) -> Self {
        Self {
            nodes: Some(nodes),
            ..Self::default()
        }
    }

    pub fn clock(clock: Clock) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    pub fn infinite() -> Self {
        Self {
            infinite: true,
            ..Self::default()
        }
    }

    /// Handle that can cancel a search started with these limits.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// True when nothing but depth (or nothing at all) bounds the search.
    pub fn is_depth_only(&self) -> bool {
        self.move_time.is_none() && self.nodes.is_none() && self.clock.is_none() && !self.infinite
    }
}

/// Thread-safe time controller that tracks whether search should stop.
///
/// Cheap to clone; every clone shares the stop flag. `is_stopped()` is a
/// relaxed atomic load so it can be polled at every node.
#[derive(Debug, Clone)]
pub struct TimeControl {
    stop: StopHandle,
    start_time: Instant,
    /// Do not start another iteration after this.
    soft_limit: Option<Duration>,
    /// Abort the running iteration after this.
    hard_limit: Option<Duration>,
    node_limit: Option<u64>,
}

impl TimeControl {
    /// Starts the clock for a search of `side` under `limits`.
    pub fn start(limits: &SearchLimits, side: Color, move_overhead: Duration) -> Self {
        let (soft_limit, hard_limit) = if limits.infinite {
            (None, None)
        } else if let Some(move_time) = limits.move_time {
            let t = move_time
                .saturating_sub(move_overhead)
                .max(Duration::from_millis(1));
            (Some(t), Some(t))
        } else if let Some(clock) = limits.clock {
            let (soft, hard) = clock.budget(side, move_overhead);
            (Some(soft), Some(hard))
        } else {
            (None, None)
        };

        Self {
            stop: limits.stop.clone(),
            start_time: Instant::now(),
            soft_limit,
            hard_limit,
            node_limit: if limits.infinite { None } else { limits.nodes },
        }
    }

    /// Force stop the search immediately.
    pub fn stop(&self) {
        self.stop.stop();
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Per-node stop test. `nodes` is the node count across all threads;
    /// the wall clock is only read every [`CHECK_INTERVAL`] nodes.
    #[inline]
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.is_stopped() {
            return true;
        }
        if self.node_limit.is_some_and(|limit| nodes >= limit) {
            self.stop();
            return true;
        }
        if nodes.is_multiple_of(CHECK_INTERVAL) {
            return self.check_time();
        }
        false
    }

    /// Check time and update stopped flag if the hard limit expired.
    pub fn check_time(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        if let Some(limit) = self.hard_limit
            && self.start_time.elapsed() >= limit
        {
            self.stop();
            return true;
        }
        false
    }

    /// Whether the soft budget is spent, i.e. no new iteration should begin.
    pub fn soft_limit_reached(&self) -> bool {
        self.soft_limit
            .is_some_and(|limit| self.start_time.elapsed() >= limit)
    }

    /// Get elapsed time since search started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn soft_limit(&self) -> Option<Duration> {
        self.soft_limit
    }

    pub fn hard_limit(&self) -> Option<Duration> {
        self.hard_limit
    }
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
