//! PVS Chess Engine
//!
//! Iterative deepening principal variation search with aspiration windows,
//! a shared lockless transposition table and Lazy SMP helpers. Evaluation
//! sits behind the [`Evaluator`] trait; the default is a tapered
//! piece-square evaluator.

pub mod config;
pub mod eval;
pub mod history;
pub mod movepicker;
pub mod score;
mod search;
pub mod see;
mod thread;
pub mod tt;

use std::time::Duration;

use chess_core::{
    Color, Engine, EngineOption, InfoSink, OptionError, OptionKind, Position, SearchError,
    SearchLimits, SearchResult, TimeControl,
};
use tracing::{debug, error, info, warn};

pub use config::{ConfigError, EngineConfig};
pub use eval::{Evaluator, PstEvaluator, evaluate};
pub use tt::{Bound, TranspositionTable};

use config::{HASH_MAX_MB, HASH_MIN_MB, MOVE_OVERHEAD_MAX_MS, THREADS_MAX, THREADS_MIN};
use score::MAX_DEPTH;
use thread::{SearchJob, ThreadData};

/// Principal variation search engine.
///
/// This engine uses:
/// - Aspiration windows around the previous iteration's score
/// - A bucketed transposition table shared by all search threads
/// - Staged move ordering with killer, history and continuation tables
/// - Null move, futility, late move and SEE pruning plus late move reductions
pub struct PvsEngine<E: Evaluator = PstEvaluator> {
    config: EngineConfig,
    tt: TranspositionTable,
    threads: Vec<ThreadData<E>>,
    /// Cloned into every new search thread.
    evaluator: E,
    info_sink: Option<InfoSink>,
}

impl PvsEngine<PstEvaluator> {
    pub fn new() -> Self {
        Self::build(EngineConfig::default(), TranspositionTable::default(), PstEvaluator::new())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_evaluator(config, PstEvaluator::new())
    }
}

impl Default for PvsEngine<PstEvaluator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> PvsEngine<E> {
    pub fn with_evaluator(config: EngineConfig, evaluator: E) -> Result<Self, ConfigError> {
        config.validate()?;
        let tt = TranspositionTable::new(config.hash_mb)?;
        Ok(Self::build(config, tt, evaluator))
    }

    fn build(config: EngineConfig, tt: TranspositionTable, evaluator: E) -> Self {
        let mut engine = Self {
            tt,
            threads: Vec::new(),
            evaluator,
            info_sink: None,
            config,
        };
        engine.sync_threads();
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn sync_threads(&mut self) {
        self.threads.truncate(self.config.threads);
        while self.threads.len() < self.config.threads {
            let id = self.threads.len();
            self.threads.push(ThreadData::new(id, self.evaluator.clone()));
        }
    }

    fn apply_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "clear hash" => {
                self.tt.clear();
                Ok(())
            }
            "hash" => {
                let (raw, mut candidate) = self.candidate(name, value)?;
                candidate.hash_mb = usize::try_from(raw).unwrap_or(usize::MAX);
                validate_option(&candidate, name, raw)?;
                self.tt
                    .resize(candidate.hash_mb)
                    .map_err(|err| range_error(name, raw, err))?;
                self.config = candidate;
                Ok(())
            }
            "threads" => {
                let (raw, mut candidate) = self.candidate(name, value)?;
                candidate.threads = usize::try_from(raw).unwrap_or(usize::MAX);
                validate_option(&candidate, name, raw)?;
                self.config = candidate;
                self.sync_threads();
                Ok(())
            }
            "move overhead" => {
                let (raw, mut candidate) = self.candidate(name, value)?;
                candidate.move_overhead_ms = u64::try_from(raw).unwrap_or(u64::MAX);
                validate_option(&candidate, name, raw)?;
                self.config = candidate;
                Ok(())
            }
            _ => Err(OptionError::Unknown(name.to_string())),
        }
    }

    fn candidate(&self, name: &str, value: &str) -> Result<(i64, EngineConfig), OptionError> {
        let raw = value
            .trim()
            .parse::<i64>()
            .map_err(|_| OptionError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
        Ok((raw, self.config.clone()))
    }
}

fn validate_option(candidate: &EngineConfig, name: &str, raw: i64) -> Result<(), OptionError> {
    candidate.validate().map_err(|err| range_error(name, raw, err))
}

fn range_error(name: &str, raw: i64, err: ConfigError) -> OptionError {
    match err {
        ConfigError::OutOfRange { min, max, .. } => OptionError::OutOfRange {
            name: name.to_string(),
            value: raw,
            min,
            max,
        },
        _ => OptionError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        },
    }
}

impl<E: Evaluator> Engine for PvsEngine<E> {
    fn search(&mut self, pos: &Position, limits: SearchLimits) -> Result<SearchResult, SearchError> {
        for (color, side) in [(Color::White, "white"), (Color::Black, "black")] {
            if pos.king_sq(color).is_none() {
                error!(side, "search aborted: king missing");
                return Err(SearchError::MissingKing(side));
            }
        }

        let overhead = Duration::from_millis(self.config.move_overhead_ms);
        let tc = TimeControl::start(&limits, pos.side_to_move(), overhead);
        let max_depth = match limits.depth {
            Some(depth) => (depth as i32).clamp(1, MAX_DEPTH),
            None if limits.is_depth_only() => self.config.default_depth as i32,
            None => MAX_DEPTH,
        };
        self.tt.new_search();
        info!(
            fen = %pos.to_fen(),
            threads = self.threads.len(),
            hash_mb = self.tt.size_mb(),
            max_depth,
            "search started"
        );

        let result = thread::search(
            &mut self.threads,
            SearchJob {
                pos,
                tt: &self.tt,
                tc: &tc,
                max_depth,
                infinite: limits.infinite,
                info: self.info_sink.as_ref(),
            },
        );
        match &result {
            Ok(res) => info!(
                best = ?res.best_move,
                score = %res.score,
                depth = res.depth,
                nodes = res.nodes,
                elapsed_ms = res.elapsed.as_millis() as u64,
                "search finished"
            ),
            Err(err) => error!(%err, "search aborted"),
        }
        result
    }

    fn name(&self) -> &str {
        "PVS v1.0"
    }

    fn author(&self) -> &str {
        "ML-chess"
    }

    fn new_game(&mut self) {
        self.tt.clear();
        for td in &mut self.threads {
            td.clear();
        }
        debug!("hash and history cleared");
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        let result = self.apply_option(name, value);
        match &result {
            Ok(()) => debug!(name, value, "option set"),
            Err(err) => warn!(%err, "option rejected"),
        }
        result
    }

    fn options(&self) -> Vec<EngineOption> {
        vec![
            EngineOption {
                name: "Hash",
                kind: OptionKind::Spin {
                    default: self.config.hash_mb as i64,
                    min: HASH_MIN_MB as i64,
                    max: HASH_MAX_MB as i64,
                },
            },
            EngineOption {
                name: "Threads",
                kind: OptionKind::Spin {
                    default: self.config.threads as i64,
                    min: THREADS_MIN as i64,
                    max: THREADS_MAX as i64,
                },
            },
            EngineOption {
                name: "Move Overhead",
                kind: OptionKind::Spin {
                    default: self.config.move_overhead_ms as i64,
                    min: 0,
                    max: MOVE_OVERHEAD_MAX_MS as i64,
                },
            },
            EngineOption {
                name: "Clear Hash",
                kind: OptionKind::Button,
            },
        ]
    }

    fn set_info_sink(&mut self, sink: InfoSink) {
        self.info_sink = Some(sink);
    }
}
