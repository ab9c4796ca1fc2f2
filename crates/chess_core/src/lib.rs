pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod error;
pub mod fen;
pub mod movegen;
pub mod perft;
pub mod time_control;
pub mod types;
pub mod uci;
pub mod zobrist;

// Re-export core game logic (not engine-specific)
pub use bitboard::Bitboard;
pub use board::{Position, StateInfo};
pub use error::{FenError, MoveError, OptionError, SearchError, UciError};
pub use fen::STARTPOS_FEN;
pub use movegen::{
    GenType, MAX_MOVES, MoveList, generate, is_legal, is_pseudo_legal, legal_moves,
    legal_moves_into,
};
pub use perft::{perft, perft_divide};
pub use time_control::{Clock, SearchLimits, StopHandle, TimeControl};
pub use types::*;
pub use uci::{move_to_uci, parse_uci_move, set_position_from_uci};
pub use zobrist::ZOBRIST;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Engine trait: implemented by every searcher behind the UCI front end
// =============================================================================

/// Search score from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns.
    Cp(i32),
    /// Mate in N moves; negative when the side to move gets mated.
    Mate(i32),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "cp {cp}"),
            Score::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Result of a search operation
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The best move found (None only if the root has no legal moves)
    pub best_move: Option<Move>,
    /// Expected reply, taken from the principal variation
    pub ponder: Option<Move>,
    pub pv: Vec<Move>,
    pub score: Score,
    /// Last fully completed iteration
    pub depth: u8,
    pub seldepth: u8,
    /// Nodes searched by all threads
    pub nodes: u64,
    pub elapsed: Duration,
    /// Whether search was cut short by a stop or a limit
    pub stopped: bool,
}

/// Progress report for one completed iteration.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: u8,
    pub seldepth: u8,
    pub score: Score,
    pub nodes: u64,
    pub time: Duration,
    /// Transposition table fill, per mille
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

impl fmt::Display for SearchInfo {
    /// Formats as a UCI `info` line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.time.as_millis() as u64;
        let nps = self.nodes * 1000 / millis.max(1);
        write!(
            f,
            "info depth {} seldepth {} score {} nodes {} nps {} hashfull {} time {}",
            self.depth, self.seldepth, self.score, self.nodes, nps, self.hashfull, millis
        )?;
        if !self.pv.is_empty() {
            f.write_str(" pv")?;
            for mv in &self.pv {
                write!(f, " {mv}")?;
            }
        }
        Ok(())
    }
}

/// Receives an [`SearchInfo`] after every completed iteration.
pub type InfoSink = Arc<dyn Fn(&SearchInfo) + Send + Sync>;

/// Shape of a UCI option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    Spin { default: i64, min: i64, max: i64 },
    Check { default: bool },
    Button,
}

/// A UCI option an engine advertises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOption {
    pub name: &'static str,
    pub kind: OptionKind,
}

impl fmt::Display for EngineOption {
    /// Formats as the `option` line sent in reply to `uci`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option name {} type ", self.name)?;
        match &self.kind {
            OptionKind::Spin { default, min, max } => {
                write!(f, "spin default {default} min {min} max {max}")
            }
            OptionKind::Check { default } => write!(f, "check default {default}"),
            OptionKind::Button => f.write_str("button"),
        }
    }
}

/// Trait that all chess engines must implement.
pub trait Engine: Send {
    /// Search the position with the given search limits.
    ///
    /// Running out of time or being stopped is not an error: the result then
    /// carries the best move of the last completed iteration.
    fn search(&mut self, pos: &Position, limits: SearchLimits)
    -> Result<SearchResult, SearchError>;

    /// Returns the engine's name for UCI identification
    fn name(&self) -> &str;

    /// Returns the engine's author for UCI identification
    fn author(&self) -> &str;

    /// Reset internal state for a new game (clear hash tables, history, etc.)
    fn new_game(&mut self) {}

    /// Set a UCI option.
    fn set_option(&mut self, name: &str, _value: &str) -> Result<(), OptionError> {
        Err(OptionError::Unknown(name.to_string()))
    }

    /// Options to advertise in reply to `uci`.
    fn options(&self) -> Vec<EngineOption> {
        Vec::new()
    }

    /// Install a callback for per-iteration progress reports.
    fn set_info_sink(&mut self, _sink: InfoSink) {}
}
