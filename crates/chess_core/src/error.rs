//! Error types shared by the core crate and the engines built on it.

use thiserror::Error;

/// Why a FEN string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 4 to 6 space-separated fields, found {0}")]
    FieldCount(usize),
    #[error("expected 8 ranks in the board field, found {0}")]
    RankCount(usize),
    #[error("invalid piece character '{0}'")]
    PieceChar(char),
    #[error("rank {rank} describes {files} files")]
    RankLength { rank: u8, files: u32 },
    #[error("invalid side to move '{0}'")]
    SideToMove(String),
    #[error("invalid castling character '{0}'")]
    CastlingChar(char),
    #[error("castling right '{0}' without king and rook on their home squares")]
    CastlingRights(char),
    #[error("invalid en-passant square '{0}'")]
    EnPassant(String),
    #[error("invalid move counter '{0}'")]
    Counter(String),
    #[error("{color} has {count} kings")]
    KingCount { color: &'static str, count: u32 },
    #[error("pawn on back rank square {0}")]
    PawnOnBackRank(String),
    #[error("side not to move is in check")]
    OpponentInCheck,
}

/// Why a UCI move string could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("malformed move '{0}'")]
    Malformed(String),
    #[error("illegal move '{0}'")]
    Illegal(String),
}

/// Errors from a UCI `position` command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UciError {
    #[error("expected 'startpos' or 'fen', found '{0}'")]
    UnknownPositionKind(String),
    #[error("missing position arguments")]
    MissingPosition,
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    Move(#[from] MoveError),
}

/// Errors from `Engine::set_option`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option '{0}'")]
    Unknown(String),
    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
    #[error("option '{name}' must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Invariant violations that abort a single search call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no {0} king on the board")]
    MissingKing(&'static str),
    #[error("search worker panicked")]
    WorkerPanicked,
    #[error("could not start search thread: {0}")]
    ThreadSpawn(String),
}
