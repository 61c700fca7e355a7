//! Crate-wide error type.
//!
//! Per spec.md §7, every error here is recovered at the UCI dispatch
//! layer: the move generator, evaluator, and position never raise across
//! their public contracts, and nothing in this enum is fatal to the
//! process.

use std::fmt;

use crate::board::{FenError, MoveParseError};

#[derive(Debug, Clone)]
pub enum EngineError {
    /// `position fen ...` named a malformed FEN; the previous position is
    /// kept.
    InvalidFen(FenError),
    /// A move in `position ... moves ...` did not parse or was illegal;
    /// the move list stops there and the position is kept at the last
    /// valid state.
    InvalidMove { move_str: String, source: MoveParseError },
    /// An unrecognised UCI verb, or a recognised verb missing required
    /// tokens.
    MalformedCommand(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            EngineError::InvalidMove { move_str, source } => {
                write!(f, "invalid move '{move_str}': {source}")
            }
            EngineError::MalformedCommand(cmd) => write!(f, "malformed command: {cmd}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        EngineError::InvalidFen(e)
    }
}
