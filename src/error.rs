//! Error types for grammar parsing and blueprint loading.
//!
//! None of these reach the growth pipeline: a rejected grammar line is skipped
//! and logged by the loader, and growth itself never fails.

use thiserror::Error;

/// Why a single `predecessor=successor[,probability]` line was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    #[error("missing '=' between predecessor and successor")]
    MissingSeparator,

    #[error("empty predecessor")]
    EmptyPredecessor,

    #[error("empty successor")]
    EmptySuccessor,

    #[error("invalid symbol {symbol:?} in {part}")]
    InvalidSymbol { symbol: char, part: &'static str },

    #[error("invalid probability {0:?}")]
    InvalidProbability(String),
}

/// Failure while populating a [`PlantBlueprint`](crate::PlantBlueprint).
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("failed to read grammar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("no blueprint named {0:?}")]
    UnknownPreset(String),
}
