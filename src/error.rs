//! Error types shared by the engine and the solver adapters.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Which engine query a solver failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Legal-action discovery at `t=0`.
    AvailableActions,
    /// One-step transition at `t=1`.
    Transition,
    /// Bounded-horizon optimization.
    OptimalReturn,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::AvailableActions => write!(f, "available-actions"),
            QueryKind::Transition => write!(f, "transition"),
            QueryKind::OptimalReturn => write!(f, "optimal-return"),
        }
    }
}

/// Everything that can go wrong while driving an MDP.
///
/// Nothing is retried internally. Callers can tell an illegal action
/// (`IllegalAction`, `ModelNotFound`) apart from a misconfigured program or
/// solver (`MissingProgramFile`, `MalformedAtom`, `AmbiguousModel`, `Solver`).
#[derive(Debug, Error)]
pub enum MdpError {
    #[error("solver produced no model for the {query} query")]
    ModelNotFound { query: QueryKind },

    #[error("solver produced {count} models for the {query} query, expected exactly one")]
    AmbiguousModel { query: QueryKind, count: usize },

    #[error("malformed atom `{atom}`: {reason}")]
    MalformedAtom { atom: String, reason: String },

    #[error("program file not found: {}", path.display())]
    MissingProgramFile { path: PathBuf },

    #[error("solver search interrupted after {budget:?}")]
    SolverTimeout { budget: Duration },

    #[error("action `{action}` is not executable in the current state")]
    IllegalAction { action: String },

    #[error("discount rate {0} is outside [0, 1]")]
    InvalidDiscountRate(f64),

    #[error("time limit {0} is not a valid number of seconds")]
    InvalidTimeLimit(f64),

    #[error("solver error: {0}")]
    Solver(String),

    #[error("corrupt trajectory snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MdpError {
    /// Shorthand for a `MalformedAtom` error.
    pub fn malformed(atom: impl fmt::Display, reason: impl Into<String>) -> Self {
        MdpError::MalformedAtom {
            atom: atom.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MdpError>;
