//! Errors that end an enumeration run.

use thiserror::Error;

use enumforge_core::{ModelError, Violation};

/// Why an enumeration run failed.
///
/// Solutions reported before the failure remain valid; the model keeps every
/// cut appended up to that point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnumerationError {
    /// The oracle failed for a reason unrelated to feasibility.
    ///
    /// The reason is carried verbatim from [`SolveResult::Error`](crate::SolveResult::Error).
    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The oracle returned an assignment the model rejects.
    #[error("Oracle returned an invalid assignment on solve #{solve}: {violation}")]
    AssignmentViolation { solve: u64, violation: Violation },
}

impl EnumerationError {
    /// The oracle's own failure reason, if this is an oracle error.
    pub fn oracle_reason(&self) -> Option<&str> {
        match self {
            EnumerationError::Oracle(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result type alias for enumeration operations.
pub type EnumerationResult<T> = Result<T, EnumerationError>;
