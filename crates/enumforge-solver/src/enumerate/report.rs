//! Outcome of an enumeration run.

use std::fmt;

use crate::error::{EnumerationError, EnumerationResult};
use crate::statistics::EnumerationStatistics;

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumerationStatus {
    /// The oracle reported infeasibility, or the last solution fixed every
    /// variable. All solutions were reported.
    Done,
    /// The run stopped on an error. Solutions reported before it stand.
    Failed(EnumerationError),
    /// A termination condition or an early-termination request stopped the
    /// run between two solves.
    Terminated,
}

impl fmt::Display for EnumerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumerationStatus::Done => write!(f, "done"),
            EnumerationStatus::Failed(e) => write!(f, "failed: {}", e),
            EnumerationStatus::Terminated => write!(f, "terminated"),
        }
    }
}

/// Terminal status plus counters.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationReport {
    pub status: EnumerationStatus,
    pub statistics: EnumerationStatistics,
}

impl EnumerationReport {
    pub fn solution_count(&self) -> u64 {
        self.statistics.solution_count
    }

    pub fn is_done(&self) -> bool {
        self.status == EnumerationStatus::Done
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, EnumerationStatus::Failed(_))
    }

    pub fn is_terminated(&self) -> bool {
        self.status == EnumerationStatus::Terminated
    }

    pub fn error(&self) -> Option<&EnumerationError> {
        match &self.status {
            EnumerationStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Converts a failed run into its error.
    pub fn into_result(self) -> EnumerationResult<EnumerationStatistics> {
        match self.status {
            EnumerationStatus::Failed(e) => Err(e),
            _ => Ok(self.statistics),
        }
    }
}
