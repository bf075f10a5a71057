//! Solution-count termination.

use super::Termination;
use crate::scope::EnumerationScope;

/// Terminates once `limit` solutions have been reported.
///
/// # Example
///
/// ```
/// use enumforge_solver::termination::SolutionCountTermination;
///
/// let term = SolutionCountTermination::new(10);
/// assert_eq!(term.limit(), 10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SolutionCountTermination {
    limit: u64,
}

impl SolutionCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl Termination for SolutionCountTermination {
    fn is_terminated(&self, scope: &EnumerationScope) -> bool {
        scope.solution_count() >= self.limit
    }
}
