//! Termination conditions for enumeration runs.
//!
//! Terminations are evaluated between iterations only: once an oracle call
//! has started it always completes.

mod composite;
mod external;
mod solution_count;
mod time;

use std::fmt::Debug;

use crate::scope::EnumerationScope;

pub use composite::{AndTermination, OrTermination};
pub use external::ExternalTermination;
pub use solution_count::SolutionCountTermination;
pub use time::TimeTermination;

/// Trait for determining when to stop enumerating.
pub trait Termination: Send + Debug {
    /// Returns true if the run should stop before the next solve.
    fn is_terminated(&self, scope: &EnumerationScope) -> bool;
}

/// Marker type indicating no termination.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTermination;

impl Termination for NoTermination {
    fn is_terminated(&self, _scope: &EnumerationScope) -> bool {
        false
    }
}

impl<T: Termination> Termination for Option<T> {
    fn is_terminated(&self, scope: &EnumerationScope) -> bool {
        match self {
            Some(t) => t.is_terminated(scope),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests;
