//! Composite termination conditions (AND/OR) over tuples.

use super::Termination;
use crate::scope::EnumerationScope;

/// Terminates when ANY child terminates.
///
/// # Example
///
/// ```
/// use enumforge_solver::termination::{OrTermination, SolutionCountTermination, TimeTermination};
///
/// // Stop after 30 seconds or 1000 solutions
/// let termination = OrTermination::new((
///     TimeTermination::seconds(30),
///     SolutionCountTermination::new(1000),
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct OrTermination<T>(pub T);

impl<T> OrTermination<T> {
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

/// Terminates when ALL children terminate.
#[derive(Debug, Clone)]
pub struct AndTermination<T>(pub T);

impl<T> AndTermination<T> {
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

macro_rules! impl_composite_termination {
    ($($idx:tt: $T:ident),+) => {
        impl<$($T: Termination),+> Termination for OrTermination<($($T,)+)> {
            fn is_terminated(&self, scope: &EnumerationScope) -> bool {
                $((self.0).$idx.is_terminated(scope))||+
            }
        }

        impl<$($T: Termination),+> Termination for AndTermination<($($T,)+)> {
            fn is_terminated(&self, scope: &EnumerationScope) -> bool {
                $((self.0).$idx.is_terminated(scope))&&+
            }
        }
    };
}

impl_composite_termination!(0: T0);
impl_composite_termination!(0: T0, 1: T1);
impl_composite_termination!(0: T0, 1: T1, 2: T2);
impl_composite_termination!(0: T0, 1: T1, 2: T2, 3: T3);
