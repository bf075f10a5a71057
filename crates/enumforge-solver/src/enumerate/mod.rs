//! The enumeration driver.
//!
//! An [`Enumerator`] repeatedly asks its oracle for a solution, hands the
//! solution to a consumer, and appends the no-good cut that excludes it, until
//! the oracle reports infeasibility. Each run is an explicit state machine:
//!
//! ```text
//! Solving --Optimal--> Recording --cut--> Cutting --> Solving
//!    |                     |
//!    |                     +--no free variables--> Done
//!    +--Infeasible--> Done
//!    +--Error-------> Failed
//!    +--termination-> Terminated
//! ```
//!
//! The model is borrowed mutably for the whole run, so no other solve can
//! interleave with it. Cuts stay in the model when the run ends.

mod report;
mod solutions;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use enumforge_config::EnumeratorConfig;
use enumforge_core::{Assignment, Model, VariableKey};

use crate::oracle::{AnyOracle, Oracle};
use crate::termination::{
    NoTermination, OrTermination, SolutionCountTermination, Termination, TimeTermination,
};

pub use report::{EnumerationReport, EnumerationStatus};
pub use solutions::{EnumerationState, Solutions};

/// Termination built from an [`EnumeratorConfig`].
pub type ConfiguredTermination =
    OrTermination<(Option<SolutionCountTermination>, Option<TimeTermination>)>;

/// Drives no-good enumeration with oracle `O` and termination `T`.
///
/// # Example
///
/// ```
/// use enumforge_core::{Comparison, LinearExpr, Model};
/// use enumforge_solver::{BacktrackingOracle, Enumerator};
///
/// let mut model = Model::new("pick-one");
/// let vars: Vec<_> = (0..3).map(|i| model.add_variable(i, None).unwrap()).collect();
/// model.add_constraint(LinearExpr::sum(vars), Comparison::Eq, 1.0).unwrap();
///
/// let mut enumerator = Enumerator::new(BacktrackingOracle::new());
/// let mut found = Vec::new();
/// let report = enumerator.enumerate(&mut model, |a| found.push(a.clone()));
///
/// assert!(report.is_done());
/// assert_eq!(found.len(), 3);
/// assert_eq!(model.cuts().len(), 3);
/// ```
#[derive(Debug)]
pub struct Enumerator<O, T = NoTermination> {
    oracle: O,
    termination: T,
    verify_assignments: bool,
    terminate_early_flag: Arc<AtomicBool>,
}

impl<O: Oracle> Enumerator<O, NoTermination> {
    /// Creates an enumerator that runs until the oracle reports infeasibility.
    pub fn new(oracle: O) -> Self {
        Enumerator {
            oracle,
            termination: NoTermination,
            verify_assignments: false,
            terminate_early_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the termination condition.
    pub fn with_termination<T: Termination>(self, termination: T) -> Enumerator<O, Option<T>> {
        Enumerator {
            oracle: self.oracle,
            termination: Some(termination),
            verify_assignments: self.verify_assignments,
            terminate_early_flag: self.terminate_early_flag,
        }
    }
}

impl Enumerator<AnyOracle, ConfiguredTermination> {
    /// Builds the oracle, termination and assertion mode described by `config`.
    pub fn from_config(config: &EnumeratorConfig) -> Self {
        let termination = OrTermination::new((
            config.solution_limit().map(SolutionCountTermination::new),
            config.time_limit().map(TimeTermination::new),
        ));
        Enumerator {
            oracle: AnyOracle::from_config(config),
            termination,
            verify_assignments: config.verifies_assignments(),
            terminate_early_flag: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<O: Oracle, T: Termination> Enumerator<O, T> {
    /// Checks every returned assignment against all constraints and cuts.
    ///
    /// An assignment that fails the check ends the run with
    /// [`EnumerationError::AssignmentViolation`](crate::EnumerationError::AssignmentViolation).
    /// The length of each assignment is always checked.
    pub fn with_assignment_verification(mut self, enabled: bool) -> Self {
        self.verify_assignments = enabled;
        self
    }

    pub fn verifies_assignments(&self) -> bool {
        self.verify_assignments
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn termination(&self) -> &T {
        &self.termination
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Requests that the current (or next) run stop before its next solve.
    ///
    /// The request is cleared when that run ends.
    pub fn terminate_early(&self) {
        self.terminate_early_flag.store(true, Ordering::SeqCst);
    }

    /// Returns a handle that can request early termination from elsewhere,
    /// including from inside a consumer or another thread.
    pub fn terminate_handle(&self) -> TerminateHandle {
        TerminateHandle {
            flag: Arc::clone(&self.terminate_early_flag),
        }
    }

    /// Starts a run and returns its solutions as an iterator.
    ///
    /// The run advances only while the iterator is polled.
    pub fn solutions<'a, K: VariableKey>(
        &'a mut self,
        model: &'a mut Model<K>,
    ) -> Solutions<'a, K, O, T> {
        Solutions::new(
            &mut self.oracle,
            &self.termination,
            self.verify_assignments,
            Arc::clone(&self.terminate_early_flag),
            model,
        )
    }

    /// Runs to completion, passing each solution to `consumer` in discovery
    /// order.
    pub fn enumerate<K, F>(&mut self, model: &mut Model<K>, mut consumer: F) -> EnumerationReport
    where
        K: VariableKey,
        F: FnMut(&Assignment),
    {
        let mut solutions = self.solutions(model);
        for assignment in solutions.by_ref() {
            consumer(&assignment);
        }
        solutions.into_report()
    }

    /// Runs to completion, streaming each solution through `sender`.
    ///
    /// A closed receiver does not stop the run.
    pub fn enumerate_with_channel<K: VariableKey>(
        &mut self,
        model: &mut Model<K>,
        sender: mpsc::UnboundedSender<Assignment>,
    ) -> EnumerationReport {
        let mut solutions = self.solutions(model);
        for assignment in solutions.by_ref() {
            let _ = sender.send(assignment);
        }
        solutions.into_report()
    }

    /// Runs to completion and collects every solution.
    pub fn collect_solutions<K: VariableKey>(
        &mut self,
        model: &mut Model<K>,
    ) -> (Vec<Assignment>, EnumerationReport) {
        let mut solutions = self.solutions(model);
        let found: Vec<Assignment> = solutions.by_ref().collect();
        (found, solutions.into_report())
    }
}

/// Cloneable handle for requesting early termination.
#[derive(Debug, Clone)]
pub struct TerminateHandle {
    flag: Arc<AtomicBool>,
}

impl TerminateHandle {
    pub fn terminate_early(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_terminate_early_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
