//! The run state machine.

use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use enumforge_core::{Assignment, Model, NoGoodCut, VariableKey, Violation};

use super::report::{EnumerationReport, EnumerationStatus};
use crate::error::{EnumerationError, EnumerationResult};
use crate::oracle::{Oracle, SolveResult};
use crate::scope::EnumerationScope;
use crate::statistics::EnumerationStatistics;
use crate::termination::Termination;

/// Observable state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationState {
    /// The next poll calls the oracle.
    Solving,
    /// A solution is about to be handed out.
    Recording,
    /// The cut excluding the last solution is about to be appended.
    Cutting,
    Done,
    Failed,
    Terminated,
}

impl EnumerationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EnumerationState::Done | EnumerationState::Failed | EnumerationState::Terminated
        )
    }
}

enum Step {
    Solving,
    Recording(Assignment),
    Cutting(NoGoodCut),
    Finished(EnumerationStatus),
}

/// Iterator over the solutions of one run.
///
/// Created by [`Enumerator::solutions`](super::Enumerator::solutions). Each
/// call to `next` advances the state machine until a solution is recorded or
/// the run ends.
pub struct Solutions<'a, K, O, T>
where
    K: VariableKey,
    O: Oracle,
    T: Termination,
{
    oracle: &'a mut O,
    termination: &'a T,
    verify_assignments: bool,
    terminate_early_flag: Arc<AtomicBool>,
    model: &'a mut Model<K>,
    scope: EnumerationScope,
    step: Step,
}

impl<'a, K, O, T> Solutions<'a, K, O, T>
where
    K: VariableKey,
    O: Oracle,
    T: Termination,
{
    pub(super) fn new(
        oracle: &'a mut O,
        termination: &'a T,
        verify_assignments: bool,
        terminate_early_flag: Arc<AtomicBool>,
        model: &'a mut Model<K>,
    ) -> Self {
        let mut scope =
            EnumerationScope::new().with_terminate_early_flag(Arc::clone(&terminate_early_flag));
        scope.start_enumeration();

        info!(
            event = "enumeration_start",
            model = model.name(),
            oracle = oracle.oracle_name(),
            variables = model.variable_count(),
            free_variables = model.free_variable_count(),
            constraints = model.constraint_count(),
        );

        Self {
            oracle,
            termination,
            verify_assignments,
            terminate_early_flag,
            model,
            scope,
            step: Step::Solving,
        }
    }

    pub fn state(&self) -> EnumerationState {
        match &self.step {
            Step::Solving => EnumerationState::Solving,
            Step::Recording(_) => EnumerationState::Recording,
            Step::Cutting(_) => EnumerationState::Cutting,
            Step::Finished(EnumerationStatus::Done) => EnumerationState::Done,
            Step::Finished(EnumerationStatus::Failed(_)) => EnumerationState::Failed,
            Step::Finished(EnumerationStatus::Terminated) => EnumerationState::Terminated,
        }
    }

    /// The terminal status, once the run has ended.
    pub fn status(&self) -> Option<&EnumerationStatus> {
        match &self.step {
            Step::Finished(status) => Some(status),
            _ => None,
        }
    }

    pub fn scope(&self) -> &EnumerationScope {
        &self.scope
    }

    pub fn statistics(&self) -> EnumerationStatistics {
        self.scope.statistics()
    }

    /// The model, with every cut appended so far.
    pub fn model(&self) -> &Model<K> {
        &*self.model
    }

    /// Ends the run and returns its report.
    ///
    /// A run abandoned before reaching a terminal state is reported as
    /// [`EnumerationStatus::Terminated`]. The cut excluding the last handed-out solution is appended first, so
    /// the model never re-admits a reported solution.
    pub fn into_report(mut self) -> EnumerationReport {
        self.append_pending_cut();
        if !matches!(self.step, Step::Finished(_)) {
            self.step = self.finish(EnumerationStatus::Terminated);
        }
        let status = match &self.step {
            Step::Finished(status) => status.clone(),
            _ => EnumerationStatus::Terminated,
        };
        EnumerationReport {
            status,
            statistics: self.scope.statistics(),
        }
    }

    fn append_pending_cut(&mut self) {
        if let Step::Cutting(_) = self.step {
            if let Step::Cutting(cut) = std::mem::replace(&mut self.step, Step::Solving) {
                self.step = self.cut(cut);
            }
        }
    }

    fn solve(&mut self) -> Step {
        if self.scope.is_terminate_early() || self.termination.is_terminated(&self.scope) {
            return self.finish(EnumerationStatus::Terminated);
        }

        let start = Instant::now();
        let result = self.oracle.solve(&*self.model);
        let duration = start.elapsed();
        self.scope.record_solve(duration);

        debug!(
            event = "solve",
            solve = self.scope.solve_count(),
            status = result.status_name(),
            duration_ms = duration.as_millis() as u64,
        );

        match result {
            SolveResult::Optimal(assignment) => match self.check(&assignment) {
                Ok(()) => Step::Recording(assignment),
                Err(e) => self.finish(EnumerationStatus::Failed(e)),
            },
            SolveResult::Infeasible => self.finish(EnumerationStatus::Done),
            SolveResult::Error(reason) => {
                warn!(event = "oracle_error", reason = %reason);
                self.finish(EnumerationStatus::Failed(EnumerationError::Oracle(reason)))
            }
        }
    }

    fn check(&self, assignment: &Assignment) -> EnumerationResult<()> {
        let violation = if self.verify_assignments {
            self.model.first_violation(assignment)
        } else if assignment.len() != self.model.variable_count() {
            Some(Violation::Length {
                expected: self.model.variable_count(),
                actual: assignment.len(),
            })
        } else {
            None
        };
        match violation {
            Some(violation) => {
                warn!(event = "invalid_assignment", violation = %violation);
                Err(EnumerationError::AssignmentViolation {
                    solve: self.scope.solve_count(),
                    violation,
                })
            }
            None => Ok(()),
        }
    }

    fn record(&mut self, assignment: &Assignment) -> Step {
        self.scope.record_solution();
        info!(
            event = "solution_found",
            solution = self.scope.solution_count(),
            objective = assignment.objective(),
        );

        match NoGoodCut::derive(&*self.model, assignment) {
            Ok(cut) => Step::Cutting(cut),
            Err(degenerate) => {
                debug!(event = "degenerate_cut", reason = %degenerate);
                self.finish(EnumerationStatus::Done)
            }
        }
    }

    fn cut(&mut self, cut: NoGoodCut) -> Step {
        let size = cut.len();
        match cut.append_to(&mut *self.model) {
            Ok(id) => {
                self.scope.record_cut();
                debug!(
                    event = "cut_appended",
                    cut = %id,
                    size,
                    constraints = self.model.constraint_count(),
                );
                Step::Solving
            }
            Err(e) => self.finish(EnumerationStatus::Failed(e.into())),
        }
    }

    fn finish(&mut self, status: EnumerationStatus) -> Step {
        self.scope.end_enumeration();
        self.terminate_early_flag.store(false, Ordering::SeqCst);

        let stats = self.scope.statistics();
        info!(
            event = "enumeration_end",
            status = %status,
            solutions = stats.solution_count,
            solves = stats.solve_count,
            cuts = stats.cut_count,
            duration_ms = stats.total_duration.as_millis() as u64,
        );
        Step::Finished(status)
    }
}

impl<K, O, T> Iterator for Solutions<'_, K, O, T>
where
    K: VariableKey,
    O: Oracle,
    T: Termination,
{
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        loop {
            match std::mem::replace(&mut self.step, Step::Solving) {
                Step::Solving => self.step = self.solve(),
                Step::Recording(assignment) => {
                    self.step = self.record(&assignment);
                    return Some(assignment);
                }
                Step::Cutting(cut) => self.step = self.cut(cut),
                Step::Finished(status) => {
                    self.step = Step::Finished(status);
                    return None;
                }
            }
        }
    }
}

impl<K, O, T> FusedIterator for Solutions<'_, K, O, T>
where
    K: VariableKey,
    O: Oracle,
    T: Termination,
{
}

impl<K, O, T> Drop for Solutions<'_, K, O, T>
where
    K: VariableKey,
    O: Oracle,
    T: Termination,
{
    /// An iterator dropped between polls still cuts off the last solution it
    /// handed out, and the run ends as terminated.
    fn drop(&mut self) {
        self.append_pending_cut();
        if !matches!(self.step, Step::Finished(_)) {
            self.step = self.finish(EnumerationStatus::Terminated);
        }
    }
}
