//! Tests for the enumeration driver.

use std::collections::HashSet;

use proptest::prelude::*;
use tokio::sync::mpsc;

use enumforge_config::EnumeratorConfig;
use enumforge_core::{
    Assignment, Comparison, ConstraintId, LinearExpr, Model, ObjectiveSense, Violation,
};

use super::*;
use crate::error::EnumerationError;
use crate::oracle::{BacktrackingOracle, SolveResult};
use crate::termination::SolutionCountTermination;
use crate::test_utils::{
    at_least_one_of_two, count_feasible, feasible_assignments, latin_square, mini_sudoku, optimal,
    ScriptedOracle,
};

fn enumerate_all<K: VariableKey>(model: &mut Model<K>) -> (Vec<Assignment>, EnumerationReport) {
    Enumerator::new(BacktrackingOracle::new())
        .with_assignment_verification(true)
        .collect_solutions(model)
}

fn distinct(found: &[Assignment]) -> usize {
    found
        .iter()
        .map(|a| a.values().to_vec())
        .collect::<HashSet<_>>()
        .len()
}

#[test]
fn test_mini_sudoku_has_two_solutions() {
    let mut model = mini_sudoku();
    let original = model.clone();

    let (found, report) = enumerate_all(&mut model);

    assert!(report.is_done());
    assert_eq!(found.len(), 2);
    assert_eq!(distinct(&found), 2);
    for assignment in &found {
        assert!(original.is_satisfied_by(assignment));
    }
    assert_eq!(report.statistics.solve_count, 3);
    assert_eq!(report.statistics.cut_count, 2);
    assert_eq!(model.cuts().len(), 2);
}

#[test]
fn test_latin_square_count_matches_brute_force() {
    let mut model = latin_square(3);
    let expected = count_feasible(&model);
    assert_eq!(expected, 12);

    let (found, report) = enumerate_all(&mut model);
    assert!(report.is_done());
    assert_eq!(found.len(), expected);
    assert_eq!(distinct(&found), expected);
}

#[test]
fn test_oracle_error_on_second_solve() {
    let mut model = at_least_one_of_two();
    let mut oracle = ScriptedOracle::new([
        optimal(&[true, false]),
        SolveResult::Error("timeout".to_string()),
        optimal(&[false, true]),
    ]);

    let mut found = Vec::new();
    let report = Enumerator::new(&mut oracle).enumerate(&mut model, |a| found.push(a.clone()));

    assert_eq!(found, vec![Assignment::new(vec![true, false])]);
    assert_eq!(
        report.status,
        EnumerationStatus::Failed(EnumerationError::Oracle("timeout".to_string()))
    );
    assert_eq!(report.error().and_then(|e| e.oracle_reason()), Some("timeout"));
    assert_eq!(report.statistics.solve_count, 2);
    assert_eq!(report.statistics.cut_count, 1);

    // No solve after the error, and the one cut stays in the model.
    assert_eq!(oracle.calls().len(), 2);
    assert_eq!(oracle.remaining(), 1);
    assert_eq!(model.cuts().len(), 1);
}

#[test]
fn test_infeasible_first_solve() {
    let mut model = at_least_one_of_two();
    let mut oracle = ScriptedOracle::new([SolveResult::Infeasible]);

    let (found, report) = Enumerator::new(&mut oracle).collect_solutions(&mut model);

    assert!(found.is_empty());
    assert!(report.is_done());
    assert_eq!(report.statistics.solve_count, 1);
    assert!(model.cuts().is_empty());
}

#[test]
fn test_all_fixed_model_yields_one_solution() {
    let mut model = Model::new("pinned");
    let a = model.add_variable("a", Some(true)).unwrap();
    let b = model.add_variable("b", Some(false)).unwrap();
    model
        .add_constraint(LinearExpr::sum([a, b]), Comparison::Eq, 1.0)
        .unwrap();

    let (found, report) = enumerate_all(&mut model);

    assert_eq!(found, vec![Assignment::new(vec![true, false])]);
    assert!(report.is_done());
    assert_eq!(report.statistics.solve_count, 1);
    assert_eq!(report.statistics.cut_count, 0);
    assert!(model.cuts().is_empty());
}

#[test]
fn test_each_cut_excludes_its_own_solution_only() {
    let mut model = at_least_one_of_two();
    let (found, _) = enumerate_all(&mut model);
    assert_eq!(found.len(), 3);

    for (i, assignment) in found.iter().enumerate() {
        let values = assignment.values();
        assert!(!model.cuts()[i].is_satisfied_by(values));
        for (j, cut) in model.cuts().iter().enumerate() {
            if j != i {
                assert!(cut.is_satisfied_by(values));
            }
        }
    }
}

#[test]
fn test_fixed_variables_never_change_or_enter_cuts() {
    let mut model = latin_square(3);
    let clue = model.lookup(&crate::test_utils::Cell::new(0, 0, 2)).unwrap();
    model.fix(clue, true).unwrap();

    let (found, report) = enumerate_all(&mut model);

    assert!(report.is_done());
    assert_eq!(found.len(), 4);
    assert!(found.iter().all(|a| a.value(clue)));
    assert!(model
        .cuts()
        .iter()
        .all(|cut| cut.expr().terms().iter().all(|(v, _)| *v != clue)));
}

#[test]
fn test_solution_limit_terminates() {
    let mut model = latin_square(3);
    let mut enumerator =
        Enumerator::new(BacktrackingOracle::new()).with_termination(SolutionCountTermination::new(5));

    let (found, report) = enumerator.collect_solutions(&mut model);

    assert_eq!(found.len(), 5);
    assert!(report.is_terminated());
    assert_eq!(report.statistics.solve_count, 5);
    assert_eq!(report.statistics.cut_count, 5);
}

#[test]
fn test_terminate_early_from_consumer() {
    let mut model = latin_square(3);
    let mut enumerator = Enumerator::new(BacktrackingOracle::new());
    let handle = enumerator.terminate_handle();

    let mut count = 0;
    let report = enumerator.enumerate(&mut model, |_| {
        count += 1;
        handle.terminate_early();
    });

    assert_eq!(count, 1);
    assert!(report.is_terminated());
    assert_eq!(report.statistics.solve_count, 1);
    // The request is consumed by the run it stopped.
    assert!(!handle.is_terminate_early_requested());

    let mut fresh = mini_sudoku();
    assert!(enumerator.enumerate(&mut fresh, |_| {}).is_done());
}

#[test]
fn test_terminate_early_before_run() {
    let mut model = mini_sudoku();
    let mut enumerator = Enumerator::new(BacktrackingOracle::new());
    enumerator.terminate_early();

    let (found, report) = enumerator.collect_solutions(&mut model);
    assert!(found.is_empty());
    assert!(report.is_terminated());
    assert_eq!(report.statistics.solve_count, 0);
}

#[test]
fn test_state_transitions() {
    let mut model = mini_sudoku();
    let mut enumerator = Enumerator::new(BacktrackingOracle::new());
    let mut solutions = enumerator.solutions(&mut model);

    assert_eq!(solutions.state(), EnumerationState::Solving);
    assert!(solutions.next().is_some());
    assert_eq!(solutions.state(), EnumerationState::Cutting);
    assert!(solutions.next().is_some());
    assert!(solutions.next().is_none());
    assert_eq!(solutions.state(), EnumerationState::Done);
    assert!(solutions.state().is_terminal());
    assert!(solutions.next().is_none());
    assert_eq!(solutions.model().cuts().len(), 2);
    assert!(solutions.into_report().is_done());
}

#[test]
fn test_abandoned_iterator_reports_terminated() {
    let mut model = latin_square(3);
    let mut enumerator = Enumerator::new(BacktrackingOracle::new());
    let mut solutions = enumerator.solutions(&mut model);

    let first = solutions.next().unwrap();
    assert_eq!(solutions.status(), None);
    let report = solutions.into_report();
    assert!(report.is_terminated());
    assert_eq!(report.solution_count(), 1);
    assert_eq!(report.statistics.cut_count, 1);
    assert_eq!(model.cuts().len(), 1);

    // A later run on the same model never reports the first solution again.
    let (rest, report) = enumerator.collect_solutions(&mut model);
    assert!(report.is_done());
    assert_eq!(rest.len(), 11);
    assert!(rest.iter().all(|a| a.values() != first.values()));
}

#[test]
fn test_dropped_iterator_keeps_cuts() {
    let mut model = latin_square(3);
    let mut enumerator = Enumerator::new(BacktrackingOracle::new());
    let taken: Vec<Assignment> = enumerator.solutions(&mut model).take(2).collect();

    assert_eq!(taken.len(), 2);
    assert_eq!(model.cuts().len(), 2);
    for assignment in &taken {
        assert!(!model.is_satisfied_by(assignment));
    }

    let mut enumerator = Enumerator::new(BacktrackingOracle::new());
    let (rest, report) = enumerator.collect_solutions(&mut model);
    assert!(report.is_done());
    assert_eq!(rest.len(), 10);
    assert_eq!(distinct(&[taken, rest].concat()), 12);
}

#[test]
fn test_channel_streams_solutions() {
    let mut model = mini_sudoku();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let report =
        Enumerator::new(BacktrackingOracle::new()).enumerate_with_channel(&mut model, sender);

    assert!(report.is_done());
    let mut received = Vec::new();
    while let Ok(assignment) = receiver.try_recv() {
        received.push(assignment);
    }
    assert_eq!(received.len(), 2);
    assert_eq!(distinct(&received), 2);
}

#[test]
fn test_channel_with_closed_receiver_still_completes() {
    let mut model = mini_sudoku();
    let (sender, receiver) = mpsc::unbounded_channel();
    drop(receiver);

    let report =
        Enumerator::new(BacktrackingOracle::new()).enumerate_with_channel(&mut model, sender);
    assert!(report.is_done());
    assert_eq!(report.solution_count(), 2);
}

#[test]
fn test_verification_rejects_invalid_assignment() {
    let mut model = at_least_one_of_two();
    let mut oracle = ScriptedOracle::new([optimal(&[false, false])]);

    let report = Enumerator::new(&mut oracle)
        .with_assignment_verification(true)
        .enumerate(&mut model, |_| panic!("invalid assignment reported"));

    assert_eq!(
        report.status,
        EnumerationStatus::Failed(EnumerationError::AssignmentViolation {
            solve: 1,
            violation: Violation::Constraint(ConstraintId::Problem(0)),
        })
    );
    assert!(model.cuts().is_empty());
}

#[test]
fn test_short_assignment_always_rejected() {
    let mut model = at_least_one_of_two();
    let mut oracle = ScriptedOracle::new([optimal(&[true])]);

    let report = Enumerator::new(&mut oracle).enumerate(&mut model, |_| {});

    assert!(matches!(
        report.error(),
        Some(EnumerationError::AssignmentViolation {
            violation: Violation::Length {
                expected: 2,
                actual: 1
            },
            ..
        })
    ));
}

#[test]
fn test_from_config() {
    let config = EnumeratorConfig::new()
        .with_solution_limit(2)
        .with_random_seed(7);
    let mut enumerator = Enumerator::from_config(&config);
    assert_eq!(enumerator.oracle().oracle_name(), "Backtracking");
    assert!(!enumerator.verifies_assignments());

    let mut model = latin_square(3);
    let (found, report) = enumerator.collect_solutions(&mut model);
    assert_eq!(found.len(), 2);
    assert!(report.is_terminated());

    // The limit is checked before the solve that would prove infeasibility.
    let (found, report) = enumerator.collect_solutions(&mut mini_sudoku());
    assert_eq!(found.len(), 2);
    assert!(report.is_terminated());
}

#[test]
fn test_objective_solutions_come_in_cost_order() {
    let mut model = Model::new("choose-two");
    let costs = [4.0, 1.0, 3.0, 2.0];
    let vars: Vec<_> = (0..costs.len())
        .map(|i| model.add_variable(i, None).unwrap())
        .collect();
    model
        .add_constraint(LinearExpr::sum(vars.iter().copied()), Comparison::Eq, 2.0)
        .unwrap();
    let objective = vars
        .iter()
        .zip(costs)
        .fold(LinearExpr::new(), |e, (v, c)| e.term(*v, c));
    model
        .set_objective(objective, ObjectiveSense::Minimize)
        .unwrap();

    let (found, report) = enumerate_all(&mut model);

    assert!(report.is_done());
    assert_eq!(found.len(), 6);
    let objectives: Vec<f64> = found.iter().filter_map(|a| a.objective()).collect();
    assert_eq!(objectives.len(), 6);
    assert_eq!(objectives[0], 3.0);
    assert!(objectives.windows(2).all(|w| w[0] <= w[1]));
}

fn small_model() -> impl Strategy<Value = Model<usize>> {
    (1usize..=6)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::option::weighted(0.25, any::<bool>()), n),
                prop::collection::vec(
                    (prop::collection::vec(-2i32..=2, n), 0u8..3, -2i32..=3),
                    0..=3,
                ),
            )
        })
        .prop_map(|(fixings, rows)| {
            let mut model = Model::new("random");
            let vars: Vec<_> = fixings
                .into_iter()
                .enumerate()
                .map(|(i, fixed)| model.add_variable(i, fixed).unwrap())
                .collect();
            for (coefs, cmp, rhs) in rows {
                let expr = vars
                    .iter()
                    .zip(coefs)
                    .filter(|(_, c)| *c != 0)
                    .fold(LinearExpr::new(), |e, (v, c)| e.term(*v, c as f64));
                let comparison = match cmp {
                    0 => Comparison::Le,
                    1 => Comparison::Ge,
                    _ => Comparison::Eq,
                };
                model.add_constraint(expr, comparison, rhs as f64).unwrap();
            }
            model
        })
}

proptest! {
    #[test]
    fn prop_enumerates_every_feasible_assignment_once(mut model in small_model()) {
        let expected: HashSet<Vec<bool>> = feasible_assignments(&model)
            .into_iter()
            .map(|a| a.values().to_vec())
            .collect();

        let (found, report) = enumerate_all(&mut model);

        prop_assert!(report.is_done());
        prop_assert_eq!(found.len(), expected.len());
        let got: HashSet<Vec<bool>> = found.iter().map(|a| a.values().to_vec()).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_fixed_values_are_preserved(mut model in small_model()) {
        let fixed: Vec<(usize, bool)> = model
            .variables()
            .filter_map(|(id, v)| v.fixed_value().map(|value| (id.index(), value)))
            .collect();

        let (found, _) = enumerate_all(&mut model);

        for assignment in &found {
            for (index, value) in &fixed {
                prop_assert_eq!(assignment.values()[*index], *value);
            }
        }
        for cut in model.cuts() {
            for (var, _) in cut.expr().terms() {
                prop_assert!(fixed.iter().all(|(index, _)| *index != var.index()));
            }
        }
    }
}
