//! Tests for termination conditions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::*;
use crate::scope::EnumerationScope;

fn started_scope() -> EnumerationScope {
    let mut scope = EnumerationScope::new();
    scope.start_enumeration();
    scope
}

#[test]
fn test_solution_count_termination() {
    let mut scope = started_scope();
    let term = SolutionCountTermination::new(2);

    assert!(!term.is_terminated(&scope));
    scope.record_solution();
    assert!(!term.is_terminated(&scope));
    scope.record_solution();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_time_termination() {
    let scope = started_scope();
    assert!(!TimeTermination::seconds(60).is_terminated(&scope));

    thread::sleep(Duration::from_millis(20));
    assert!(TimeTermination::millis(10).is_terminated(&scope));
}

#[test]
fn test_time_termination_before_start() {
    let scope = EnumerationScope::new();
    assert!(!TimeTermination::new(Duration::ZERO).is_terminated(&scope));
}

#[test]
fn test_external_termination() {
    let flag = Arc::new(AtomicBool::new(false));
    let term = ExternalTermination::new(Arc::clone(&flag));
    let scope = started_scope();

    assert!(!term.is_terminated(&scope));
    flag.store(true, Ordering::SeqCst);
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_no_termination_and_option() {
    let mut scope = started_scope();
    scope.record_solution();

    assert!(!NoTermination.is_terminated(&scope));
    assert!(!None::<SolutionCountTermination>.is_terminated(&scope));
    assert!(Some(SolutionCountTermination::new(1)).is_terminated(&scope));
}

#[test]
fn test_or_termination() {
    let mut scope = started_scope();
    let term = OrTermination::new((
        TimeTermination::seconds(60),
        SolutionCountTermination::new(1),
    ));

    assert!(!term.is_terminated(&scope));
    scope.record_solution();
    assert!(term.is_terminated(&scope));
}

#[test]
fn test_and_termination() {
    let mut scope = started_scope();
    let term = AndTermination::new((
        SolutionCountTermination::new(1),
        SolutionCountTermination::new(2),
    ));

    scope.record_solution();
    assert!(!term.is_terminated(&scope));
    scope.record_solution();
    assert!(term.is_terminated(&scope));
}
