//! Test utilities for enumforge-solver
//!
//! Re-exports fixtures from enumforge-test and adds an oracle that replays a
//! script.

use std::collections::VecDeque;

use enumforge_core::{Assignment, Model, VariableKey};

use crate::oracle::{Oracle, SolveResult};

pub use enumforge_test::{count_feasible, feasible_assignments, latin_square, mini_sudoku, Cell};

/// What a [`ScriptedOracle`] saw on one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveCall {
    pub constraint_count: usize,
    pub cut_count: usize,
}

/// Oracle returning a fixed sequence of results.
///
/// Once the script runs out every call answers
/// `Error("scripted oracle exhausted")`.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: VecDeque<SolveResult>,
    calls: Vec<SolveCall>,
}

impl ScriptedOracle {
    pub fn new(script: impl IntoIterator<Item = SolveResult>) -> Self {
        Self {
            script: script.into_iter().collect(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[SolveCall] {
        &self.calls
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Oracle for ScriptedOracle {
    fn solve<K: VariableKey>(&mut self, model: &Model<K>) -> SolveResult {
        self.calls.push(SolveCall {
            constraint_count: model.constraint_count(),
            cut_count: model.cuts().len(),
        });
        self.script
            .pop_front()
            .unwrap_or_else(|| SolveResult::Error("scripted oracle exhausted".to_string()))
    }

    fn oracle_name(&self) -> &'static str {
        "Scripted"
    }
}

/// Shorthand for `SolveResult::Optimal` over raw values.
pub fn optimal(values: &[bool]) -> SolveResult {
    SolveResult::Optimal(Assignment::new(values.to_vec()))
}

/// Two free variables with `a + b >= 1`; three solutions.
pub fn at_least_one_of_two() -> Model<&'static str> {
    use enumforge_core::{Comparison, LinearExpr};

    let mut model = Model::new("at-least-one");
    let a = model.add_variable("a", None).unwrap();
    let b = model.add_variable("b", None).unwrap();
    model
        .add_constraint(LinearExpr::sum([a, b]), Comparison::Ge, 1.0)
        .unwrap();
    model
}
