//! Exhaustive enumeration over the free variables of a model.
//!
//! These are reference counts for enumeration tests; they visit all
//! `2^free` assignments and are only meant for small models.

use enumforge_core::{Assignment, Model, VariableKey};

/// Largest number of free variables the brute-force helpers accept.
pub const MAX_FREE_VARIABLES: usize = 24;

/// Returns every assignment satisfying all constraints and cuts of `model`,
/// ordered by the binary value of the free variables.
///
/// # Panics
///
/// Panics if the model has more than [`MAX_FREE_VARIABLES`] free variables.
pub fn feasible_assignments<K: VariableKey>(model: &Model<K>) -> Vec<Assignment> {
    let free: Vec<usize> = model.free_variables().map(|v| v.index()).collect();
    assert!(
        free.len() <= MAX_FREE_VARIABLES,
        "{} free variables is too many to brute-force",
        free.len()
    );

    let mut base = vec![false; model.variable_count()];
    for (id, variable) in model.variables() {
        if let Some(value) = variable.fixed_value() {
            base[id.index()] = value;
        }
    }

    let mut found = Vec::new();
    for mask in 0u64..(1u64 << free.len()) {
        let mut values = base.clone();
        for (bit, &index) in free.iter().enumerate() {
            values[index] = mask & (1 << bit) != 0;
        }
        let assignment = Assignment::new(values);
        if model.is_satisfied_by(&assignment) {
            found.push(assignment);
        }
    }
    found
}

/// Counts the assignments satisfying all constraints and cuts of `model`.
pub fn count_feasible<K: VariableKey>(model: &Model<K>) -> usize {
    feasible_assignments(model).len()
}
