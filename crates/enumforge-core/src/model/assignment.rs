//! Variable assignments returned by an oracle.

use super::{Model, VarId, VariableKey};

/// A complete 0/1 assignment over every variable of a model.
///
/// Fixed variables carry their pinned value. An assignment is produced by one
/// solve and handed to the caller by value; it never mutates the model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    values: Vec<bool>,
    objective: Option<f64>,
}

impl Assignment {
    /// Creates an assignment from values indexed by [`VarId::index`].
    pub fn new(values: Vec<bool>) -> Self {
        Self {
            values,
            objective: None,
        }
    }

    /// Attaches the objective value reported by the oracle.
    pub fn with_objective(mut self, objective: f64) -> Self {
        self.objective = Some(objective);
        self
    }

    /// Returns the value of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` is not covered by this assignment.
    pub fn value(&self, var: VarId) -> bool {
        self.values[var.index()]
    }

    /// Returns the value of `var`, or `None` if it is out of range.
    pub fn get(&self, var: VarId) -> Option<bool> {
        self.values.get(var.index()).copied()
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Iterates over the variables set to 1.
    pub fn ones(&self) -> impl Iterator<Item = VarId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| VarId(i))
    }

    /// Iterates over the keys of the variables set to 1.
    pub fn selected_keys<'m, K: VariableKey>(
        &'m self,
        model: &'m Model<K>,
    ) -> impl Iterator<Item = &'m K> + 'm {
        self.ones().map(move |var| model.key(var))
    }

    /// Returns the projection onto the non-fixed variables of `model`.
    ///
    /// Two assignments of the same model are distinct solutions exactly when
    /// their free projections differ.
    pub fn free_values<K: VariableKey>(&self, model: &Model<K>) -> Vec<(VarId, bool)> {
        model
            .free_variables()
            .map(|var| (var, self.value(var)))
            .collect()
    }
}
