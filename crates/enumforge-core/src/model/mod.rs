//! Binary linear models.
//!
//! A [`Model`] owns a set of binary variables, the problem constraints, and a
//! cut container that is allocated up front. After construction the model is
//! only ever extended: constraints and cuts are appended, never removed or
//! rewritten.

mod assignment;
mod expr;
mod variable;


use std::collections::HashMap;
use std::fmt;

use crate::error::{ModelError, ModelResult};

pub use assignment::Assignment;
pub use expr::{Comparison, LinearConstraint, LinearExpr, FEASIBILITY_TOLERANCE};
pub use variable::{VarId, Variable, VariableKey};

/// Identifies a constraint within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintId {
    /// A problem constraint added with [`Model::add_constraint`].
    Problem(usize),
    /// A cut added with [`Model::append_cut`].
    Cut(usize),
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintId::Problem(i) => write!(f, "c{}", i),
            ConstraintId::Cut(i) => write!(f, "cut{}", i),
        }
    }
}

/// Optimization direction of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// A linear objective. Models without one are pure feasibility models.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub expr: LinearExpr,
    pub sense: ObjectiveSense,
}

/// Why an assignment does not satisfy a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The assignment covers a different number of variables.
    Length { expected: usize, actual: usize },
    /// A fixed variable deviates from its pinned value.
    FixedVariable(VarId),
    /// A constraint or cut is violated.
    Constraint(ConstraintId),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Length { expected, actual } => {
                write!(f, "expected {} values, got {}", expected, actual)
            }
            Violation::FixedVariable(var) => write!(f, "fixed variable {} changed", var),
            Violation::Constraint(id) => write!(f, "constraint {} violated", id),
        }
    }
}

/// A binary linear model.
///
/// # Example
///
/// ```
/// use enumforge_core::{Comparison, LinearExpr, Model};
///
/// let mut model = Model::new("pick-one");
/// let vars: Vec<_> = (0..3)
///     .map(|i| model.add_variable(i, None).unwrap())
///     .collect();
/// model
///     .add_constraint(LinearExpr::sum(vars), Comparison::Eq, 1.0)
///     .unwrap();
///
/// assert_eq!(model.variable_count(), 3);
/// assert_eq!(model.constraint_count(), 1);
/// assert!(model.cuts().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Model<K> {
    name: String,
    variables: Vec<Variable<K>>,
    index: HashMap<K, VarId>,
    constraints: Vec<LinearConstraint>,
    cuts: Vec<LinearConstraint>,
    objective: Option<Objective>,
}

impl<K: VariableKey> Model<K> {
    /// Creates an empty model with an empty cut container.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
            cuts: Vec::new(),
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // === Construction ===

    /// Registers a binary variable, optionally pinned to `fixed`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateVariable`] if `key` is already present.
    pub fn add_variable(&mut self, key: K, fixed: Option<bool>) -> ModelResult<VarId> {
        if self.index.contains_key(&key) {
            return Err(ModelError::DuplicateVariable(format!("{:?}", key)));
        }
        let id = VarId(self.variables.len());
        self.index.insert(key.clone(), id);
        self.variables.push(Variable::new(key, fixed));
        Ok(id)
    }

    /// Pins an existing variable to `value`.
    ///
    /// Fixing a variable again to the same value is a no-op.
    pub fn fix(&mut self, var: VarId, value: bool) -> ModelResult<()> {
        let variable = self
            .variables
            .get_mut(var.index())
            .ok_or(ModelError::UnknownVariable(var.index()))?;
        match variable.fixed_value() {
            Some(fixed) if fixed != value => Err(ModelError::ConflictingFix {
                index: var.index(),
                fixed,
            }),
            _ => {
                variable.set_fixed(value);
                Ok(())
            }
        }
    }

    /// Appends a problem constraint `expr <comparison> rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConstraint`] if `expr` references an
    /// unknown variable or any coefficient or the right-hand side is not
    /// finite.
    pub fn add_constraint(
        &mut self,
        expr: LinearExpr,
        comparison: Comparison,
        rhs: f64,
    ) -> ModelResult<ConstraintId> {
        self.validate(&expr, rhs)?;
        self.constraints
            .push(LinearConstraint::new(expr, comparison, rhs));
        Ok(ConstraintId::Problem(self.constraints.len() - 1))
    }

    /// Appends the cut `expr >= rhs`.
    ///
    /// The constraint count grows by exactly one; nothing else changes.
    pub fn append_cut(&mut self, expr: LinearExpr, rhs: f64) -> ModelResult<ConstraintId> {
        self.validate(&expr, rhs)?;
        self.cuts
            .push(LinearConstraint::new(expr, Comparison::Ge, rhs));
        Ok(ConstraintId::Cut(self.cuts.len() - 1))
    }

    /// Sets the linear objective.
    pub fn set_objective(&mut self, expr: LinearExpr, sense: ObjectiveSense) -> ModelResult<()> {
        self.validate(&expr, 0.0)?;
        self.objective = Some(Objective { expr, sense });
        Ok(())
    }

    fn validate(&self, expr: &LinearExpr, rhs: f64) -> ModelResult<()> {
        for (var, coef) in expr.terms() {
            if var.index() >= self.variables.len() {
                return Err(ModelError::InvalidConstraint(format!(
                    "references unknown variable {} (model has {} variables)",
                    var,
                    self.variables.len()
                )));
            }
            if !coef.is_finite() {
                return Err(ModelError::InvalidConstraint(format!(
                    "coefficient of {} is {}",
                    var, coef
                )));
            }
        }
        if !rhs.is_finite() || !expr.constant_term().is_finite() {
            return Err(ModelError::InvalidConstraint(format!(
                "right-hand side {} is not finite",
                rhs
            )));
        }
        Ok(())
    }

    // === Accessors ===

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variable(&self, var: VarId) -> Option<&Variable<K>> {
        self.variables.get(var.index())
    }

    /// Returns the key of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` was not issued by this model.
    pub fn key(&self, var: VarId) -> &K {
        self.variables[var.index()].key()
    }

    pub fn lookup(&self, key: &K) -> Option<VarId> {
        self.index.get(key).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable<K>)> + '_ {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VarId(i), v))
    }

    /// Iterates over the variables whose key matches `pred`.
    pub fn variables_where<'a, P>(&'a self, mut pred: P) -> impl Iterator<Item = VarId> + 'a
    where
        P: FnMut(&K) -> bool + 'a,
    {
        self.variables()
            .filter(move |(_, v)| pred(v.key()))
            .map(|(id, _)| id)
    }

    /// Builds `Σ v` over the variables whose key matches `pred`.
    pub fn sum_where<P>(&self, pred: P) -> LinearExpr
    where
        P: FnMut(&K) -> bool,
    {
        let mut pred = pred;
        self.variables()
            .filter(|(_, v)| pred(v.key()))
            .map(|(id, _)| id)
            .collect()
    }

    /// Iterates over the variables that are not fixed.
    pub fn free_variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.variables()
            .filter(|(_, v)| !v.is_fixed())
            .map(|(id, _)| id)
    }

    pub fn free_variable_count(&self) -> usize {
        self.variables.iter().filter(|v| !v.is_fixed()).count()
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn cuts(&self) -> &[LinearConstraint] {
        &self.cuts
    }

    /// Iterates over problem constraints followed by cuts.
    pub fn all_constraints(&self) -> impl Iterator<Item = (ConstraintId, &LinearConstraint)> + '_ {
        let problem = self
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| (ConstraintId::Problem(i), c));
        let cuts = self
            .cuts
            .iter()
            .enumerate()
            .map(|(i, c)| (ConstraintId::Cut(i), c));
        problem.chain(cuts)
    }

    /// Number of problem constraints plus cuts.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len() + self.cuts.len()
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    // === Checking ===

    /// Returns the first reason `assignment` does not satisfy this model.
    pub fn first_violation(&self, assignment: &Assignment) -> Option<Violation> {
        if assignment.len() != self.variables.len() {
            return Some(Violation::Length {
                expected: self.variables.len(),
                actual: assignment.len(),
            });
        }
        let values = assignment.values();
        for (id, variable) in self.variables() {
            if let Some(fixed) = variable.fixed_value() {
                if values[id.index()] != fixed {
                    return Some(Violation::FixedVariable(id));
                }
            }
        }
        self.all_constraints()
            .find(|(_, c)| !c.is_satisfied_by(values))
            .map(|(id, _)| Violation::Constraint(id))
    }

    /// Returns true if `assignment` satisfies every constraint and cut.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.first_violation(assignment).is_none()
    }

    /// Evaluates the objective, if any, at `assignment`.
    pub fn objective_value(&self, assignment: &Assignment) -> Option<f64> {
        self.objective
            .as_ref()
            .map(|o| o.expr.evaluate(assignment.values()))
    }
}
