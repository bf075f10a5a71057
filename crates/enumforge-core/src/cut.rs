//! No-good cuts over binary variables.
//!
//! For an assignment `a`, the no-good cut is
//!
//! ```text
//! Σ_{v free, a_v = 1} (1 - v)  +  Σ_{v free, a_v = 0} v  >=  1
//! ```
//!
//! Each contribution is 0 exactly when `v` keeps its value in `a`, so the sum
//! is 0 on `a` alone and at least 1 on every assignment that differs in some
//! free variable. Fixed variables never contribute: their term would be 0 in
//! every future solve.

use thiserror::Error;

use crate::error::ModelResult;
use crate::model::{Assignment, ConstraintId, LinearExpr, Model, VarId, VariableKey};

/// Raised when every variable is fixed, so no cut can tell solutions apart.
///
/// The single assignment of such a model has already been found; callers
/// treat this as the end of enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("all variables are fixed; no distinguishing cut exists")]
pub struct DegenerateCut;

/// The cut excluding exactly one assignment.
///
/// # Example
///
/// ```
/// use enumforge_core::{Assignment, Model, NoGoodCut};
///
/// let mut model = Model::new("two");
/// let a = model.add_variable("a", None).unwrap();
/// let _b = model.add_variable("b", None).unwrap();
///
/// let found = Assignment::new(vec![true, false]);
/// let cut = NoGoodCut::derive(&model, &found).unwrap();
///
/// assert!(cut.is_violated_by(&found));
/// assert!(!cut.is_violated_by(&Assignment::new(vec![true, true])));
/// assert!(cut.contains(a));
///
/// cut.append_to(&mut model).unwrap();
/// assert_eq!(model.cuts().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NoGoodCut {
    expr: LinearExpr,
}

impl NoGoodCut {
    /// Derives the no-good cut of `assignment` over the free variables of `model`.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateCut`] if the model has no free variables.
    ///
    /// # Panics
    ///
    /// Panics if `assignment` does not cover every variable of `model`.
    pub fn derive<K: VariableKey>(
        model: &Model<K>,
        assignment: &Assignment,
    ) -> Result<Self, DegenerateCut> {
        let mut expr = LinearExpr::new();
        for var in model.free_variables() {
            if assignment.value(var) {
                // (1 - v)
                expr.add_constant(1.0);
                expr.add_term(var, -1.0);
            } else {
                expr.add_term(var, 1.0);
            }
        }
        if expr.is_empty() {
            return Err(DegenerateCut);
        }
        Ok(Self { expr })
    }

    /// The left-hand side `Σ contributions`.
    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    /// The right-hand side; always 1.
    pub fn rhs(&self) -> f64 {
        1.0
    }

    /// Number of variables in the cut.
    pub fn len(&self) -> usize {
        self.expr.terms().len()
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.expr.terms().iter().any(|(v, _)| *v == var)
    }

    /// Returns true if `assignment` is the one this cut excludes
    /// (on the variables it constrains).
    pub fn is_violated_by(&self, assignment: &Assignment) -> bool {
        self.expr.evaluate(assignment.values()) < self.rhs()
    }

    /// Appends this cut to `model`, consuming it.
    pub fn append_to<K: VariableKey>(self, model: &mut Model<K>) -> ModelResult<ConstraintId> {
        let rhs = self.rhs();
        model.append_cut(self.expr, rhs)
    }
}
