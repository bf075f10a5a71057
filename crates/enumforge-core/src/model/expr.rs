//! Linear expressions and constraints over binary variables.

use std::fmt;

use super::VarId;

/// Absolute tolerance used when checking a constraint against 0/1 values.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// A linear expression `Σ coef·var + constant`.
///
/// # Example
///
/// ```
/// use enumforge_core::{LinearExpr, Model};
///
/// let mut model = Model::new("demo");
/// let a = model.add_variable("a", None).unwrap();
/// let b = model.add_variable("b", None).unwrap();
///
/// // (1 - a) + b
/// let expr = LinearExpr::new().term(a, -1.0).term(b, 1.0).constant(1.0);
/// assert_eq!(expr.evaluate(&[true, true]), 1.0);
/// assert_eq!(expr.evaluate(&[true, false]), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `Σ var` with unit coefficients.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        vars.into_iter().collect()
    }

    /// Adds `coef·var`.
    pub fn term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Adds a constant offset.
    pub fn constant(mut self, value: f64) -> Self {
        self.constant += value;
        self
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression with `values[i]` as the value of variable `i`.
    ///
    /// # Panics
    ///
    /// Panics if a term references an index outside `values`.
    pub fn evaluate(&self, values: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(var, _)| values[var.index()])
            .map(|(_, coef)| coef)
            .sum::<f64>()
            + self.constant
    }
}

impl FromIterator<VarId> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(|var| (var, 1.0)).collect(),
            constant: 0.0,
        }
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", self.constant);
        }
        for (i, (var, coef)) in self.terms.iter().enumerate() {
            let sign = if *coef < 0.0 { "-" } else { "+" };
            if i == 0 {
                if *coef < 0.0 {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {} ", sign)?;
            }
            let magnitude = coef.abs();
            if magnitude == 1.0 {
                write!(f, "{}", var)?;
            } else {
                write!(f, "{} {}", magnitude, var)?;
            }
        }
        if self.constant != 0.0 {
            let sign = if self.constant < 0.0 { "-" } else { "+" };
            write!(f, " {} {}", sign, self.constant.abs())?;
        }
        Ok(())
    }
}

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    /// `lhs = rhs`
    Eq,
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
}

impl Comparison {
    /// Returns true if `lhs <op> rhs` holds within [`FEASIBILITY_TOLERANCE`].
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Eq => (lhs - rhs).abs() <= FEASIBILITY_TOLERANCE,
            Comparison::Le => lhs <= rhs + FEASIBILITY_TOLERANCE,
            Comparison::Ge => lhs >= rhs - FEASIBILITY_TOLERANCE,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Eq => write!(f, "="),
            Comparison::Le => write!(f, "<="),
            Comparison::Ge => write!(f, ">="),
        }
    }
}

/// A linear constraint `expr <op> rhs`.
///
/// Immutable once it is owned by a model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearConstraint {
    expr: LinearExpr,
    comparison: Comparison,
    rhs: f64,
}

impl LinearConstraint {
    pub(crate) fn new(expr: LinearExpr, comparison: Comparison, rhs: f64) -> Self {
        Self {
            expr,
            comparison,
            rhs,
        }
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Right-hand side with the expression's constant moved across.
    ///
    /// Solvers see `Σ coef·var <op> normalized_rhs()`.
    pub fn normalized_rhs(&self) -> f64 {
        self.rhs - self.expr.constant_term()
    }

    /// Returns true if the 0/1 vector satisfies this constraint.
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        self.comparison.holds(self.expr.evaluate(values), self.rhs)
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expr, self.comparison, self.rhs)
    }
}
