//! EnumForge Core - binary linear models and no-good cuts
//!
//! This crate provides the data side of solution enumeration:
//! - [`Model`]: binary variables, linear constraints and an append-only cut container
//! - [`Assignment`]: a complete 0/1 assignment returned by an oracle
//! - [`NoGoodCut`]: the minimal cut excluding exactly one assignment

pub mod cut;
pub mod error;
pub mod model;

#[cfg(test)]
mod cut_tests;

pub use cut::{DegenerateCut, NoGoodCut};
pub use error::{ModelError, ModelResult};
pub use model::{
    Assignment, Comparison, ConstraintId, LinearConstraint, LinearExpr, Model, Objective,
    ObjectiveSense, VarId, Variable, VariableKey, Violation,
};
