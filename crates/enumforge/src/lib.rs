//! EnumForge - enumerate every solution of a binary linear model
//!
//! Solutions are found one at a time by an optimization oracle. After each
//! one a no-good cut is appended to the model so the next solve cannot
//! return it again. The loop stops once the model becomes infeasible.
//!
//! # Example
//!
//! ```rust
//! use enumforge::prelude::*;
//!
//! let mut model = Model::new("pair");
//! let a = model.add_variable("a", None).unwrap();
//! let b = model.add_variable("b", None).unwrap();
//! model
//!     .add_constraint(LinearExpr::sum([a, b]), Comparison::Eq, 1.0)
//!     .unwrap();
//!
//! let mut enumerator = Enumerator::new(BacktrackingOracle::new());
//! let (solutions, report) = enumerator.collect_solutions(&mut model);
//! assert_eq!(solutions.len(), 2);
//! assert!(report.is_done());
//! ```

// Model types
pub use enumforge_core::{
    Assignment, Comparison, ConstraintId, DegenerateCut, LinearConstraint, LinearExpr, Model,
    ModelError, ModelResult, NoGoodCut, Objective, ObjectiveSense, VarId, Variable, VariableKey,
    Violation,
};

// Enumeration
pub use enumforge_solver::{
    AnyOracle, BacktrackingOracle, ConfiguredTermination, EnumerationError, EnumerationReport,
    EnumerationResult, EnumerationState, EnumerationStatistics, EnumerationStatus, Enumerator,
    GlpsolOracle, Oracle, Solutions, SolveResult, TerminateHandle,
};

// Terminations
pub use enumforge_solver::termination;

// Configuration
pub use enumforge_config::{
    ConfigError, EnumeratorConfig, EnvironmentMode, OracleConfig, DEFAULT_CONFIG_FILE,
};

mod run;
pub use run::{enumerate_all, enumerate_to_channel, enumerate_with_config};

pub mod prelude {
    pub use super::{Assignment, Comparison, LinearExpr, Model, ObjectiveSense};
    pub use super::{BacktrackingOracle, EnumerationReport, EnumerationStatus, Enumerator};
    pub use super::{enumerate_all, enumerate_with_config, EnumeratorConfig};
}
