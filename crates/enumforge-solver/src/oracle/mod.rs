//! Solver oracles.
//!
//! An oracle receives a read-only [`Model`] and answers with a satisfying
//! assignment, a definitive infeasibility signal, or an error unrelated to
//! feasibility. The enumeration driver never looks inside an oracle.
//!
//! # Oracles
//!
//! - [`BacktrackingOracle`]: embedded depth-first search with bound propagation
//! - [`GlpsolOracle`]: GLPK's `glpsol` run as a child process on an LP file
//! - [`AnyOracle`]: runtime choice between the two, built from configuration

mod backtracking;
mod glpsol;
pub mod lp;


use std::fmt::Debug;

use enumforge_config::{EnumeratorConfig, EnvironmentMode, OracleConfig};
use enumforge_core::{Assignment, Model, VariableKey};

pub use backtracking::BacktrackingOracle;
pub use glpsol::GlpsolOracle;

/// Answer of one oracle call.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    /// A total assignment satisfying every constraint and cut.
    Optimal(Assignment),
    /// No assignment satisfies the current constraint set.
    Infeasible,
    /// The oracle failed for a reason unrelated to feasibility.
    Error(String),
}

impl SolveResult {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveResult::Optimal(_))
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveResult::Infeasible)
    }

    /// Short status label used in logs.
    pub fn status_name(&self) -> &'static str {
        match self {
            SolveResult::Optimal(_) => "optimal",
            SolveResult::Infeasible => "infeasible",
            SolveResult::Error(_) => "error",
        }
    }
}

/// Trait for solving engines.
///
/// Implementations must treat the model as read-only, return some assignment
/// whenever one exists, and never return an assignment that an appended cut
/// excludes.
pub trait Oracle: Send + Debug {
    /// Solves `model` once.
    fn solve<K: VariableKey>(&mut self, model: &Model<K>) -> SolveResult;

    /// Returns the oracle name for logging.
    fn oracle_name(&self) -> &'static str;
}

impl<O: Oracle> Oracle for &mut O {
    fn solve<K: VariableKey>(&mut self, model: &Model<K>) -> SolveResult {
        (**self).solve(model)
    }

    fn oracle_name(&self) -> &'static str {
        (**self).oracle_name()
    }
}

/// Oracle selected at runtime.
#[derive(Debug)]
pub enum AnyOracle {
    Backtracking(BacktrackingOracle),
    Glpsol(GlpsolOracle),
}

impl AnyOracle {
    /// Builds the oracle described by `config`.
    ///
    /// In reproducible mode the built-in oracle is seeded with
    /// `random_seed`, or 0 when no seed is given.
    pub fn from_config(config: &EnumeratorConfig) -> Self {
        match &config.oracle {
            OracleConfig::Backtracking(b) => {
                let mut oracle = BacktrackingOracle::new();
                if let Some(limit) = b.node_limit {
                    oracle = oracle.with_node_limit(limit);
                }
                if let Some(limit) = b.time_limit() {
                    oracle = oracle.with_time_limit(limit);
                }
                let seed = match config.environment_mode {
                    EnvironmentMode::Reproducible => Some(config.random_seed.unwrap_or(0)),
                    _ => config.random_seed,
                };
                if let Some(seed) = seed {
                    oracle = oracle.with_seed(seed);
                }
                AnyOracle::Backtracking(oracle)
            }
            OracleConfig::Glpsol(g) => {
                let mut oracle = GlpsolOracle::new(g.command.clone());
                if let Some(limit) = g.time_limit() {
                    oracle = oracle.with_time_limit(limit);
                }
                AnyOracle::Glpsol(oracle)
            }
        }
    }
}

impl Default for AnyOracle {
    fn default() -> Self {
        AnyOracle::Backtracking(BacktrackingOracle::new())
    }
}

impl Oracle for AnyOracle {
    fn solve<K: VariableKey>(&mut self, model: &Model<K>) -> SolveResult {
        match self {
            AnyOracle::Backtracking(o) => o.solve(model),
            AnyOracle::Glpsol(o) => o.solve(model),
        }
    }

    fn oracle_name(&self) -> &'static str {
        match self {
            AnyOracle::Backtracking(o) => o.oracle_name(),
            AnyOracle::Glpsol(o) => o.oracle_name(),
        }
    }
}
