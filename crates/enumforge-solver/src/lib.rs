//! EnumForge Solver
//!
//! This crate provides:
//! - [`Oracle`] and its implementations ([`BacktrackingOracle`], [`GlpsolOracle`], [`AnyOracle`])
//! - [`Enumerator`], the no-good cut enumeration driver
//! - Termination conditions for enumeration runs
//! - Enumeration scope and statistics

pub mod enumerate;
pub mod error;
pub mod oracle;
pub mod scope;
pub mod statistics;
pub mod termination;

#[cfg(test)]
mod test_utils;

pub use enumerate::{
    ConfiguredTermination, EnumerationReport, EnumerationState, EnumerationStatus, Enumerator,
    Solutions, TerminateHandle,
};
pub use error::{EnumerationError, EnumerationResult};
pub use oracle::{AnyOracle, BacktrackingOracle, GlpsolOracle, Oracle, SolveResult};
pub use scope::EnumerationScope;
pub use statistics::EnumerationStatistics;
pub use termination::{
    AndTermination, ExternalTermination, NoTermination, OrTermination, SolutionCountTermination,
    Termination, TimeTermination,
};
