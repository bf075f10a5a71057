//! Shared test fixtures for EnumForge crates.
//!
//! This crate provides models and pure functions for testing.
//! It depends on `enumforge-core` only, so `enumforge-solver` can use it as a
//! dev-dependency without a cycle.
//!
//! - [`sudoku`] - Latin-square and Sudoku models keyed by [`Cell`]
//! - [`brute`] - exhaustive counting of feasible assignments
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! enumforge-test = { workspace = true }
//! ```
//!
//! ```
//! use enumforge_test::{count_feasible, mini_sudoku};
//!
//! assert_eq!(count_feasible(&mini_sudoku()), 2);
//! ```

pub mod brute;
pub mod sudoku;

pub use brute::{count_feasible, feasible_assignments};
pub use sudoku::{latin_square, mini_sudoku, sudoku, Cell};
