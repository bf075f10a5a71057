//! Latin-square and Sudoku fixtures.
//!
//! A grid of side `n` is modeled with one binary variable per
//! (row, column, value) triple. Every cell holds exactly one value, and every
//! value appears exactly once per row and per column. Sudoku grids also
//! require each value exactly once per `box_size × box_size` subsquare.

use enumforge_core::{Comparison, LinearExpr, Model};

/// Variable key: "cell (`row`, `col`) holds `value`".
///
/// Values are 1-based, rows and columns 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub value: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize, value: usize) -> Self {
        Self { row, col, value }
    }
}

/// The 2×2 grid over values {1, 2}. It has exactly two solutions.
pub fn mini_sudoku() -> Model<Cell> {
    latin_square(2)
}

/// An unconstrained Latin square of side `n`.
///
/// Sides 1, 2, 3 and 4 have 1, 2, 12 and 576 solutions.
pub fn latin_square(n: usize) -> Model<Cell> {
    let mut model = Model::new(format!("latin-{}", n));
    add_cells(&mut model, n);
    add_grid_constraints(&mut model, n);
    model
}

/// A Sudoku of side `box_size²` with the given `(row, col, value)` clues.
///
/// Clue variables are fixed to 1. An empty 4×4 Sudoku has 288 solutions.
///
/// # Panics
///
/// Panics if a clue lies outside the grid.
pub fn sudoku(box_size: usize, givens: &[(usize, usize, usize)]) -> Model<Cell> {
    let n = box_size * box_size;
    let mut model = Model::new(format!("sudoku-{}x{}", n, n));
    add_cells(&mut model, n);
    add_grid_constraints(&mut model, n);

    for box_row in (0..n).step_by(box_size) {
        for box_col in (0..n).step_by(box_size) {
            for value in 1..=n {
                let expr = model.sum_where(|c| {
                    c.value == value
                        && (box_row..box_row + box_size).contains(&c.row)
                        && (box_col..box_col + box_size).contains(&c.col)
                });
                model
                    .add_constraint(expr, Comparison::Eq, 1.0)
                    .expect("subsquare constraint");
            }
        }
    }

    for &(row, col, value) in givens {
        let var = model
            .lookup(&Cell::new(row, col, value))
            .unwrap_or_else(|| panic!("clue ({}, {}, {}) outside the grid", row, col, value));
        model.fix(var, true).expect("clue");
    }
    model
}

fn add_cells(model: &mut Model<Cell>, n: usize) {
    for row in 0..n {
        for col in 0..n {
            for value in 1..=n {
                model
                    .add_variable(Cell::new(row, col, value), None)
                    .expect("cells are distinct");
            }
        }
    }
}

fn add_grid_constraints(model: &mut Model<Cell>, n: usize) {
    let mut groups: Vec<LinearExpr> = Vec::with_capacity(3 * n * n);
    for a in 0..n {
        for b in 0..n {
            groups.push(model.sum_where(|c| c.row == a && c.col == b));
        }
        for value in 1..=n {
            groups.push(model.sum_where(|c| c.row == a && c.value == value));
            groups.push(model.sum_where(|c| c.col == a && c.value == value));
        }
    }
    for expr in groups {
        model
            .add_constraint(expr, Comparison::Eq, 1.0)
            .expect("grid constraint");
    }
}
