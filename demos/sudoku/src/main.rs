//! Sudoku Example
//!
//! Every (row, col, value) triple of a 9×9 board is a binary variable. Each
//! cell holds one value, and each value appears once per row, column and
//! 3×3 box. The clues are fixed to 1 and every completion of the board is
//! enumerated with no-good cuts.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use enumforge::prelude::*;
use enumforge::DEFAULT_CONFIG_FILE;

const SIDE: usize = 9;
const BOX: usize = 3;

/// (row, col, value), all 1-based.
type Square = (usize, usize, usize);

#[rustfmt::skip]
const BOARD: [Square; 30] = [
    (1, 1, 5), (1, 2, 3), (1, 5, 7),
    (2, 1, 6), (2, 4, 1), (2, 5, 9), (2, 6, 5),
    (3, 2, 9), (3, 3, 8), (3, 8, 6),
    (4, 1, 8), (4, 5, 6), (4, 9, 3),
    (5, 1, 4), (5, 4, 8), (5, 6, 3), (5, 9, 1),
    (6, 1, 7), (6, 5, 2), (6, 9, 6),
    (7, 2, 6), (7, 7, 2), (7, 8, 8),
    (8, 4, 4), (8, 5, 1), (8, 6, 9), (8, 9, 5),
    (9, 5, 8), (9, 8, 7), (9, 9, 9),
];

#[derive(Parser)]
#[command(name = "sudoku")]
#[command(about = "Find every solution of a Sudoku board", long_about = None)]
struct Cli {
    /// Board file with one `row col value` clue per line (1-based)
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// Enumerator configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Stop after this many solutions
    #[arg(short, long)]
    limit: Option<u64>,
}

/// Builds the board model with `givens` fixed to 1.
fn create_sudoku_model(givens: &[Square]) -> Result<Model<Square>, Box<dyn Error>> {
    let mut model = Model::new("sudoku");
    for row in 1..=SIDE {
        for col in 1..=SIDE {
            for value in 1..=SIDE {
                model.add_variable((row, col, value), None)?;
            }
        }
    }

    for a in 1..=SIDE {
        for b in 1..=SIDE {
            // One value per cell.
            let cell = model.sum_where(|&(r, c, _)| r == a && c == b);
            model.add_constraint(cell, Comparison::Eq, 1.0)?;
            // Value b once in row a, once in column a.
            let row = model.sum_where(|&(r, _, v)| r == a && v == b);
            model.add_constraint(row, Comparison::Eq, 1.0)?;
            let col = model.sum_where(|&(_, c, v)| c == a && v == b);
            model.add_constraint(col, Comparison::Eq, 1.0)?;
        }
    }

    for box_index in 0..SIDE {
        let top = box_index / BOX * BOX;
        let left = box_index % BOX * BOX;
        for value in 1..=SIDE {
            let square = model.sum_where(|&(r, c, v)| {
                v == value && (r - 1) / BOX * BOX == top && (c - 1) / BOX * BOX == left
            });
            model.add_constraint(square, Comparison::Eq, 1.0)?;
        }
    }

    for given in givens {
        match model.lookup(given) {
            Some(var) => model.fix(var, true)?,
            None => return Err(format!("clue {:?} lies outside the board", given).into()),
        }
    }
    Ok(model)
}

fn read_board(path: &Path) -> Result<Vec<Square>, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    let mut givens = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<usize> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|e| format!("{}:{}: {}", path.display(), number + 1, e))?;
        match fields.as_slice() {
            &[row, col, value] => givens.push((row, col, value)),
            _ => {
                return Err(format!(
                    "{}:{}: expected `row col value`",
                    path.display(),
                    number + 1
                )
                .into())
            }
        }
    }
    Ok(givens)
}

/// Renders the board of one solution, `.` for an empty cell.
fn format_board(model: &Model<Square>, assignment: &Assignment) -> String {
    let mut grid = [[0usize; SIDE]; SIDE];
    for &(row, col, value) in assignment.selected_keys(model) {
        grid[row - 1][col - 1] = value;
    }

    let mut out = String::new();
    for (r, line) in grid.iter().enumerate() {
        if r > 0 && r % BOX == 0 {
            out.push_str("------+-------+------\n");
        }
        for (c, &value) in line.iter().enumerate() {
            if c > 0 && c % BOX == 0 {
                out.push_str("| ");
            }
            match value {
                0 => out.push_str(". "),
                v => out.push_str(&format!("{} ", v)),
            }
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let givens = match &cli.board {
        Some(path) => read_board(path)?,
        None => BOARD.to_vec(),
    };
    let mut model = create_sudoku_model(&givens)?;

    let mut config = EnumeratorConfig::load(&cli.config).unwrap_or_default();
    if let Some(limit) = cli.limit {
        config = config.with_solution_limit(limit);
    }

    // The consumer only sees assignments, so render against a snapshot
    // taken before any cut is appended.
    let board_model = model.clone();
    let mut solution_count = 0;
    let report = enumerate_with_config(&mut model, &config, |assignment| {
        solution_count += 1;
        println!("== Solution #{}", solution_count);
        print!("{}", format_board(&board_model, assignment));
    });

    match report.status {
        EnumerationStatus::Done => println!("All Sudoku board solutions have been found."),
        EnumerationStatus::Terminated => {
            println!("Stopped after {} solution(s).", solution_count)
        }
        EnumerationStatus::Failed(e) => return Err(e.into()),
    }
    Ok(())
}
