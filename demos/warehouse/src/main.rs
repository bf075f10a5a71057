//! Warehouse Location Example
//!
//! Choose `P` of the candidate warehouses and assign every customer to one
//! open warehouse so that the total delivery cost is minimal (the p-median
//! problem). The optimum is computed for each `P` in turn, and `--plans`
//! lists the cheapest alternative plans with no-good cuts.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use enumforge::prelude::*;
use enumforge::termination::SolutionCountTermination;
use enumforge::{AnyOracle, Oracle, SolveResult, DEFAULT_CONFIG_FILE};

const WAREHOUSES: [&str; 3] = ["Bangsar", "Sentul", "Rawang"];
const CUSTOMERS: [&str; 4] = ["Gombak", "Kajang", "Serdang", "Damansara"];

/// Delivery cost, `COSTS[warehouse][customer]`.
const COSTS: [[f64; 4]; 3] = [
    [250.0, 1606.0, 1550.0, 530.0],
    [300.0, 1792.0, 1531.0, 567.0],
    [285.0, 2322.0, 1324.0, 1236.0],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Decision {
    /// Warehouse `n` serves customer `m`.
    Assign { n: usize, m: usize },
    /// Warehouse `n` is open.
    Open(usize),
}

#[derive(Parser)]
#[command(name = "warehouse")]
#[command(about = "Solve the warehouse location problem for 1..=P warehouses", long_about = None)]
struct Cli {
    /// Largest number of warehouses to open
    #[arg(short = 'p', long, default_value_t = 4)]
    max_open: usize,

    /// List this many cheapest plans for each P
    #[arg(long, default_value_t = 1)]
    plans: u64,

    /// Enumerator configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

/// Builds the p-median model opening exactly `open` warehouses.
fn create_warehouse_model(open: usize) -> Result<Model<Decision>, Box<dyn Error>> {
    let mut model = Model::new(format!("warehouse-p{}", open));
    for n in 0..WAREHOUSES.len() {
        for m in 0..CUSTOMERS.len() {
            model.add_variable(Decision::Assign { n, m }, None)?;
        }
    }
    let mut open_vars = Vec::new();
    for n in 0..WAREHOUSES.len() {
        open_vars.push(model.add_variable(Decision::Open(n), None)?);
    }

    for m in 0..CUSTOMERS.len() {
        let served = model.sum_where(|d| matches!(d, Decision::Assign { m: c, .. } if *c == m));
        model.add_constraint(served, Comparison::Eq, 1.0)?;
    }

    let mut cost = LinearExpr::new();
    for (n, &open_var) in open_vars.iter().enumerate() {
        for m in 0..CUSTOMERS.len() {
            let assign = model
                .lookup(&Decision::Assign { n, m })
                .ok_or("assignment variable missing")?;
            // Only open warehouses serve customers.
            let link = LinearExpr::new().term(assign, 1.0).term(open_var, -1.0);
            model.add_constraint(link, Comparison::Le, 0.0)?;
            cost.add_term(assign, COSTS[n][m]);
        }
    }

    model.add_constraint(LinearExpr::sum(open_vars), Comparison::Eq, open as f64)?;
    model.set_objective(cost, ObjectiveSense::Minimize)?;
    Ok(model)
}

fn open_warehouses(model: &Model<Decision>, assignment: &Assignment) -> Vec<&'static str> {
    assignment
        .selected_keys(model)
        .filter_map(|d| match d {
            Decision::Open(n) => Some(WAREHOUSES[*n]),
            Decision::Assign { .. } => None,
        })
        .collect()
}

fn print_plan(model: &Model<Decision>, assignment: &Assignment) {
    let open = open_warehouses(model, assignment);
    for name in WAREHOUSES {
        println!("    y[{}] = {}", name, u8::from(open.contains(&name)));
    }
    for d in assignment.selected_keys(model) {
        if let Decision::Assign { n, m } = d {
            println!("    {} -> {}", WAREHOUSES[*n], CUSTOMERS[*m]);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = EnumeratorConfig::load(&cli.config).unwrap_or_default();

    for open in 1..=cli.max_open {
        let mut model = create_warehouse_model(open)?;

        if cli.plans <= 1 {
            let mut oracle = AnyOracle::from_config(&config);
            match oracle.solve(&model) {
                SolveResult::Optimal(assignment) => {
                    let cost = assignment.objective().unwrap_or_default();
                    println!("# of warehouse: {}, delivery cost: {}", open, cost);
                    print_plan(&model, &assignment);
                }
                SolveResult::Infeasible => {
                    println!("# of warehouse: {}, infeasible", open)
                }
                SolveResult::Error(reason) => return Err(reason.into()),
            }
            continue;
        }

        let plan_model = model.clone();
        let mut enumerator = Enumerator::new(AnyOracle::from_config(&config))
            .with_termination(SolutionCountTermination::new(cli.plans));
        let mut rank = 0;
        let report = enumerator.enumerate(&mut model, |assignment| {
            rank += 1;
            let cost = assignment.objective().unwrap_or_default();
            println!("# of warehouse: {}, plan #{}, delivery cost: {}", open, rank, cost);
            print_plan(&plan_model, assignment);
        });
        if let EnumerationStatus::Failed(e) = report.status {
            return Err(e.into());
        }
        if rank == 0 {
            println!("# of warehouse: {}, infeasible", open);
        }
    }
    Ok(())
}
