//! CPLEX LP serialization of binary models.
//!
//! Variables are written as `x<i>`, problem constraints as `c<i>` and cuts as
//! `cut<i>`. The objective lists every variable in index order, with zero
//! coefficients where needed, so a reader that numbers columns by first
//! appearance numbers `x<i>` as column `i + 1`. Fixed variables become
//! equality bounds; every variable is declared binary.
//!
//! ```text
//! \ Model: pick-one
//! Minimize
//!  obj: + 0 x0 + 0 x1
//! Subject To
//!  c0: + x0 + x1 = 1
//!  cut0: - x0 + x1 >= 0
//! Bounds
//!  x1 = 0
//! Binaries
//!  x0 x1
//! End
//! ```

use std::io::{self, Write};

use enumforge_core::{LinearExpr, Model, ObjectiveSense, VariableKey};

/// Terms per line before wrapping.
const TERMS_PER_LINE: usize = 8;

/// Writes `model` in CPLEX LP format.
pub fn write_lp<K: VariableKey, W: Write>(model: &Model<K>, out: &mut W) -> io::Result<()> {
    writeln!(out, "\\ Model: {}", sanitize_comment(model.name()))?;

    let sense = match model.objective().map(|o| o.sense) {
        Some(ObjectiveSense::Maximize) => "Maximize",
        _ => "Minimize",
    };
    writeln!(out, "{}", sense)?;
    write!(out, " obj:")?;
    write_terms(model, &dense_objective(model), out)?;
    writeln!(out)?;

    writeln!(out, "Subject To")?;
    for (id, constraint) in model.all_constraints() {
        write!(out, " {}:", id)?;
        write_terms(model, constraint.expr(), out)?;
        writeln!(
            out,
            " {} {}",
            constraint.comparison(),
            format_number(constraint.normalized_rhs())
        )?;
    }

    let fixed: Vec<_> = model
        .variables()
        .filter_map(|(id, v)| v.fixed_value().map(|value| (id, value)))
        .collect();
    if !fixed.is_empty() {
        writeln!(out, "Bounds")?;
        for (id, value) in fixed {
            writeln!(out, " {} = {}", id, u8::from(value))?;
        }
    }

    if model.variable_count() > 0 {
        writeln!(out, "Binaries")?;
        for (i, (id, _)) in model.variables().enumerate() {
            if i > 0 && i % TERMS_PER_LINE == 0 {
                writeln!(out)?;
            }
            write!(out, " {}", id)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "End")
}

/// Renders `model` as an LP string.
pub fn to_lp_string<K: VariableKey>(model: &Model<K>) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_lp(model, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// The objective over every variable in index order.
fn dense_objective<K: VariableKey>(model: &Model<K>) -> LinearExpr {
    let mut coefs = vec![0.0; model.variable_count()];
    if let Some(objective) = model.objective() {
        for (var, coef) in objective.expr.terms() {
            coefs[var.index()] += coef;
        }
    }
    model
        .variables()
        .fold(LinearExpr::new(), |expr, (id, _)| expr.term(id, coefs[id.index()]))
}

fn write_terms<K: VariableKey, W: Write>(
    model: &Model<K>,
    expr: &LinearExpr,
    out: &mut W,
) -> io::Result<()> {
    if expr.is_empty() {
        // LP rows need at least one term.
        if model.variable_count() > 0 {
            write!(out, " 0 x0")?;
        }
        return Ok(());
    }
    for (i, (var, coef)) in expr.terms().iter().enumerate() {
        if i > 0 && i % TERMS_PER_LINE == 0 {
            write!(out, "\n   ")?;
        }
        let sign = if *coef < 0.0 { "-" } else { "+" };
        let magnitude = coef.abs();
        if magnitude == 1.0 {
            write!(out, " {} {}", sign, var)?;
        } else {
            write!(out, " {} {} {}", sign, format_number(magnitude), var)?;
        }
    }
    Ok(())
}

fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn sanitize_comment(name: &str) -> String {
    name.replace(['\n', '\r'], " ")
}
