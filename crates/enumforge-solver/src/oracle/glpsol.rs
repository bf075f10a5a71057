//! GLPK `glpsol` oracle.
//!
//! Each solve writes the model as an LP file into a fresh temporary
//! directory, runs `glpsol --lp model.lp -w solution.txt`, and reads back
//! GLPK's plain-text MIP solution:
//!
//! ```text
//! c Problem:
//! s mip 3 4 o 0
//! i 1 1
//! j 1 1
//! j 2 0
//! e o f
//! ```
//!
//! The `s` line carries the status (`o` optimal, `f` feasible, `n` no
//! feasible solution, `u` undefined); `j <col> <value>` lines carry column
//! values in LP column order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use enumforge_core::{Assignment, Model, VariableKey};

use super::lp::write_lp;
use super::{Oracle, SolveResult};

/// Grace period past `--tmlim` before the child is killed.
const KILL_GRACE: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

const NO_FEASIBLE_MARKERS: [&str; 2] = [
    "PROBLEM HAS NO PRIMAL FEASIBLE SOLUTION",
    "PROBLEM HAS NO INTEGER FEASIBLE SOLUTION",
];

/// Oracle backed by an external `glpsol` executable.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use enumforge_solver::oracle::GlpsolOracle;
///
/// let oracle = GlpsolOracle::new("glpsol").with_time_limit(Duration::from_secs(10));
/// assert_eq!(oracle.command(), "glpsol");
/// ```
#[derive(Debug, Clone)]
pub struct GlpsolOracle {
    command: String,
    time_limit: Option<Duration>,
}

impl GlpsolOracle {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            time_limit: None,
        }
    }

    /// Passes `--tmlim` to glpsol and kills the process shortly after.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn run<K: VariableKey>(&self, model: &Model<K>) -> Result<SolveResult, String> {
        let work_dir = tempfile::Builder::new()
            .prefix("enumforge-")
            .tempdir()
            .map_err(|e| format!("cannot create work directory: {}", e))?;
        let lp_path = work_dir.path().join("model.lp");
        let solution_path = work_dir.path().join("solution.txt");
        let log_path = work_dir.path().join("glpsol.log");

        write_model(model, &lp_path).map_err(|e| format!("cannot write LP file: {}", e))?;

        let log = File::create(&log_path).map_err(|e| format!("cannot create log: {}", e))?;
        let log_err = log
            .try_clone()
            .map_err(|e| format!("cannot create log: {}", e))?;

        let mut command = Command::new(&self.command);
        command
            .arg("--lp")
            .arg(&lp_path)
            .arg("-w")
            .arg(&solution_path)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));
        if let Some(limit) = self.time_limit {
            command.arg("--tmlim").arg(limit.as_secs().max(1).to_string());
        }

        let child = command
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", self.command, e))?;
        let status = self.wait(child)?;
        let log_text = std::fs::read_to_string(&log_path).unwrap_or_default();

        if !status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.command,
                status,
                last_line(&log_text)
            ));
        }
        if NO_FEASIBLE_MARKERS.iter().any(|m| log_text.contains(m)) {
            return Ok(SolveResult::Infeasible);
        }
        if log_text.contains("TIME LIMIT EXCEEDED") {
            return Err("timeout".to_string());
        }

        let solution_text = std::fs::read_to_string(&solution_path)
            .map_err(|e| format!("cannot read solution file: {}", e))?;
        let solution = parse_solution(&solution_text)?;
        interpret(model, solution)
    }

    fn wait(&self, mut child: Child) -> Result<ExitStatus, String> {
        let Some(limit) = self.time_limit else {
            return child
                .wait()
                .map_err(|e| format!("failed to wait for {}: {}", self.command, e));
        };
        let Some(deadline) = Instant::now()
            .checked_add(limit)
            .and_then(|d| d.checked_add(KILL_GRACE))
        else {
            return child
                .wait()
                .map_err(|e| format!("failed to wait for {}: {}", self.command, e));
        };
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    warn!(command = %self.command, "Killing oracle process after time limit");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err("timeout".to_string());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(format!("failed to wait for {}: {}", self.command, e)),
            }
        }
    }
}

impl Default for GlpsolOracle {
    fn default() -> Self {
        Self::new("glpsol")
    }
}

impl Oracle for GlpsolOracle {
    fn solve<K: VariableKey>(&mut self, model: &Model<K>) -> SolveResult {
        let start = Instant::now();
        let result = self.run(model).unwrap_or_else(SolveResult::Error);
        debug!(
            event = "oracle_solve",
            oracle = "glpsol",
            status = result.status_name(),
            duration_ms = start.elapsed().as_millis() as u64,
        );
        result
    }

    fn oracle_name(&self) -> &'static str {
        "Glpsol"
    }
}

fn write_model<K: VariableKey>(model: &Model<K>, path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_lp(model, &mut out)?;
    out.flush()
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
}

/// A MIP solution as written by `glpsol -w`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GlpkSolution {
    pub status: char,
    pub columns: Vec<f64>,
}

/// Parses GLPK's plain-text MIP solution format.
pub(crate) fn parse_solution(text: &str) -> Result<GlpkSolution, String> {
    let mut status = None;
    let mut columns: Vec<f64> = Vec::new();

    for line in text.lines() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("s") => {
                let kind = fields.next();
                if kind != Some("mip") {
                    return Err(format!("expected a MIP solution, found {:?}", kind));
                }
                let cols: usize = fields
                    .nth(1)
                    .and_then(|f| f.parse().ok())
                    .ok_or_else(|| format!("malformed status line: {}", line))?;
                let stat = fields
                    .next()
                    .and_then(|f| f.chars().next())
                    .ok_or_else(|| format!("malformed status line: {}", line))?;
                status = Some(stat);
                columns = vec![0.0; cols];
            }
            Some("j") => {
                let col: usize = fields
                    .next()
                    .and_then(|f| f.parse().ok())
                    .ok_or_else(|| format!("malformed column line: {}", line))?;
                let value: f64 = fields
                    .next()
                    .and_then(|f| f.parse().ok())
                    .ok_or_else(|| format!("malformed column line: {}", line))?;
                let slot = col
                    .checked_sub(1)
                    .and_then(|i| columns.get_mut(i))
                    .ok_or_else(|| format!("column {} out of range", col))?;
                *slot = value;
            }
            _ => {}
        }
    }

    let status = status.ok_or_else(|| "solution file has no status line".to_string())?;
    Ok(GlpkSolution { status, columns })
}

fn interpret<K: VariableKey>(
    model: &Model<K>,
    solution: GlpkSolution,
) -> Result<SolveResult, String> {
    match solution.status {
        'o' | 'f' => {}
        'n' => return Ok(SolveResult::Infeasible),
        other => return Err(format!("glpsol reported solution status '{}'", other)),
    }
    if solution.columns.len() != model.variable_count() {
        return Err(format!(
            "glpsol returned {} columns for {} variables",
            solution.columns.len(),
            model.variable_count()
        ));
    }
    let values: Vec<bool> = solution.columns.iter().map(|v| *v >= 0.5).collect();
    let assignment = Assignment::new(values);
    Ok(match model.objective_value(&assignment) {
        Some(objective) => SolveResult::Optimal(assignment.with_objective(objective)),
        None => SolveResult::Optimal(assignment),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumforge_core::{Comparison, LinearExpr};

    #[test]
    fn test_parse_optimal_solution() {
        let text = "c Problem:\nc Rows: 1\ns mip 1 3 o 2\ni 1 1\nj 1 1\nj 2 0\nj 3 1\ne o f\n";
        let solution = parse_solution(text).unwrap();
        assert_eq!(solution.status, 'o');
        assert_eq!(solution.columns, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_parse_rejects_lp_solution() {
        let err = parse_solution("s bas 1 2 f f 0\n").unwrap_err();
        assert!(err.contains("MIP"));
    }

    #[test]
    fn test_parse_requires_status_line() {
        assert!(parse_solution("c nothing here\n").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_column() {
        assert!(parse_solution("s mip 0 1 o 0\nj 2 1\n").is_err());
    }

    #[test]
    fn test_interpret_statuses() {
        let mut model = Model::new("pair");
        let a = model.add_variable("a", None).unwrap();
        let b = model.add_variable("b", None).unwrap();
        model
            .add_constraint(LinearExpr::sum([a, b]), Comparison::Eq, 1.0)
            .unwrap();

        let optimal = GlpkSolution {
            status: 'o',
            columns: vec![0.0, 1.0],
        };
        assert_eq!(
            interpret(&model, optimal).unwrap(),
            SolveResult::Optimal(Assignment::new(vec![false, true]))
        );

        let none = GlpkSolution {
            status: 'n',
            columns: vec![0.0, 0.0],
        };
        assert_eq!(interpret(&model, none).unwrap(), SolveResult::Infeasible);

        let undefined = GlpkSolution {
            status: 'u',
            columns: vec![0.0, 0.0],
        };
        assert!(interpret(&model, undefined).is_err());

        let short = GlpkSolution {
            status: 'o',
            columns: vec![1.0],
        };
        assert!(interpret(&model, short).is_err());
    }

    #[test]
    fn test_missing_executable_is_an_error() {
        let mut model = Model::new("single");
        model.add_variable(0u8, None).unwrap();

        let mut oracle = GlpsolOracle::new("enumforge-no-such-glpsol");
        match oracle.solve(&model) {
            SolveResult::Error(reason) => assert!(reason.contains("failed to start")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(unix)]
    mod process {
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use std::time::{Duration, Instant};

        use enumforge_core::{Comparison, LinearExpr, Model, ObjectiveSense};

        use super::super::*;

        /// Reads the `--lp` and `-w` paths into `$lp` and `$out`.
        const READ_ARGS: &str = r#"while [ "$#" -gt 0 ]; do
  case "$1" in
    --lp) lp="$2" ;;
    -w) out="$2" ;;
  esac
  shift
done"#;

        /// Writes an executable stand-in for `glpsol` running `body`.
        fn fake_glpsol(dir: &Path, body: &str) -> String {
            let path = dir.join("glpsol");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n{}\n", READ_ARGS, body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        fn pick_one() -> Model<&'static str> {
            let mut model = Model::new("pick-one");
            let a = model.add_variable("a", None).unwrap();
            let b = model.add_variable("b", None).unwrap();
            model
                .add_constraint(LinearExpr::sum([a, b]), Comparison::Eq, 1.0)
                .unwrap();
            model
                .set_objective(
                    LinearExpr::new().term(a, 2.0).term(b, 3.0),
                    ObjectiveSense::Minimize,
                )
                .unwrap();
            model
        }

        #[test]
        fn test_reads_solution_file() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_glpsol(
                dir.path(),
                r#"grep -q "Binaries" "$lp" || exit 3
printf 'c Problem:\ns mip 1 2 o 2\ni 1 1\nj 1 1\nj 2 0\ne o f\n' > "$out""#,
            );

            match GlpsolOracle::new(command).solve(&pick_one()) {
                SolveResult::Optimal(assignment) => {
                    assert_eq!(assignment.values(), &[true, false]);
                    assert_eq!(assignment.objective(), Some(2.0));
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn test_no_feasible_solution_in_log() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_glpsol(
                dir.path(),
                "echo 'PROBLEM HAS NO INTEGER FEASIBLE SOLUTION'",
            );

            assert_eq!(
                GlpsolOracle::new(command).solve(&pick_one()),
                SolveResult::Infeasible
            );
        }

        #[test]
        fn test_time_limit_in_log() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_glpsol(dir.path(), "echo 'TIME LIMIT EXCEEDED; SEARCH TERMINATED'");

            assert_eq!(
                GlpsolOracle::new(command).solve(&pick_one()),
                SolveResult::Error("timeout".to_string())
            );
        }

        #[test]
        fn test_nonzero_exit_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_glpsol(dir.path(), "echo 'model.lp:3: syntax error' >&2\nexit 1");

            match GlpsolOracle::new(command).solve(&pick_one()) {
                SolveResult::Error(reason) => {
                    assert!(reason.contains("exited with"));
                    assert!(reason.contains("syntax error"));
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn test_hung_process_is_killed() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_glpsol(dir.path(), "exec sleep 30");

            let start = Instant::now();
            let result = GlpsolOracle::new(command)
                .with_time_limit(Duration::from_secs(1))
                .solve(&pick_one());

            assert_eq!(result, SolveResult::Error("timeout".to_string()));
            assert!(start.elapsed() < Duration::from_secs(20));
        }
    }
}
