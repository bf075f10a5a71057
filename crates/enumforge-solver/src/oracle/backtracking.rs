//! Embedded depth-first oracle for binary linear models.
//!
//! Search assigns one free variable per node and propagates activity bounds
//! through every linear row it touches. A row `Σ c·x <op> b` keeps the
//! smallest and largest activity still reachable; a row whose bounds exclude
//! `b` is a conflict, and a row that would be broken by one value of an
//! unassigned variable forces the other value.
//!
//! With an objective the search continues past the first leaf and prunes
//! nodes whose activity lower bound cannot beat the incumbent.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use enumforge_core::{Assignment, Comparison, Model, ObjectiveSense, VariableKey};

use super::{Oracle, SolveResult};

const TOLERANCE: f64 = 1e-9;

/// Nodes between two deadline checks.
const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Built-in depth-first oracle.
///
/// # Example
///
/// ```
/// use enumforge_core::{Comparison, LinearExpr, Model};
/// use enumforge_solver::oracle::{BacktrackingOracle, Oracle, SolveResult};
///
/// let mut model = Model::new("pick-one");
/// let a = model.add_variable("a", None).unwrap();
/// let b = model.add_variable("b", None).unwrap();
/// model.add_constraint(LinearExpr::sum([a, b]), Comparison::Eq, 1.0).unwrap();
///
/// let mut oracle = BacktrackingOracle::new();
/// match oracle.solve(&model) {
///     SolveResult::Optimal(assignment) => assert!(model.is_satisfied_by(&assignment)),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BacktrackingOracle {
    node_limit: Option<u64>,
    time_limit: Option<Duration>,
    rng: Option<ChaCha8Rng>,
}

impl BacktrackingOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails a solve with `Error("node limit reached")` after `limit` nodes.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Fails a solve with `Error("timeout")` once `limit` has elapsed.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Randomizes which value is tried first at each branch.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(ChaCha8Rng::seed_from_u64(seed));
        self
    }
}

impl Oracle for BacktrackingOracle {
    fn solve<K: VariableKey>(&mut self, model: &Model<K>) -> SolveResult {
        let start = Instant::now();
        let mut search = Search::new(model);
        let deadline = self.time_limit.and_then(|limit| start.checked_add(limit));
        let outcome = search.run(self.node_limit, deadline, self.rng.as_mut());

        debug!(
            event = "oracle_solve",
            oracle = "backtracking",
            nodes = search.nodes,
            duration_ms = start.elapsed().as_millis() as u64,
        );

        match outcome {
            SearchOutcome::Exhausted => match search.incumbent.take() {
                Some(values) => {
                    let assignment = Assignment::new(values);
                    match model.objective_value(&assignment) {
                        Some(objective) => {
                            SolveResult::Optimal(assignment.with_objective(objective))
                        }
                        None => SolveResult::Optimal(assignment),
                    }
                }
                None => SolveResult::Infeasible,
            },
            SearchOutcome::Found => {
                let values = search.incumbent.take().unwrap_or_default();
                SolveResult::Optimal(Assignment::new(values))
            }
            SearchOutcome::NodeLimit => SolveResult::Error("node limit reached".to_string()),
            SearchOutcome::Timeout => SolveResult::Error("timeout".to_string()),
        }
    }

    fn oracle_name(&self) -> &'static str {
        "Backtracking"
    }
}

enum SearchOutcome {
    /// A feasibility model produced its first leaf.
    Found,
    /// The whole tree was explored.
    Exhausted,
    NodeLimit,
    Timeout,
}

/// One linear row `Σ c·x <op> rhs` with merged coefficients.
struct Row {
    terms: Vec<(usize, f64)>,
    comparison: Comparison,
    rhs: f64,
    min_activity: f64,
    max_activity: f64,
    unassigned: usize,
}

impl Row {
    fn new(mut terms: Vec<(usize, f64)>, comparison: Comparison, rhs: f64) -> Self {
        terms.sort_by_key(|(var, _)| *var);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(terms.len());
        for (var, coef) in terms {
            if let Some((last, acc)) = merged.last_mut() {
                if *last == var {
                    *acc += coef;
                    continue;
                }
            }
            merged.push((var, coef));
        }
        merged.retain(|(_, coef)| *coef != 0.0);

        let min_activity = merged.iter().map(|(_, c)| c.min(0.0)).sum();
        let max_activity = merged.iter().map(|(_, c)| c.max(0.0)).sum();
        let unassigned = merged.len();
        Self {
            terms: merged,
            comparison,
            rhs,
            min_activity,
            max_activity,
            unassigned,
        }
    }

    fn bounds_upper(&self) -> bool {
        matches!(self.comparison, Comparison::Le | Comparison::Eq)
    }

    fn bounds_lower(&self) -> bool {
        matches!(self.comparison, Comparison::Ge | Comparison::Eq)
    }

    fn is_conflicting(&self) -> bool {
        (self.bounds_upper() && self.min_activity > self.rhs + TOLERANCE)
            || (self.bounds_lower() && self.max_activity < self.rhs - TOLERANCE)
    }

    /// Returns the value `var` must take for this row to stay satisfiable.
    fn forced_value(&self, coef: f64) -> Option<bool> {
        if self.bounds_upper() {
            // Raising the minimum by |coef| would overshoot.
            if coef > 0.0 && self.min_activity + coef > self.rhs + TOLERANCE {
                return Some(false);
            }
            if coef < 0.0 && self.min_activity - coef > self.rhs + TOLERANCE {
                return Some(true);
            }
        }
        if self.bounds_lower() {
            if coef > 0.0 && self.max_activity - coef < self.rhs - TOLERANCE {
                return Some(true);
            }
            if coef < 0.0 && self.max_activity + coef < self.rhs - TOLERANCE {
                return Some(false);
            }
        }
        None
    }
}

struct Frame {
    var: usize,
    alternative: Option<bool>,
    trail_len: usize,
}

struct Search {
    values: Vec<Option<bool>>,
    rows: Vec<Row>,
    /// For each variable, the rows it appears in with its coefficient.
    occurrences: Vec<Vec<(usize, f64)>>,
    /// Objective coefficients in minimization form.
    objective: Option<Vec<f64>>,
    objective_bound: f64,
    trail: Vec<usize>,
    queue: Vec<usize>,
    queued: Vec<bool>,
    incumbent: Option<Vec<bool>>,
    incumbent_value: f64,
    nodes: u64,
}

impl Search {
    fn new<K: VariableKey>(model: &Model<K>) -> Self {
        let n = model.variable_count();
        let mut rows = Vec::with_capacity(model.constraint_count());
        let mut occurrences = vec![Vec::new(); n];

        for (_, constraint) in model.all_constraints() {
            let terms = constraint
                .expr()
                .terms()
                .iter()
                .map(|(var, coef)| (var.index(), *coef))
                .collect();
            let row = Row::new(terms, constraint.comparison(), constraint.normalized_rhs());
            let row_index = rows.len();
            for &(var, coef) in &row.terms {
                occurrences[var].push((row_index, coef));
            }
            rows.push(row);
        }

        let objective = model.objective().map(|objective| {
            let sign = match objective.sense {
                ObjectiveSense::Minimize => 1.0,
                ObjectiveSense::Maximize => -1.0,
            };
            let mut coefs = vec![0.0; n];
            for (var, coef) in objective.expr.terms() {
                coefs[var.index()] += sign * coef;
            }
            coefs
        });
        let objective_bound = objective
            .as_ref()
            .map(|c| c.iter().map(|c| c.min(0.0)).sum())
            .unwrap_or(0.0);

        let queued = vec![false; rows.len()];
        let mut search = Self {
            values: vec![None; n],
            rows,
            occurrences,
            objective,
            objective_bound,
            trail: Vec::with_capacity(n),
            queue: Vec::new(),
            queued,
            incumbent: None,
            incumbent_value: f64::INFINITY,
            nodes: 0,
        };

        for row in 0..search.rows.len() {
            search.enqueue(row);
        }
        for (id, variable) in model.variables() {
            if let Some(value) = variable.fixed_value() {
                search.assign(id.index(), value);
            }
        }
        search
    }

    fn run(
        &mut self,
        node_limit: Option<u64>,
        deadline: Option<Instant>,
        mut rng: Option<&mut ChaCha8Rng>,
    ) -> SearchOutcome {
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let consistent = self.propagate() && !self.is_dominated();

            if consistent {
                match self.choose_variable() {
                    None => {
                        let leaf: Vec<bool> =
                            self.values.iter().map(|v| v.unwrap_or(false)).collect();
                        if self.objective.is_none() {
                            self.incumbent = Some(leaf);
                            return SearchOutcome::Found;
                        }
                        // At a leaf the bound is the exact objective.
                        trace!(objective = self.objective_bound, "Improved incumbent");
                        self.incumbent_value = self.objective_bound;
                        self.incumbent = Some(leaf);
                    }
                    Some(var) => {
                        self.nodes += 1;
                        if node_limit.is_some_and(|limit| self.nodes > limit) {
                            return SearchOutcome::NodeLimit;
                        }
                        if self.nodes % CLOCK_CHECK_INTERVAL == 0
                            && deadline.is_some_and(|d| Instant::now() >= d)
                        {
                            return SearchOutcome::Timeout;
                        }

                        let first = self.preferred_value(var, rng.as_deref_mut());
                        stack.push(Frame {
                            var,
                            alternative: Some(!first),
                            trail_len: self.trail.len(),
                        });
                        self.assign(var, first);
                        continue;
                    }
                }
            }

            // Backtrack to the most recent frame with an untried value.
            loop {
                let Some(frame) = stack.pop() else {
                    return SearchOutcome::Exhausted;
                };
                self.undo_to(frame.trail_len);
                if let Some(value) = frame.alternative {
                    stack.push(Frame {
                        var: frame.var,
                        alternative: None,
                        trail_len: frame.trail_len,
                    });
                    self.assign(frame.var, value);
                    break;
                }
            }
        }
    }

    fn enqueue(&mut self, row: usize) {
        if !self.queued[row] {
            self.queued[row] = true;
            self.queue.push(row);
        }
    }

    fn clear_queue(&mut self) {
        for row in self.queue.drain(..) {
            self.queued[row] = false;
        }
    }

    fn assign(&mut self, var: usize, value: bool) {
        debug_assert!(self.values[var].is_none());
        self.values[var] = Some(value);
        self.trail.push(var);

        for i in 0..self.occurrences[var].len() {
            let (row_index, coef) = self.occurrences[var][i];
            let row = &mut self.rows[row_index];
            if value {
                row.min_activity += coef.max(0.0);
                row.max_activity += coef.min(0.0);
            } else {
                row.min_activity -= coef.min(0.0);
                row.max_activity -= coef.max(0.0);
            }
            row.unassigned -= 1;
            self.enqueue(row_index);
        }

        if let Some(coefs) = &self.objective {
            let coef = coefs[var];
            if value {
                self.objective_bound += coef.max(0.0);
            } else {
                self.objective_bound -= coef.min(0.0);
            }
        }
    }

    fn unassign(&mut self, var: usize) {
        let Some(value) = self.values[var].take() else {
            return;
        };
        for &(row_index, coef) in &self.occurrences[var] {
            let row = &mut self.rows[row_index];
            if value {
                row.min_activity -= coef.max(0.0);
                row.max_activity -= coef.min(0.0);
            } else {
                row.min_activity += coef.min(0.0);
                row.max_activity += coef.max(0.0);
            }
            row.unassigned += 1;
        }
        if let Some(coefs) = &self.objective {
            let coef = coefs[var];
            if value {
                self.objective_bound -= coef.max(0.0);
            } else {
                self.objective_bound += coef.min(0.0);
            }
        }
    }

    fn undo_to(&mut self, trail_len: usize) {
        while self.trail.len() > trail_len {
            if let Some(var) = self.trail.pop() {
                self.unassign(var);
            }
        }
        self.clear_queue();
    }

    /// Runs bound propagation to a fixpoint; false on conflict.
    fn propagate(&mut self) -> bool {
        while let Some(row_index) = self.queue.pop() {
            self.queued[row_index] = false;
            if self.rows[row_index].is_conflicting() {
                self.clear_queue();
                return false;
            }
            if self.rows[row_index].unassigned == 0 {
                continue;
            }
            for i in 0..self.rows[row_index].terms.len() {
                let (var, coef) = self.rows[row_index].terms[i];
                if self.values[var].is_some() {
                    continue;
                }
                if let Some(value) = self.rows[row_index].forced_value(coef) {
                    self.assign(var, value);
                    if self.rows[row_index].is_conflicting() {
                        self.clear_queue();
                        return false;
                    }
                }
            }
        }
        true
    }

    /// True if the incumbent cannot be improved below this node.
    fn is_dominated(&self) -> bool {
        self.incumbent.is_some() && self.objective_bound >= self.incumbent_value - TOLERANCE
    }

    /// Picks the first unassigned variable of the row with the fewest
    /// unassigned variables; falls back to the lowest unassigned index.
    fn choose_variable(&self) -> Option<usize> {
        let tightest = self
            .rows
            .iter()
            .filter(|row| row.unassigned > 0)
            .min_by_key(|row| row.unassigned);
        if let Some(row) = tightest {
            return row
                .terms
                .iter()
                .map(|(var, _)| *var)
                .find(|var| self.values[*var].is_none());
        }
        self.values.iter().position(Option::is_none)
    }

    fn preferred_value(&self, var: usize, rng: Option<&mut ChaCha8Rng>) -> bool {
        if let Some(rng) = rng {
            return rng.random_bool(0.5);
        }
        match &self.objective {
            Some(coefs) => coefs[var] < 0.0,
            None => true,
        }
    }
}
