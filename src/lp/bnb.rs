//! Bundled branch-and-bound backend.
//!
//! # Algorithm
//!
//! 1. Normalize every constraint to `Σ aᵢxᵢ ≤ b` rows (`=` becomes two rows,
//!    `≥` is negated) and the objective to minimization.
//! 2. Depth-first search over variables. After each decision, bound
//!    propagation on the touched rows: with `slack = b − min_activity`, a row
//!    is violated when `slack < 0`, and any unassigned `xⱼ` with
//!    `|aⱼ| > slack` is forced to the value that keeps the row satisfiable.
//! 3. Prune when the objective lower bound (fixed part + negative unassigned
//!    costs + cheapest member of each open exactly-one group) cannot beat the
//!    incumbent.
//! 4. Exhausting the tree proves optimality (or infeasibility).
//!
//! # Portfolio
//!
//! With `num_workers > 1`, worker 0 branches on choice variables in
//! cheapest-first order, and every other worker uses a seeded shuffle of
//! that order. Workers share the incumbent bound and stop as soon as any of
//! them exhausts its tree. Workers run concurrently with the `parallel`
//! feature, one after another otherwise.
//!
//! # Complexity
//! Exponential in the worst case; per node O(Σ row length touched).

use log::{debug, trace, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{Duration, Instant};

use super::model::{Comparison, LinearModel, Sense};
use super::solver::{BinarySolver, Solution, SolverConfig, SolverStatus};

/// Nodes between two deadline / cancellation checks.
const CHECK_INTERVAL: u64 = 256;

/// Exact 0/1 solver using depth-first branch and bound.
///
/// # Example
/// ```
/// use u_timetable::lp::{BinarySolver, BranchAndBoundSolver, LinearModel, SolverConfig, SolverStatus};
///
/// let mut model = LinearModel::new("pick-cheapest");
/// let a = model.add_var("a");
/// let b = model.add_var("b");
/// model.add_exactly_one(&[a, b]);
/// model.add_objective_term(a, 5);
/// model.add_objective_term(b, 3);
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// assert!(solution.value(b));
/// assert_eq!(solution.objective_value, Some(3));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl BinarySolver for BranchAndBoundSolver {
    fn solve(&self, model: &LinearModel, config: &SolverConfig) -> Solution {
        let started = Instant::now();
        if let Err(err) = model.validate() {
            warn!("model '{}' is invalid: {err}", model.name);
            return Solution::empty(SolverStatus::ModelInvalid);
        }

        let problem = Problem::new(model);
        let deadline = started + Duration::from_millis(config.time_limit_ms);
        let shared = Shared {
            best: AtomicI64::new(i64::MAX),
            stop: AtomicBool::new(false),
        };
        let workers = config.num_workers.max(1);
        let run = |worker: usize| {
            Worker::new(&problem, problem.order_for(worker, config.seed)).run(
                &shared,
                deadline,
                config.stop_after_first,
            )
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<Outcome> = (0..workers).into_par_iter().map(run).collect();

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Outcome> = {
            let mut outcomes = Vec::with_capacity(workers);
            for worker in 0..workers {
                if shared.stop.load(Ordering::Relaxed) || Instant::now() >= deadline {
                    break;
                }
                outcomes.push(run(worker));
            }
            outcomes
        };

        let exhausted = outcomes.iter().any(|o| o.exhausted);
        let nodes: u64 = outcomes.iter().map(|o| o.nodes).sum();
        let best = outcomes
            .into_iter()
            .filter_map(|o| o.best)
            .min_by_key(|(objective, _)| *objective);

        let status = match (&best, exhausted) {
            (Some(_), true) => SolverStatus::Optimal,
            (Some(_), false) => SolverStatus::Feasible,
            (None, true) => SolverStatus::Infeasible,
            (None, false) => SolverStatus::Timeout,
        };
        let solve_time_ms = started.elapsed().as_millis() as u64;
        debug!(
            "model '{}': {:?} after {} nodes in {} ms ({} vars, {} rows)",
            model.name,
            status,
            nodes,
            solve_time_ms,
            problem.n,
            problem.rows.len()
        );

        match best {
            Some((objective, values)) => Solution {
                status,
                objective_value: Some(objective * problem.sign),
                values,
                solve_time_ms,
            },
            None => Solution {
                solve_time_ms,
                ..Solution::empty(status)
            },
        }
    }
}

/// `Σ aᵢxᵢ ≤ rhs`.
struct Row {
    terms: Vec<(usize, i64)>,
    rhs: i64,
    max_abs: i64,
}

impl Row {
    fn new(terms: Vec<(usize, i64)>, rhs: i64) -> Self {
        let max_abs = terms.iter().map(|(_, a)| a.abs()).max().unwrap_or(0);
        Self {
            terms,
            rhs,
            max_abs,
        }
    }

    fn negated(terms: Vec<(usize, i64)>, rhs: i64) -> Self {
        Self::new(terms.into_iter().map(|(v, a)| (v, -a)).collect(), -rhs)
    }
}

/// Normalized, read-only problem shared by all workers.
struct Problem {
    n: usize,
    rows: Vec<Row>,
    /// var → rows it appears in, with its coefficient there.
    watches: Vec<Vec<(usize, i64)>>,
    /// Minimization cost per variable.
    cost: Vec<i64>,
    /// +1 for minimization models, −1 for maximization.
    sign: i64,
    /// Disjoint exactly-one groups.
    groups: Vec<Vec<usize>>,
    grouped: Vec<bool>,
}

impl Problem {
    fn new(model: &LinearModel) -> Self {
        let n = model.var_count();
        let mut rows = Vec::new();
        let mut groups = Vec::new();
        let mut grouped = vec![false; n];

        for constraint in &model.constraints {
            let mut merged: BTreeMap<usize, i64> = BTreeMap::new();
            for &(var, coef) in &constraint.terms {
                *merged.entry(var.index()).or_insert(0) += coef;
            }
            let terms: Vec<(usize, i64)> = merged.into_iter().filter(|&(_, a)| a != 0).collect();

            let is_group = constraint.comparison == Comparison::Equal
                && constraint.rhs == 1
                && !terms.is_empty()
                && terms.iter().all(|&(v, a)| a == 1 && !grouped[v]);
            if is_group {
                for &(v, _) in &terms {
                    grouped[v] = true;
                }
                groups.push(terms.iter().map(|&(v, _)| v).collect());
            }

            match constraint.comparison {
                Comparison::LessEq => rows.push(Row::new(terms, constraint.rhs)),
                Comparison::GreaterEq => rows.push(Row::negated(terms, constraint.rhs)),
                Comparison::Equal => {
                    rows.push(Row::new(terms.clone(), constraint.rhs));
                    rows.push(Row::negated(terms, constraint.rhs));
                }
            }
        }

        let mut watches = vec![Vec::new(); n];
        for (r, row) in rows.iter().enumerate() {
            for &(v, a) in &row.terms {
                watches[v].push((r, a));
            }
        }

        let sign = match model.objective.sense {
            Sense::Minimize => 1,
            Sense::Maximize => -1,
        };
        let mut cost = vec![0i64; n];
        for &(var, coef) in &model.objective.terms {
            cost[var.index()] += coef * sign;
        }

        Self {
            n,
            rows,
            watches,
            cost,
            sign,
            groups,
            grouped,
        }
    }

    /// Branching order: choice variables first, then everything else.
    fn order_for(&self, worker: usize, seed: u64) -> Vec<usize> {
        let mut choices: Vec<usize> = (0..self.n).filter(|&v| self.grouped[v]).collect();
        if worker == 0 {
            choices.sort_by_key(|&v| self.cost[v]);
        } else {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(worker as u64));
            choices.shuffle(&mut rng);
        }
        choices.extend((0..self.n).filter(|&v| !self.grouped[v]));
        choices
    }

    fn preferred_value(&self, var: usize) -> bool {
        self.grouped[var] || self.cost[var] < 0
    }
}

/// Cross-worker state.
struct Shared {
    best: AtomicI64,
    stop: AtomicBool,
}

struct Outcome {
    best: Option<(i64, Vec<bool>)>,
    exhausted: bool,
    nodes: u64,
}

struct Frame {
    mark: usize,
    pos: usize,
    var: usize,
    value: bool,
    flipped: bool,
}

struct Worker<'a> {
    problem: &'a Problem,
    order: Vec<usize>,
    value: Vec<Option<bool>>,
    min_activity: Vec<i64>,
    objective_floor: i64,
    trail: Vec<usize>,
    best: Option<(i64, Vec<bool>)>,
}

impl<'a> Worker<'a> {
    fn new(problem: &'a Problem, order: Vec<usize>) -> Self {
        let min_activity: Vec<i64> = problem
            .rows
            .iter()
            .map(|row| row.terms.iter().map(|&(_, a)| a.min(0)).sum())
            .collect();
        let objective_floor: i64 = problem.cost.iter().map(|&c| c.min(0)).sum();
        Self {
            problem,
            order,
            value: vec![None; problem.n],
            min_activity,
            objective_floor,
            trail: Vec::with_capacity(problem.n),
            best: None,
        }
    }

    fn run(mut self, shared: &Shared, deadline: Instant, stop_after_first: bool) -> Outcome {
        let mut nodes: u64 = 0;
        let mut stack: Vec<Frame> = Vec::new();
        let mut exhausted = false;

        let all_rows: Vec<usize> = (0..self.problem.rows.len()).collect();
        if !self.propagate(all_rows) {
            shared.stop.store(true, Ordering::Relaxed);
            return Outcome {
                best: None,
                exhausted: true,
                nodes,
            };
        }

        'search: loop {
            nodes += 1;
            if nodes % CHECK_INTERVAL == 0
                && (shared.stop.load(Ordering::Relaxed) || Instant::now() >= deadline)
            {
                break;
            }

            let limit = shared
                .best
                .load(Ordering::Relaxed)
                .min(self.best.as_ref().map_or(i64::MAX, |(obj, _)| *obj));

            let conflict = if self.lower_bound() >= limit {
                true
            } else {
                let start = stack.last().map_or(0, |f| f.pos);
                match self.next_unassigned(start) {
                    None => {
                        self.record_incumbent(shared);
                        if stop_after_first {
                            shared.stop.store(true, Ordering::Relaxed);
                            break;
                        }
                        true
                    }
                    Some(pos) => {
                        let var = self.order[pos];
                        let value = self.problem.preferred_value(var);
                        stack.push(Frame {
                            mark: self.trail.len(),
                            pos,
                            var,
                            value,
                            flipped: false,
                        });
                        !self.decide(var, value)
                    }
                }
            };

            if conflict {
                loop {
                    let Some(frame) = stack.pop() else {
                        exhausted = true;
                        break 'search;
                    };
                    self.undo_to(frame.mark);
                    if !frame.flipped {
                        let (var, value) = (frame.var, !frame.value);
                        stack.push(Frame {
                            value,
                            flipped: true,
                            ..frame
                        });
                        if self.decide(var, value) {
                            break;
                        }
                    }
                }
            }
        }

        if exhausted {
            shared.stop.store(true, Ordering::Relaxed);
        }
        Outcome {
            best: self.best,
            exhausted,
            nodes,
        }
    }

    fn next_unassigned(&self, start: usize) -> Option<usize> {
        (start..self.order.len()).find(|&pos| self.value[self.order[pos]].is_none())
    }

    fn record_incumbent(&mut self, shared: &Shared) {
        // every variable is fixed, so the floor is the exact objective
        let objective = self.objective_floor;
        let improves = self.best.as_ref().map_or(true, |(obj, _)| objective < *obj);
        if improves {
            trace!("incumbent {objective}");
            let values = self.value.iter().map(|v| v.unwrap_or(false)).collect();
            self.best = Some((objective, values));
            shared.best.fetch_min(objective, Ordering::Relaxed);
        }
    }

    fn lower_bound(&self) -> i64 {
        let problem = self.problem;
        let mut bound = self.objective_floor;
        for group in &problem.groups {
            if group.iter().any(|&v| self.value[v] == Some(true)) {
                continue;
            }
            if let Some(cheapest) = group
                .iter()
                .filter(|&&v| self.value[v].is_none())
                .map(|&v| problem.cost[v].max(0))
                .min()
            {
                bound += cheapest;
            }
        }
        bound
    }

    fn decide(&mut self, var: usize, value: bool) -> bool {
        self.assign(var, value);
        let rows = self.problem.watches[var].iter().map(|&(r, _)| r).collect();
        self.propagate(rows)
    }

    fn propagate(&mut self, mut queue: Vec<usize>) -> bool {
        let problem = self.problem;
        while let Some(r) = queue.pop() {
            let row = &problem.rows[r];
            let slack = row.rhs - self.min_activity[r];
            if slack < 0 {
                return false;
            }
            if slack >= row.max_abs {
                continue;
            }
            for &(var, coef) in &row.terms {
                if self.value[var].is_none() && coef.abs() > slack {
                    // the forced value leaves this row's minimum unchanged
                    self.assign(var, coef < 0);
                    queue.extend(problem.watches[var].iter().map(|&(r2, _)| r2));
                }
            }
        }
        true
    }

    fn assign(&mut self, var: usize, value: bool) {
        let problem = self.problem;
        self.value[var] = Some(value);
        self.trail.push(var);
        for &(r, a) in &problem.watches[var] {
            if (a > 0 && value) || (a < 0 && !value) {
                self.min_activity[r] += a.abs();
            }
        }
        let c = problem.cost[var];
        if (c > 0 && value) || (c < 0 && !value) {
            self.objective_floor += c.abs();
        }
    }

    fn undo_to(&mut self, mark: usize) {
        let problem = self.problem;
        while self.trail.len() > mark {
            let Some(var) = self.trail.pop() else { break };
            let Some(value) = self.value[var].take() else { continue };
            for &(r, a) in &problem.watches[var] {
                if (a > 0 && value) || (a < 0 && !value) {
                    self.min_activity[r] -= a.abs();
                }
            }
            let c = problem.cost[var];
            if (c > 0 && value) || (c < 0 && !value) {
                self.objective_floor -= c.abs();
            }
        }
    }
}
