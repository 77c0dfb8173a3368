//! Solver interface.

use serde::{Deserialize, Serialize};

use super::model::{LinearModel, VarId};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible solution found; optimality not proven (e.g. time limit hit
    /// with an incumbent).
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Time limit hit before any feasible solution was found.
    Timeout,
}

/// Result of one solver call.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective value of `values` (if a solution was found).
    pub objective_value: Option<i64>,
    /// Variable assignment indexed by [`VarId`]; empty without a solution.
    pub values: Vec<bool>,
    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl Solution {
    /// Creates a solution without an assignment.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
        }
    }

    /// Whether a usable assignment is present.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Value of a variable; `false` when absent.
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: u64,
    /// Number of search workers (a hint; backends may ignore it).
    pub num_workers: usize,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
    /// Seed for any randomized search component.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 30_000,
            num_workers: 4,
            stop_after_first: false,
            seed: 42,
        }
    }
}

/// Trait for 0/1 solver implementations.
///
/// A call blocks until the model is solved, proven infeasible, or the
/// time limit expires. On timeout an implementation returns its best
/// incumbent as [`SolverStatus::Feasible`], or [`SolverStatus::Timeout`]
/// if it has none.
pub trait BinarySolver {
    /// Solves the model.
    fn solve(&self, model: &LinearModel, config: &SolverConfig) -> Solution;
}

impl<S: BinarySolver + ?Sized> BinarySolver for &S {
    fn solve(&self, model: &LinearModel, config: &SolverConfig) -> Solution {
        (**self).solve(model, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_found() {
        let mut solution = Solution::empty(SolverStatus::Feasible);
        solution.values = vec![true, false];
        assert!(solution.is_solution_found());
        assert!(solution.value(VarId(0)));
        assert!(!solution.value(VarId(1)));
        assert!(!solution.value(VarId(9)));

        solution.status = SolverStatus::Timeout;
        assert!(!solution.is_solution_found());
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, 30_000);
        assert_eq!(config.num_workers, 4);
        assert!(!config.stop_after_first);
    }
}
