//! 0/1 linear programming interface.
//!
//! Models optimization problems over boolean variables with integer linear
//! constraints and a linear objective.
//!
//! # Key Components
//!
//! - **Model**: [`LinearModel`]: variables, [`LinearConstraint`]s, [`Objective`]
//! - **Solver**: [`BinarySolver`] trait: interface for solver implementations
//! - **Backend**: [`BranchAndBoundSolver`]: bundled exact search
//!
//! # Design
//!
//! The [`BinarySolver`] trait is the seam to external engines (CP-SAT,
//! CBC, HiGHS). The bundled backend is sufficient for single-student
//! course loads; larger instances should plug in a dedicated solver.
//!
//! # References
//!
//! Wolsey (1998), "Integer Programming", Ch. 7 (Branch and Bound)

mod bnb;
mod model;
mod solver;

pub use bnb::BranchAndBoundSolver;
pub use model::{Comparison, LinearConstraint, LinearModel, Objective, Sense, VarId};
pub use solver::{BinarySolver, Solution, SolverConfig, SolverStatus};
