//! Timetable optimization with tiered fallback.
//!
//! # Tiers
//!
//! | Tier | Overlap | Long walks | Tried when |
//! |------|---------|------------|------------|
//! | 1 strict | hard | hard | always |
//! | 2 relaxed travel | hard | penalized | tier 1 found nothing |
//! | 3 relaxed overlap | penalized (dominating) | penalized | tier 2 found nothing |
//!
//! A tier "finds nothing" when the solver reports infeasible, a timeout
//! without an incumbent, or an invalid model. A timeout with an incumbent
//! is accepted as is. If all three tiers find nothing the input is returned
//! unchanged.
//!
//! # Key Components
//!
//! - [`TimetableOptimizer`]: runs the tiers against a [`BinarySolver`](crate::lp::BinarySolver)
//! - [`extract_modules`]: reads a selection back into the module map
//! - [`TimetableKpi`]: summary statistics of the selected timetable

mod controller;
mod extract;
mod kpi;

pub use controller::{OptimizationResult, ScheduleOutcome, Tier, TierAttempt, TimetableOptimizer};
pub use extract::{extract_modules, selected_candidates};
pub use kpi::TimetableKpi;
