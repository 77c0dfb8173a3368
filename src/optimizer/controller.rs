//! Tiered optimization with progressive relaxation.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::extract::{extract_modules, selected_candidates};
use super::kpi::TimetableKpi;
use crate::builder::{TierConfig, TimetableModelBuilder};
use crate::config::OptimizerConfig;
use crate::geo::DistanceCache;
use crate::lp::{BinarySolver, BranchAndBoundSolver, SolverStatus};
use crate::models::{ModuleEntry, TimetableRequest};
use crate::validation::validate_request;

/// One model variant of the fallback sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Overlap and long walks forbidden.
    Strict,
    /// Walks only penalized.
    RelaxedTravel,
    /// Overlaps only penalized, with a dominating weight.
    RelaxedOverlap,
}

impl Tier {
    /// Tiers in the order they are tried.
    pub const ALL: [Tier; 3] = [Tier::Strict, Tier::RelaxedTravel, Tier::RelaxedOverlap];

    /// Builder configuration of this tier.
    pub fn config(self) -> TierConfig {
        match self {
            Tier::Strict => TierConfig::strict(),
            Tier::RelaxedTravel => TierConfig::relaxed_travel(),
            Tier::RelaxedOverlap => TierConfig::relaxed_overlap(),
        }
    }

    /// 1-based position in the fallback sequence.
    pub fn level(self) -> u8 {
        match self {
            Tier::Strict => 1,
            Tier::RelaxedTravel => 2,
            Tier::RelaxedOverlap => 3,
        }
    }

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Strict => "strict",
            Tier::RelaxedTravel => "relaxed travel",
            Tier::RelaxedOverlap => "relaxed overlap",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {} ({})", self.level(), self.name())
    }
}

/// Record of one solver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierAttempt {
    /// Tier that was solved.
    pub tier: Tier,
    /// Status the solver returned.
    pub status: SolverStatus,
    /// Solver wall-clock time.
    pub solve_time_ms: u64,
}

/// How an optimization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScheduleOutcome {
    /// A tier produced an assignment.
    Optimized {
        /// Tier whose model was solved.
        tier: Tier,
        /// `Optimal` or `Feasible`.
        status: SolverStatus,
    },
    /// The request had no candidate lessons; returned unchanged.
    NothingToOptimize,
    /// No tier produced an assignment; returned unchanged.
    Unsolved,
}

/// Result of [`TimetableOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Module map: selected lessons only when optimized, the input otherwise.
    pub modules: BTreeMap<String, ModuleEntry>,
    /// How the run ended.
    pub outcome: ScheduleOutcome,
    /// Summary of the selected timetable, when optimized.
    pub kpi: Option<TimetableKpi>,
    /// Every solver call, in order.
    pub attempts: Vec<TierAttempt>,
}

impl OptimizationResult {
    fn unchanged(request: &TimetableRequest, outcome: ScheduleOutcome, attempts: Vec<TierAttempt>) -> Self {
        Self {
            modules: request.modules.clone(),
            outcome,
            kpi: None,
            attempts,
        }
    }

    /// Whether a tier produced an assignment.
    pub fn is_optimized(&self) -> bool {
        matches!(self.outcome, ScheduleOutcome::Optimized { .. })
    }

    /// Tier that produced the assignment.
    pub fn tier(&self) -> Option<Tier> {
        match self.outcome {
            ScheduleOutcome::Optimized { tier, .. } => Some(tier),
            _ => None,
        }
    }

    /// The output payload: module code → `{moduleCode, timetable, ..}`.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.modules)
    }
}

/// Timetable optimizer.
///
/// Builds the model for each tier in [`Tier::ALL`] and hands it to the
/// solver, moving on only when the solver returns no assignment
/// (infeasible, timeout without incumbent, or invalid model). When every
/// tier fails, or there is nothing to select, the input modules are
/// returned unchanged.
///
/// # Example
/// ```
/// use u_timetable::geo::{DistanceCache, VenueCatalog};
/// use u_timetable::models::{Lesson, ModuleEntry, TimetableRequest, Weekday};
/// use u_timetable::optimizer::{Tier, TimetableOptimizer};
///
/// let request = TimetableRequest::new().with_module(
///     "CS2103T",
///     ModuleEntry::with_lessons(vec![
///         Lesson::new("Lecture", "1", Weekday::Friday, "1400", "1600", "LT17"),
///         Lesson::new("Lecture", "2", Weekday::Friday, "1600", "1800", "LT17"),
///     ]),
/// );
/// let cache = DistanceCache::new(&VenueCatalog::new());
/// let result = TimetableOptimizer::bundled(&cache).optimize(&request);
///
/// assert_eq!(result.tier(), Some(Tier::Strict));
/// assert_eq!(result.modules["CS2103T"].lessons().len(), 1);
/// ```
pub struct TimetableOptimizer<'a, S: BinarySolver> {
    cache: &'a DistanceCache,
    solver: S,
    config: OptimizerConfig,
}

impl<'a> TimetableOptimizer<'a, BranchAndBoundSolver> {
    /// Optimizer backed by the bundled branch-and-bound solver.
    pub fn bundled(cache: &'a DistanceCache) -> Self {
        Self::new(cache, BranchAndBoundSolver::new())
    }
}

impl<'a, S: BinarySolver> TimetableOptimizer<'a, S> {
    /// Creates an optimizer with default configuration.
    pub fn new(cache: &'a DistanceCache, solver: S) -> Self {
        Self {
            cache,
            solver,
            config: OptimizerConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Selects one lesson per (module, lesson type).
    pub fn optimize(&self, request: &TimetableRequest) -> OptimizationResult {
        if let Err(findings) = validate_request(request, self.cache) {
            for finding in &findings {
                warn!("{}", finding.message);
            }
        }

        let builder = TimetableModelBuilder::new(
            &request.modules,
            &request.constraints.preferred_time_slots,
            self.cache,
            &self.config,
        );
        if builder.is_empty() {
            info!("no candidate lessons; nothing to optimize");
            return OptimizationResult::unchanged(request, ScheduleOutcome::NothingToOptimize, Vec::new());
        }

        let mut attempts = Vec::with_capacity(Tier::ALL.len());
        for tier in Tier::ALL {
            let built = builder.build(&tier.config());
            info!(
                "{tier}: solving {} variables, {} constraints",
                built.model.var_count(),
                built.model.constraint_count()
            );
            let solution = self.solver.solve(&built.model, &self.config.solver);
            attempts.push(TierAttempt {
                tier,
                status: solution.status,
                solve_time_ms: solution.solve_time_ms,
            });

            if !solution.is_solution_found() {
                warn!("{tier}: solver returned {:?}", solution.status);
                continue;
            }

            let selected = selected_candidates(&built, &solution);
            let kpi = TimetableKpi::calculate(&builder, &selected);
            info!(
                "{tier}: {:?} in {} ms; {} lessons, preference penalty {} (avg {:.1}), travel penalty {}, {} overlaps",
                solution.status,
                solution.solve_time_ms,
                kpi.scheduled_lessons,
                kpi.total_preference_penalty,
                kpi.average_preference_penalty,
                kpi.total_travel_penalty,
                kpi.overlap_pairs
            );
            return OptimizationResult {
                modules: extract_modules(&request.modules, &builder, &selected),
                outcome: ScheduleOutcome::Optimized {
                    tier,
                    status: solution.status,
                },
                kpi: Some(kpi),
                attempts,
            };
        }

        warn!("no tier produced a timetable; returning input unchanged");
        OptimizationResult::unchanged(request, ScheduleOutcome::Unsolved, attempts)
    }
}
