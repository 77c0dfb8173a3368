//! Optimizer configuration.
//!
//! [`OptimizerConfig`] gathers objective weights, travel assumptions and
//! solver limits. All parts have production defaults and `with_*` builder
//! methods; the whole struct derives `serde` so it can be read from any
//! serde format.
//!
//! # Weight ordering
//!
//! The objective is minimized. Default weights keep
//! time preference ≫ travel ≫ common start ≈ compactness:
//!
//! | Term | Default | Unit |
//! |------|---------|------|
//! | time preference | 10 000 | per percentage point |
//! | travel shortfall | 100 | per minute missing |
//! | common start bonus | 10 | per lesson |
//! | compactness bonus | 10 | per lesson pair |

use serde::{Deserialize, Serialize};

use crate::lp::SolverConfig;
use crate::preference::PreferenceMode;

/// Objective coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    /// Cost per percentage point of time-preference penalty (or reward per
    /// point of score in [`PreferenceMode::Score`]).
    pub time_preference: i64,
    /// Cost per minute of travel shortfall between co-selected lessons.
    pub travel_per_minute: i64,
    /// Reward for a lesson starting at a common start time.
    pub common_start: i64,
    /// Reward for two selected same-day lessons 60–120 minutes apart.
    pub compactness: i64,
    /// Cost of one overlapping pair when overlaps are soft.
    ///
    /// `None` derives a weight that dominates every other term combined.
    pub overlap: Option<i64>,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            time_preference: 10_000,
            travel_per_minute: 100,
            common_start: 10,
            compactness: 10,
            overlap: None,
        }
    }
}

/// Walking model used for travel feasibility between consecutive lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Walking speed in meters per second.
    pub walking_speed_mps: f64,
    /// Fixed allowance added to every walk between different venues.
    pub buffer_minutes: f64,
    /// Largest gap (minutes) between two lessons that is checked.
    pub max_gap_minutes: u32,
    /// Walks at most this long are never forbidden outright, only penalized.
    pub hard_threshold_minutes: f64,
}

/// Walking speed used when the configured one is not a positive number.
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.4;

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
            buffer_minutes: 2.0,
            max_gap_minutes: 30,
            hard_threshold_minutes: 10.0,
        }
    }
}

impl TravelConfig {
    /// Whether the walking speed is a finite positive number.
    pub fn has_valid_speed(&self) -> bool {
        self.walking_speed_mps.is_finite() && self.walking_speed_mps > 0.0
    }

    /// Walking speed actually used: the configured one, or
    /// [`DEFAULT_WALKING_SPEED_MPS`] when it is zero, negative or not finite.
    pub fn effective_speed_mps(&self) -> f64 {
        if self.has_valid_speed() {
            self.walking_speed_mps
        } else {
            DEFAULT_WALKING_SPEED_MPS
        }
    }

    /// Minutes needed to walk `meters`, buffer included.
    ///
    /// Staying in the same venue (0 m) needs no time at all.
    pub fn required_minutes(&self, meters: f64) -> f64 {
        if meters <= 0.0 {
            return 0.0;
        }
        meters / (self.effective_speed_mps() * 60.0) + self.buffer_minutes
    }
}

/// Minimum gap (minutes) between two lessons that earns the compactness bonus.
pub const COMPACT_GAP_MIN: u32 = 60;
/// Maximum gap (minutes) between two lessons that earns the compactness bonus.
pub const COMPACT_GAP_MAX: u32 = 120;

/// Complete optimizer configuration.
///
/// # Example
/// ```
/// use u_timetable::config::OptimizerConfig;
///
/// let config = OptimizerConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_workers(1);
/// assert_eq!(config.solver.time_limit_ms, 5_000);
/// assert_eq!(config.weights.time_preference, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Objective coefficients.
    pub weights: ObjectiveWeights,
    /// Walking model.
    pub travel: TravelConfig,
    /// Limits handed to the solver on every tier.
    pub solver: SolverConfig,
    /// Grid reading used for the preference term.
    pub preference_mode: PreferenceMode,
    /// Start times (minutes since midnight) that earn the common-start bonus.
    pub common_start_times: Vec<u32>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            weights: ObjectiveWeights::default(),
            travel: TravelConfig::default(),
            solver: SolverConfig::default(),
            preference_mode: PreferenceMode::Penalty,
            // 07:00-11:00 and 14:00-17:00 on the hour
            common_start_times: vec![420, 480, 540, 600, 660, 840, 900, 960, 1020],
        }
    }
}

impl OptimizerConfig {
    /// Sets the objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the walking model.
    pub fn with_travel(mut self, travel: TravelConfig) -> Self {
        self.travel = travel;
        self
    }

    /// Sets the solver configuration.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the per-tier solver time limit.
    pub fn with_time_limit_ms(mut self, time_limit_ms: u64) -> Self {
        self.solver.time_limit_ms = time_limit_ms;
        self
    }

    /// Sets the solver worker count.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.solver.num_workers = num_workers.max(1);
        self
    }

    /// Sets the preference reading.
    pub fn with_preference_mode(mut self, mode: PreferenceMode) -> Self {
        self.preference_mode = mode;
        self
    }

    /// Sets the common start times.
    pub fn with_common_start_times(mut self, minutes: Vec<u32>) -> Self {
        self.common_start_times = minutes;
        self
    }
}
