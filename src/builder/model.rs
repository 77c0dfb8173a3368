//! Parameterized timetable model construction.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::candidate::{collect_candidates, Candidate, LessonGroup, LessonKey};
use super::pairs::LessonPairs;
use crate::config::OptimizerConfig;
use crate::geo::DistanceCache;
use crate::lp::{LinearModel, VarId};
use crate::models::{ModuleEntry, PreferenceGrid};
use crate::preference::objective_cost;

/// Which relations are hard constraints in one model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Overlapping pairs may not both be selected.
    pub enforce_overlap_hard: bool,
    /// Pairs whose walk exceeds the hard threshold may not both be selected.
    pub enforce_travel_hard: bool,
    /// Cost of a selected overlapping pair when overlaps are soft.
    ///
    /// Falls back to [`ObjectiveWeights::overlap`](crate::config::ObjectiveWeights::overlap),
    /// then to a weight dominating all other objective terms.
    pub overlap_penalty_weight: Option<i64>,
}

impl TierConfig {
    /// Overlap and long walks forbidden.
    pub fn strict() -> Self {
        Self {
            enforce_overlap_hard: true,
            enforce_travel_hard: true,
            overlap_penalty_weight: None,
        }
    }

    /// Overlap forbidden; every walk only penalized.
    pub fn relaxed_travel() -> Self {
        Self {
            enforce_travel_hard: false,
            ..Self::strict()
        }
    }

    /// Nothing forbidden beyond one section per lesson type.
    pub fn relaxed_overlap() -> Self {
        Self {
            enforce_overlap_hard: false,
            enforce_travel_hard: false,
            overlap_penalty_weight: None,
        }
    }

    /// Sets an explicit overlap penalty.
    pub fn with_overlap_penalty(mut self, weight: i64) -> Self {
        self.overlap_penalty_weight = Some(weight);
        self
    }
}

/// A built model together with the variable bookkeeping needed to read a
/// solution back.
#[derive(Debug, Clone)]
pub struct TimetableModel {
    /// The 0/1 model handed to the solver.
    pub model: LinearModel,
    /// Variant the model was built for.
    pub tier: TierConfig,
    /// Effective overlap weight, when overlaps are soft.
    pub overlap_weight: Option<i64>,
    lesson_vars: Vec<VarId>,
    keys: HashMap<LessonKey, VarId>,
}

impl TimetableModel {
    /// Variable of the candidate at `index`.
    pub fn lesson_var(&self, index: usize) -> VarId {
        self.lesson_vars[index]
    }

    /// Variables of all candidates, in candidate order.
    pub fn lesson_vars(&self) -> &[VarId] {
        &self.lesson_vars
    }

    /// Variable of a lesson key.
    pub fn var_for(&self, key: &LessonKey) -> Option<VarId> {
        self.keys.get(key).copied()
    }
}

/// Builds timetable models from modules, preferences and distances.
///
/// Candidates and pair relations are derived once in [`new`](Self::new);
/// every [`build`](Self::build) call then creates an independent model with
/// a fresh variable set.
///
/// # Model
///
/// | Part | Form |
/// |------|------|
/// | one section per lesson type | `Σ x = 1` per group |
/// | no overlap (hard) | `xᵢ + xⱼ ≤ 1` |
/// | no overlap (soft) | `o ≥ xᵢ + xⱼ − 1`, cost `w_overlap · o` |
/// | long walk (hard) | `xᵢ + xⱼ ≤ 1` |
/// | tight walk (soft) | `t ≥ xᵢ + xⱼ − 1`, cost `⌈shortfall · w_travel⌉ · t` |
/// | compact pair | `c ≤ xᵢ`, `c ≤ xⱼ`, `c + xₖ ≤ 1` per lesson k in the break, reward `w_compact · c` |
/// | lesson | cost `w_pref · penalty − w_common · [common start]` |
///
/// The objective is minimized. Its terms per [`Tier`](crate::optimizer::Tier):
///
/// | Term | Strict | Relaxed travel | Relaxed overlap |
/// |------|--------|----------------|-----------------|
/// | preference, common start | yes | yes | yes |
/// | travel | short walks only | every tight pair | every tight pair |
/// | compactness | yes | yes | yes |
/// | overlap | no (hard) | no (hard) | yes |
///
/// Travel and compactness stay in the hard-overlap tiers; they only break
/// ties below the preference weight.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use u_timetable::builder::{TierConfig, TimetableModelBuilder};
/// use u_timetable::config::OptimizerConfig;
/// use u_timetable::geo::{DistanceCache, VenueCatalog};
/// use u_timetable::models::{Lesson, ModuleEntry, PreferenceGrid, Weekday};
///
/// let mut modules = BTreeMap::new();
/// modules.insert("CS1010".to_string(), ModuleEntry::with_lessons(vec![
///     Lesson::new("Lecture", "1", Weekday::Monday, "0900", "1100", "LT19"),
///     Lesson::new("Lecture", "2", Weekday::Monday, "1000", "1200", "LT19"),
/// ]));
/// let grid = PreferenceGrid::new();
/// let cache = DistanceCache::new(&VenueCatalog::new());
/// let config = OptimizerConfig::default();
///
/// let builder = TimetableModelBuilder::new(&modules, &grid, &cache, &config);
/// let built = builder.build(&TierConfig::strict());
/// assert_eq!(built.model.var_count(), 2);
/// ```
pub struct TimetableModelBuilder<'a> {
    grid: &'a PreferenceGrid,
    config: &'a OptimizerConfig,
    candidates: Vec<Candidate<'a>>,
    groups: Vec<LessonGroup>,
    pairs: LessonPairs,
}

impl<'a> TimetableModelBuilder<'a> {
    /// Collects candidates and classifies lesson pairs.
    pub fn new(
        modules: &'a BTreeMap<String, ModuleEntry>,
        grid: &'a PreferenceGrid,
        cache: &DistanceCache,
        config: &'a OptimizerConfig,
    ) -> Self {
        if !config.travel.has_valid_speed() {
            warn!(
                "walking speed {} m/s is unusable; assuming {} m/s",
                config.travel.walking_speed_mps,
                config.travel.effective_speed_mps()
            );
        }
        let (candidates, groups) = collect_candidates(modules);
        let pairs = LessonPairs::classify(&candidates, cache, &config.travel);
        debug!(
            "{} candidates in {} groups; {} overlapping, {} travel-tight, {} compact pairs",
            candidates.len(),
            groups.len(),
            pairs.overlaps.len(),
            pairs.travel.len(),
            pairs.compact.len()
        );
        Self {
            grid,
            config,
            candidates,
            groups,
            pairs,
        }
    }

    /// Candidate lessons, grouped contiguously.
    pub fn candidates(&self) -> &[Candidate<'a>] {
        &self.candidates
    }

    /// Selection groups.
    pub fn groups(&self) -> &[LessonGroup] {
        &self.groups
    }

    /// Classified pairs.
    pub fn pairs(&self) -> &LessonPairs {
        &self.pairs
    }

    /// Preference grid the lesson costs are read from.
    pub fn grid(&self) -> &PreferenceGrid {
        self.grid
    }

    /// Whether there is anything to select.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Objective cost of selecting a candidate on its own.
    pub fn lesson_cost(&self, index: usize) -> i64 {
        let weights = &self.config.weights;
        let span = &self.candidates[index].span;
        let mut cost = objective_cost(
            span,
            self.grid,
            self.config.preference_mode,
            weights.time_preference,
        );
        if self.config.common_start_times.contains(&span.start) {
            cost -= weights.common_start;
        }
        cost
    }

    /// Cost of co-selecting a travel-tight pair when travel is soft.
    pub fn travel_cost(&self, shortfall_minutes: f64) -> i64 {
        // `as` saturates; clamp so summed objectives stay in range
        let cost = (shortfall_minutes * self.config.weights.travel_per_minute as f64).ceil() as i64;
        cost.clamp(1, MAX_TERM_COST)
    }

    /// Builds a fresh model for one variant.
    pub fn build(&self, tier: &TierConfig) -> TimetableModel {
        let weights = &self.config.weights;
        let mut model = LinearModel::new(format!(
            "timetable(overlap_hard={}, travel_hard={})",
            tier.enforce_overlap_hard, tier.enforce_travel_hard
        ));

        let mut keys = HashMap::with_capacity(self.candidates.len());
        let lesson_vars: Vec<VarId> = self
            .candidates
            .iter()
            .map(|candidate| {
                let var = model.add_var(candidate.key.to_string());
                keys.insert(candidate.key.clone(), var);
                var
            })
            .collect();

        for group in &self.groups {
            let vars: Vec<VarId> = group.members.iter().map(|&i| lesson_vars[i]).collect();
            model.add_exactly_one(&vars);
        }

        for (index, &var) in lesson_vars.iter().enumerate() {
            model.add_objective_term(var, self.lesson_cost(index));
        }

        for pair in &self.pairs.travel {
            let (a, b) = (lesson_vars[pair.first], lesson_vars[pair.second]);
            if tier.enforce_travel_hard && pair.hard {
                model.add_at_most_one(&[a, b]);
            } else {
                let tight = model.add_var(format!("travel_{a}_{b}"));
                model.add_both_implies(a, b, tight);
                model.add_objective_term(tight, self.travel_cost(pair.shortfall_minutes()));
            }
        }

        if weights.compactness != 0 {
            for pair in &self.pairs.compact {
                let (a, b) = (lesson_vars[pair.first], lesson_vars[pair.second]);
                let compact = model.add_var(format!("compact_{a}_{b}"));
                model.add_only_if_both(a, b, compact);
                for &k in &pair.between {
                    model.add_at_most_one(&[compact, lesson_vars[k]]);
                }
                model.add_objective_term(compact, -weights.compactness);
            }
        }

        let overlap_weight = if tier.enforce_overlap_hard {
            for &(i, j) in &self.pairs.overlaps {
                model.add_at_most_one(&[lesson_vars[i], lesson_vars[j]]);
            }
            None
        } else {
            // overlap terms go last so the derived weight sees every other term
            let weight = tier
                .overlap_penalty_weight
                .or(weights.overlap)
                .unwrap_or_else(|| dominating_weight(&model));
            for &(i, j) in &self.pairs.overlaps {
                let (a, b) = (lesson_vars[i], lesson_vars[j]);
                let overlap = model.add_var(format!("overlap_{a}_{b}"));
                model.add_both_implies(a, b, overlap);
                model.add_objective_term(overlap, weight);
            }
            Some(weight)
        };

        debug!(
            "built {}: {} vars, {} constraints",
            model.name,
            model.var_count(),
            model.constraint_count()
        );

        TimetableModel {
            model,
            tier: *tier,
            overlap_weight,
            lesson_vars,
            keys,
        }
    }
}

/// Upper bound on a single derived objective coefficient.
const MAX_TERM_COST: i64 = 1 << 40;

/// `1 + Σ|c|` over the current objective: one overlap outweighs any
/// combination of the other terms. Saturates instead of overflowing.
fn dominating_weight(model: &LinearModel) -> i64 {
    model
        .objective
        .terms
        .iter()
        .fold(1i64, |acc, (_, coef)| acc.saturating_add(coef.saturating_abs()))
}
