//! Timetable quality metrics (KPIs).
//!
//! Summarizes a selected timetable for reporting. The figures are
//! recomputed from the selection and never feed back into the model.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled lessons | Number of selected lessons |
//! | Total preference penalty | Σ time penalty of selected lessons |
//! | Average preference penalty | Total / scheduled lessons |
//! | Total travel penalty | Σ travel cost of co-selected tight pairs |
//! | Travel shortfall | Σ minutes missing across those pairs |
//! | Overlap pairs | Co-selected overlapping pairs |

use serde::Serialize;

use crate::builder::TimetableModelBuilder;
use crate::preference::time_penalty;

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableKpi {
    /// Number of selected lessons.
    pub scheduled_lessons: usize,
    /// Sum of time penalties (0..=100 each) of selected lessons.
    pub total_preference_penalty: u32,
    /// Mean time penalty per selected lesson.
    pub average_preference_penalty: f64,
    /// Sum of travel objective costs over co-selected tight pairs.
    pub total_travel_penalty: i64,
    /// Minutes of walking time missing across co-selected tight pairs.
    pub travel_shortfall_minutes: f64,
    /// Number of co-selected overlapping pairs.
    pub overlap_pairs: usize,
}

impl TimetableKpi {
    /// Computes KPIs from a selection.
    ///
    /// # Arguments
    /// * `builder` - The builder the selection refers to.
    /// * `selected` - One flag per candidate, in candidate order.
    pub fn calculate(builder: &TimetableModelBuilder<'_>, selected: &[bool]) -> Self {
        let is_selected = |i: usize| selected.get(i).copied().unwrap_or(false);
        let candidates = builder.candidates();

        let mut scheduled_lessons = 0;
        let mut total_preference_penalty = 0;
        for (i, candidate) in candidates.iter().enumerate() {
            if is_selected(i) {
                scheduled_lessons += 1;
                total_preference_penalty += time_penalty(&candidate.span, builder.grid());
            }
        }

        let pairs = builder.pairs();
        let mut total_travel_penalty = 0;
        let mut travel_shortfall_minutes = 0.0;
        for pair in &pairs.travel {
            if is_selected(pair.first) && is_selected(pair.second) {
                total_travel_penalty += builder.travel_cost(pair.shortfall_minutes());
                travel_shortfall_minutes += pair.shortfall_minutes();
            }
        }

        let overlap_pairs = pairs
            .overlaps
            .iter()
            .filter(|&&(i, j)| is_selected(i) && is_selected(j))
            .count();

        let average_preference_penalty = if scheduled_lessons == 0 {
            0.0
        } else {
            f64::from(total_preference_penalty) / scheduled_lessons as f64
        };

        Self {
            scheduled_lessons,
            total_preference_penalty,
            average_preference_penalty,
            total_travel_penalty,
            travel_shortfall_minutes,
            overlap_pairs,
        }
    }

    /// Whether no two selected lessons overlap.
    pub fn is_conflict_free(&self) -> bool {
        self.overlap_pairs == 0
    }
}
