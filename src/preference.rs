//! Time-preference scoring.
//!
//! A lesson's window is cut into hour-aligned buckets (e.g. 09:30–11:15 →
//! 09:30–10:00, 10:00–11:00, 11:00–11:15). Each bucket takes the state of
//! its hour in the [`PreferenceGrid`]. Two readings are offered:
//!
//! | Reading | Counts | Range | Better |
//! |---------|--------|-------|--------|
//! | [`time_penalty`] | blocked minutes | 0..=100, 1000 for empty windows | lower |
//! | [`preference_score`] | available minutes | 0..=100 | higher |
//!
//! Both read absent grid entries as available. The score is derived from
//! the penalty (`score = 100 − penalty` for positive durations), so the two
//! rank lessons identically once signed consistently in an objective.

use serde::{Deserialize, Serialize};

use crate::models::{LessonSpan, PreferenceGrid};

/// Penalty for a lesson whose end is not after its start.
pub const INVALID_DURATION_PENALTY: u32 = 1000;

/// Which reading of the grid feeds the objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferenceMode {
    /// Minimize `weight × time_penalty`.
    #[default]
    Penalty,
    /// Maximize `weight × preference_score`.
    Score,
}

/// Blocked and total minutes of a span.
fn blocked_minutes(span: &LessonSpan, grid: &PreferenceGrid) -> (u32, u32) {
    let mut blocked = 0;
    let mut current = span.start;
    while current < span.end {
        let hour = current / 60;
        let bucket_end = ((hour + 1) * 60).min(span.end);
        if grid.is_blocked(span.day, hour) {
            blocked += bucket_end - current;
        }
        current = bucket_end;
    }
    (blocked, span.end.saturating_sub(span.start))
}

/// Percentage (rounded down) of the lesson spent in blocked hours.
///
/// Returns [`INVALID_DURATION_PENALTY`] for non-positive durations so such
/// lessons are never preferred by a minimizing objective.
///
/// # Examples
/// ```
/// use u_timetable::models::{LessonSpan, PreferenceGrid, Weekday};
/// use u_timetable::preference::time_penalty;
///
/// let grid = PreferenceGrid::new().with_slot(Weekday::Monday, 9, false);
/// // 09:00-11:00, first hour blocked
/// assert_eq!(time_penalty(&LessonSpan::new(Weekday::Monday, 540, 660), &grid), 50);
/// ```
pub fn time_penalty(span: &LessonSpan, grid: &PreferenceGrid) -> u32 {
    if span.duration() <= 0 {
        return INVALID_DURATION_PENALTY;
    }
    let (blocked, total) = blocked_minutes(span, grid);
    blocked * 100 / total
}

/// Percentage of the lesson spent in available hours: the complement of
/// [`time_penalty`].
///
/// Non-positive durations score 0.
pub fn preference_score(span: &LessonSpan, grid: &PreferenceGrid) -> u32 {
    if span.duration() <= 0 {
        return 0;
    }
    100 - time_penalty(span, grid)
}

/// Objective coefficient of selecting a lesson, to be minimized.
pub(crate) fn objective_cost(
    span: &LessonSpan,
    grid: &PreferenceGrid,
    mode: PreferenceMode,
    weight: i64,
) -> i64 {
    match mode {
        PreferenceMode::Penalty => weight * i64::from(time_penalty(span, grid)),
        PreferenceMode::Score => -weight * i64::from(preference_score(span, grid)),
    }
}
