//! Pairwise lesson relations.
//!
//! Every same-day pair of candidates from different groups is classified
//! once, when the builder is created:
//!
//! | Relation | Condition |
//! |----------|-----------|
//! | overlap | `start₁ < end₂ ∧ start₂ < end₁` |
//! | travel-tight | gap ≤ `max_gap_minutes` and required walk > gap |
//! | compact | `COMPACT_GAP_MIN ≤ gap ≤ COMPACT_GAP_MAX` |
//!
//! Pairs inside one group are skipped: exactly one member of a group is
//! ever selected.
//!
//! A compact pair only counts when the two lessons are consecutive, so each
//! one records the candidates that would sit in its gap.

use log::trace;

use super::candidate::Candidate;
use crate::config::{TravelConfig, COMPACT_GAP_MAX, COMPACT_GAP_MIN};
use crate::geo::DistanceCache;

/// Two consecutive lessons the student cannot comfortably walk between.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelPair {
    /// Earlier candidate.
    pub first: usize,
    /// Later candidate.
    pub second: usize,
    /// Free minutes between the two lessons.
    pub gap_minutes: u32,
    /// Walking time needed, buffer included.
    pub required_minutes: f64,
    /// Whether the walk is long enough to forbid co-selection when travel
    /// is enforced hard.
    pub hard: bool,
}

impl TravelPair {
    /// Minutes missing to make the walk.
    pub fn shortfall_minutes(&self) -> f64 {
        self.required_minutes - f64::from(self.gap_minutes)
    }
}

/// Two same-day lessons separated by a comfortable break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactPair {
    /// Earlier candidate.
    pub first: usize,
    /// Later candidate.
    pub second: usize,
    /// Candidates of other groups intersecting the break; selecting any of
    /// them makes the pair non-consecutive.
    pub between: Vec<usize>,
}

/// Classified candidate pairs (indices into the candidate list).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonPairs {
    /// Pairs whose windows intersect.
    pub overlaps: Vec<(usize, usize)>,
    /// Pairs with too little time to walk between venues.
    pub travel: Vec<TravelPair>,
    /// Pairs separated by a comfortable break.
    pub compact: Vec<CompactPair>,
}

impl LessonPairs {
    /// Classifies all pairs.
    ///
    /// O(n²) in the number of candidates; distances come from `cache`.
    pub fn classify(candidates: &[Candidate<'_>], cache: &DistanceCache, travel: &TravelConfig) -> Self {
        let mut pairs = Self::default();

        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let (a, b) = (&candidates[i], &candidates[j]);
                if a.group == b.group || a.span.day != b.span.day {
                    continue;
                }
                if a.span.overlaps(&b.span) {
                    pairs.overlaps.push((i, j));
                    continue;
                }
                let Some(gap) = a.span.gap_to(&b.span) else {
                    continue;
                };
                let (first, second) = if a.span.start <= b.span.start { (i, j) } else { (j, i) };

                if gap <= travel.max_gap_minutes {
                    if let Some(pair) = travel_pair(candidates, cache, travel, first, second, gap) {
                        pairs.travel.push(pair);
                    }
                }
                if (COMPACT_GAP_MIN..=COMPACT_GAP_MAX).contains(&gap) {
                    pairs.compact.push(CompactPair {
                        first,
                        second,
                        between: lessons_between(candidates, first, second),
                    });
                }
            }
        }

        trace!(
            "pairs: {} overlapping, {} travel-tight, {} compact",
            pairs.overlaps.len(),
            pairs.travel.len(),
            pairs.compact.len()
        );
        pairs
    }
}

/// Candidates outside both groups that intersect the break `(end₁, start₂)`.
fn lessons_between(candidates: &[Candidate<'_>], first: usize, second: usize) -> Vec<usize> {
    let (a, b) = (&candidates[first], &candidates[second]);
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.group != a.group
                && c.group != b.group
                && c.span.day == a.span.day
                && c.span.start < b.span.start
                && c.span.end > a.span.end
        })
        .map(|(k, _)| k)
        .collect()
}

fn travel_pair(
    candidates: &[Candidate<'_>],
    cache: &DistanceCache,
    travel: &TravelConfig,
    first: usize,
    second: usize,
    gap: u32,
) -> Option<TravelPair> {
    let from = candidates[first].lesson.venue.as_str();
    let to = candidates[second].lesson.venue.as_str();
    let required_minutes = travel.required_minutes(cache.distance(from, to));
    if required_minutes <= f64::from(gap) {
        return None;
    }
    Some(TravelPair {
        first,
        second,
        gap_minutes: gap,
        required_minutes,
        hard: required_minutes > travel.hard_threshold_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::candidate::collect_candidates;
    use crate::geo::{Coordinate, VenueCatalog};
    use crate::models::{Lesson, ModuleEntry, Weekday};
    use std::collections::BTreeMap;

    fn modules(lessons: Vec<(&str, Lesson)>) -> BTreeMap<String, ModuleEntry> {
        let mut map: BTreeMap<String, ModuleEntry> = BTreeMap::new();
        for (code, lesson) in lessons {
            map.entry(code.to_string())
                .or_insert_with(|| ModuleEntry::with_lessons(Vec::new()))
                .timetable
                .get_or_insert_with(Vec::new)
                .push(lesson);
        }
        map
    }

    fn campus() -> DistanceCache {
        // roughly 1.1 km apart
        DistanceCache::new(
            &VenueCatalog::new()
                .with_venue("NEAR", Coordinate::new(103.7700, 1.2950))
                .with_venue("FAR", Coordinate::new(103.7800, 1.2950)),
        )
    }

    #[test]
    fn test_overlap_detected_across_modules_only() {
        let input = modules(vec![
            ("A", Lesson::new("Lecture", "1", Weekday::Monday, "0900", "1100", "")),
            ("A", Lesson::new("Lecture", "2", Weekday::Monday, "1000", "1200", "")),
            ("B", Lesson::new("Lecture", "1", Weekday::Monday, "1030", "1130", "")),
        ]);
        let (candidates, _) = collect_candidates(&input);
        let pairs = LessonPairs::classify(&candidates, &campus(), &TravelConfig::default());
        // A1-A2 share a group
        assert_eq!(pairs.overlaps, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_touching_lessons_do_not_overlap() {
        let input = modules(vec![
            ("A", Lesson::new("Lecture", "1", Weekday::Monday, "0900", "1000", "NEAR")),
            ("B", Lesson::new("Lecture", "1", Weekday::Monday, "1000", "1100", "NEAR")),
        ]);
        let (candidates, _) = collect_candidates(&input);
        let pairs = LessonPairs::classify(&candidates, &campus(), &TravelConfig::default());
        assert!(pairs.overlaps.is_empty());
        // same venue, no walk needed
        assert!(pairs.travel.is_empty());
    }

    #[test]
    fn test_travel_tight_pair() {
        let input = modules(vec![
            ("A", Lesson::new("Lecture", "1", Weekday::Monday, "0900", "1000", "NEAR")),
            ("B", Lesson::new("Lecture", "1", Weekday::Monday, "1000", "1100", "FAR")),
            ("C", Lesson::new("Lecture", "1", Weekday::Monday, "1100", "1200", "GHOST")),
        ]);
        let (candidates, _) = collect_candidates(&input);
        let pairs = LessonPairs::classify(&candidates, &campus(), &TravelConfig::default());

        assert_eq!(pairs.travel.len(), 2);
        let near_far = &pairs.travel[0];
        assert_eq!((near_far.first, near_far.second), (0, 1));
        assert!(near_far.required_minutes > 10.0);
        assert!(near_far.hard);
        // unknown venue is 1000 m: 11.9 + 2 minutes
        let far_ghost = &pairs.travel[1];
        assert!((far_ghost.shortfall_minutes() - (1000.0 / 84.0 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_compact_pair_ordered_by_start() {
        let input = modules(vec![
            ("A", Lesson::new("Lecture", "1", Weekday::Friday, "1400", "1500", "")),
            ("B", Lesson::new("Lecture", "1", Weekday::Friday, "1000", "1300", "")),
            ("C", Lesson::new("Lecture", "1", Weekday::Friday, "1800", "1900", "")),
        ]);
        let (candidates, _) = collect_candidates(&input);
        let pairs = LessonPairs::classify(&candidates, &campus(), &TravelConfig::default());
        // B ends 13:00, A starts 14:00; C is 3h after A
        assert_eq!(
            pairs.compact,
            vec![CompactPair {
                first: 1,
                second: 0,
                between: vec![]
            }]
        );
        assert!(pairs.travel.is_empty());
    }

    #[test]
    fn test_lessons_between_same_day_other_groups() {
        let input = modules(vec![
            ("A", Lesson::new("Lecture", "1", Weekday::Monday, "0900", "1000", "")),
            ("B", Lesson::new("Lecture", "1", Weekday::Monday, "1130", "1230", "")),
            ("C", Lesson::new("Lecture", "1", Weekday::Monday, "1020", "1040", "")),
            ("D", Lesson::new("Lecture", "1", Weekday::Tuesday, "1020", "1040", "")),
        ]);
        let (candidates, _) = collect_candidates(&input);
        let pairs = LessonPairs::classify(&candidates, &campus(), &TravelConfig::default());
        let a_to_b = pairs
            .compact
            .iter()
            .find(|p| (p.first, p.second) == (0, 1))
            .unwrap();
        assert_eq!(a_to_b.between, vec![2]);
    }

    #[test]
    fn test_missing_venue_counts_as_far() {
        let input = modules(vec![
            ("A", Lesson::new("Lecture", "1", Weekday::Monday, "1200", "1400", "NEAR")),
            ("B", Lesson::new("Lecture", "1", Weekday::Monday, "1400", "1600", "")),
            ("C", Lesson::new("Lecture", "1", Weekday::Monday, "1600", "1700", "")),
        ]);
        let (candidates, _) = collect_candidates(&input);
        let pairs = LessonPairs::classify(&candidates, &campus(), &TravelConfig::default());

        // NEAR -> "" is an unknown venue; "" -> "" is the same venue
        assert_eq!(pairs.travel.len(), 1);
        let pair = &pairs.travel[0];
        assert_eq!((pair.first, pair.second), (0, 1));
        assert!(pair.hard);
    }
}
