//! End-to-end optimizer scenarios.
//!
//! Requests are written in the JSON shape the optimizer receives from its
//! callers and solved with the bundled branch-and-bound backend.

use serde_json::json;
use u_timetable::config::OptimizerConfig;
use u_timetable::geo::{DistanceCache, VenueCatalog};
use u_timetable::lp::{BinarySolver, LinearModel, Solution, SolverConfig, SolverStatus};
use u_timetable::models::{Lesson, TimetableRequest};
use u_timetable::optimizer::{ScheduleOutcome, Tier, TimetableOptimizer};
use u_timetable::preference::PreferenceMode;

fn config() -> OptimizerConfig {
    OptimizerConfig::default()
        .with_time_limit_ms(5_000)
        .with_workers(1)
}

fn lesson(kind: &str, class: &str, day: &str, start: &str, end: &str, venue: &str) -> serde_json::Value {
    json!({
        "lessonType": kind,
        "classNo": class,
        "day": day,
        "startTime": start,
        "endTime": end,
        "venue": venue,
    })
}

fn campus() -> VenueCatalog {
    VenueCatalog::from_value(json!({
        "COM1": {"location": {"x": 103.7737, "y": 1.2950}},
        "COM2": {"location": {"x": 103.7740, "y": 1.2942}},
        "UTOWN": {"location": {"x": 103.7727, "y": 1.3050}},
    }))
    .unwrap()
}

fn optimize(request: &TimetableRequest, catalog: &VenueCatalog) -> u_timetable::optimizer::OptimizationResult {
    let cache = DistanceCache::new(catalog);
    TimetableOptimizer::bundled(&cache)
        .with_config(config())
        .optimize(request)
}

fn selected<'a>(result: &'a u_timetable::optimizer::OptimizationResult, module: &str) -> &'a [Lesson] {
    result.modules[module].lessons()
}

#[test]
fn two_single_lectures_on_different_days() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS1101S": {"timetable": [lesson("Lecture", "1", "Monday", "1000", "1200", "")]},
            "MA1521": {"timetable": [lesson("Lecture", "1", "Wednesday", "1000", "1200", "")]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &VenueCatalog::new());
    assert_eq!(result.tier(), Some(Tier::Strict));
    assert_eq!(selected(&result, "CS1101S").len(), 1);
    assert_eq!(selected(&result, "MA1521").len(), 1);

    let kpi = result.kpi.as_ref().unwrap();
    assert_eq!(kpi.scheduled_lessons, 2);
    assert_eq!(kpi.overlap_pairs, 0);
    assert_eq!(kpi.total_travel_penalty, 0);
}

#[test]
fn overlapping_equal_sections_pick_common_start() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS2030S": {"timetable": [
                lesson("Lecture", "1", "Tuesday", "1030", "1230", "COM1"),
                lesson("Lecture", "2", "Tuesday", "1000", "1200", "COM1"),
            ]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    let lessons = selected(&result, "CS2030S");
    assert_eq!(lessons.len(), 1);
    // no preferences; 10:00 earns the common-start bonus
    assert_eq!(lessons[0].class_no, "2");
    assert_eq!(
        result.outcome,
        ScheduleOutcome::Optimized {
            tier: Tier::Strict,
            status: SolverStatus::Optimal
        }
    );
}

#[test]
fn fully_blocked_sections_still_select_one() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "ST2334": {"timetable": [
                lesson("Tutorial", "T1", "Friday", "0800", "0900", "COM2"),
                lesson("Tutorial", "T2", "Friday", "1800", "1900", "COM2"),
            ]},
        },
        "constraints": {"preferredTimeSlots": {
            "Friday": {"0800": false, "1800": false}
        }}
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    assert_eq!(selected(&result, "ST2334").len(), 1);
    let kpi = result.kpi.unwrap();
    assert_eq!(kpi.total_preference_penalty, 100);
}

#[test]
fn preferences_drive_selection() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "GEA1000": {"timetable": [
                lesson("Tutorial", "E01", "Thursday", "0900", "1100", "COM1"),
                lesson("Tutorial", "E02", "Thursday", "1400", "1600", "COM1"),
            ]},
        },
        "constraints": {"preferredTimeSlots": {
            "Thursday": {"0900": false, "1000": true, "1400": true, "1500": true}
        }}
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    assert_eq!(selected(&result, "GEA1000")[0].class_no, "E02");
    assert_eq!(result.kpi.unwrap().total_preference_penalty, 0);
}

#[test]
fn clashing_single_sections_fall_back_to_relaxed_overlap() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS2100": {"timetable": [lesson("Lecture", "1", "Monday", "1400", "1600", "COM1")]},
            "CS2101": {"timetable": [lesson("Sectional", "G1", "Monday", "1500", "1700", "COM1")]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    let statuses: Vec<(Tier, SolverStatus)> =
        result.attempts.iter().map(|a| (a.tier, a.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (Tier::Strict, SolverStatus::Infeasible),
            (Tier::RelaxedTravel, SolverStatus::Infeasible),
            (Tier::RelaxedOverlap, SolverStatus::Optimal),
        ]
    );
    assert_eq!(result.kpi.unwrap().overlap_pairs, 1);
}

#[test]
fn long_walk_falls_back_to_relaxed_travel() {
    // COM1 -> UTOWN is over a kilometre; the lessons are back to back
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS2103T": {"timetable": [lesson("Lecture", "1", "Friday", "1200", "1400", "COM1")]},
            "UTW1001": {"timetable": [lesson("Seminar", "1", "Friday", "1400", "1600", "UTOWN")]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    assert_eq!(result.tier(), Some(Tier::RelaxedTravel));
    assert_eq!(result.attempts[0].status, SolverStatus::Infeasible);
    let kpi = result.kpi.unwrap();
    assert!(kpi.total_travel_penalty > 0);
    assert_eq!(kpi.overlap_pairs, 0);
}

#[test]
fn strict_tier_avoids_long_walk_when_possible() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS2103T": {"timetable": [lesson("Lecture", "1", "Friday", "1200", "1400", "COM1")]},
            "UTW1001": {"timetable": [
                lesson("Seminar", "1", "Friday", "1400", "1600", "UTOWN"),
                lesson("Seminar", "2", "Friday", "1700", "1900", "UTOWN"),
            ]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    assert_eq!(result.tier(), Some(Tier::Strict));
    assert_eq!(selected(&result, "UTW1001")[0].class_no, "2");
}

#[test]
fn output_shape_and_pass_through() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS3230": {
                "title": "Design and Analysis of Algorithms",
                "timetable": [
                    {"lessonType": "Lecture", "classNo": "1", "day": "Monday",
                     "startTime": "1000", "endTime": "1200", "venue": "COM1", "weeks": [1, 2, 3]}
                ]
            },
            "CFG1002": {"title": "Career Catalyst"},
            "BROKEN": 42,
        }
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    let output = result.to_json().unwrap();
    assert_eq!(
        output,
        json!({
            "CS3230": {
                "moduleCode": "CS3230",
                "title": "Design and Analysis of Algorithms",
                "timetable": [
                    {"lessonType": "Lecture", "classNo": "1", "day": "Monday",
                     "startTime": "1000", "endTime": "1200", "venue": "COM1", "weeks": [1, 2, 3]}
                ]
            },
            "CFG1002": {"title": "Career Catalyst"},
        })
    );
}

#[test]
fn exactly_one_per_lesson_type_without_overlap() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS2040S": {"timetable": [
                lesson("Lecture", "1", "Tuesday", "1000", "1200", "COM1"),
                lesson("Lecture", "2", "Thursday", "1000", "1200", "COM1"),
                lesson("Tutorial", "01", "Tuesday", "1100", "1200", "COM2"),
                lesson("Tutorial", "02", "Tuesday", "1300", "1400", "COM2"),
                lesson("Tutorial", "03", "Wednesday", "0900", "1000", "COM2"),
                lesson("Laboratory", "L1", "Thursday", "1100", "1300", "COM1"),
                lesson("Laboratory", "L2", "Friday", "1000", "1200", "COM1"),
            ]},
            "MA1522": {"timetable": [
                lesson("Lecture", "1", "Tuesday", "1000", "1200", "UTOWN"),
                lesson("Lecture", "2", "Wednesday", "0900", "1100", "UTOWN"),
                lesson("Tutorial", "T1", "Wednesday", "1000", "1100", "COM2"),
                lesson("Tutorial", "T2", "Friday", "1000", "1100", "COM2"),
            ]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    let tier = result.tier().unwrap();
    assert!(tier != Tier::RelaxedOverlap);

    let mut chosen = Vec::new();
    for (code, module) in &result.modules {
        let mut types: Vec<&str> = module.lessons().iter().map(|l| l.lesson_type.as_str()).collect();
        types.sort_unstable();
        let before = types.len();
        types.dedup();
        assert_eq!(before, types.len(), "{code} has a repeated lesson type");
        chosen.extend(module.lessons().iter().map(Lesson::span));
    }
    assert_eq!(result.modules["CS2040S"].lessons().len(), 3);
    assert_eq!(result.modules["MA1522"].lessons().len(), 2);

    for (i, a) in chosen.iter().enumerate() {
        for b in &chosen[i + 1..] {
            assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn compactness_rewards_only_consecutive_lessons() {
    // three short Monday classes, then a choice between a Monday slot an
    // hour after the last of them and a Tuesday slot an hour after S
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "P": {"timetable": [lesson("Lecture", "1", "Monday", "1000", "1010", "")]},
            "Q": {"timetable": [lesson("Lecture", "1", "Monday", "1020", "1030", "")]},
            "T": {"timetable": [lesson("Lecture", "1", "Monday", "1040", "1050", "")]},
            "S": {"timetable": [lesson("Lecture", "1", "Tuesday", "1200", "1300", "")]},
            "R": {"timetable": [
                lesson("Lecture", "1", "Monday", "1150", "1200", ""),
                lesson("Lecture", "2", "Tuesday", "1400", "1500", ""),
            ]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &VenueCatalog::new());
    assert_eq!(result.tier(), Some(Tier::Strict));
    // R1 is consecutive to T only; R2 follows S and starts at 14:00
    assert_eq!(selected(&result, "R")[0].class_no, "2");
}

#[test]
fn lesson_without_venue_is_far_from_catalogued_venues() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS2103T": {"timetable": [lesson("Lecture", "1", "Monday", "1200", "1400", "COM1")]},
            "GEA1000": {"timetable": [lesson("Tutorial", "1", "Monday", "1400", "1600", "")]},
        }
    }))
    .unwrap();

    let result = optimize(&request, &campus());
    assert_eq!(result.attempts[0].status, SolverStatus::Infeasible);
    assert_eq!(result.tier(), Some(Tier::RelaxedTravel));
    assert!(result.kpi.unwrap().total_travel_penalty > 0);
}

#[test]
fn penalty_and_score_modes_pick_the_same_section() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "MA2001": {"timetable": [
                lesson("Lecture", "A", "Monday", "0930", "1100", ""),
                lesson("Lecture", "B", "Monday", "1109", "1339", ""),
            ]},
        },
        "constraints": {"preferredTimeSlots": {
            "Monday": {"0900": false, "1100": false}
        }}
    }))
    .unwrap();
    let cache = DistanceCache::new(&VenueCatalog::new());

    let picks: Vec<String> = [PreferenceMode::Penalty, PreferenceMode::Score]
        .into_iter()
        .map(|mode| {
            let config = config()
                .with_preference_mode(mode)
                .with_common_start_times(vec![669]);
            let result = TimetableOptimizer::bundled(&cache)
                .with_config(config)
                .optimize(&request);
            result.modules["MA2001"].lessons()[0].class_no.clone()
        })
        .collect();
    assert_eq!(picks, vec!["A", "A"]);
}

struct AlwaysInfeasible;

impl BinarySolver for AlwaysInfeasible {
    fn solve(&self, _model: &LinearModel, _config: &SolverConfig) -> Solution {
        Solution::empty(SolverStatus::Infeasible)
    }
}

#[test]
fn all_tiers_infeasible_returns_input_unchanged() {
    let request = TimetableRequest::from_value(json!({
        "modules": {
            "CS1231S": {"timetable": [
                lesson("Lecture", "1", "Monday", "1200", "1400", "COM1"),
                lesson("Lecture", "2", "Thursday", "1200", "1400", "COM1"),
            ]},
        }
    }))
    .unwrap();
    let cache = DistanceCache::new(&campus());

    let result = TimetableOptimizer::new(&cache, AlwaysInfeasible).optimize(&request);
    assert_eq!(result.outcome, ScheduleOutcome::Unsolved);
    assert_eq!(result.modules, request.modules);
    assert_eq!(result.attempts.len(), 3);
}

#[test]
fn no_lessons_is_nothing_to_optimize() {
    let request = TimetableRequest::from_json_str(r#"{"modules": {"CFG1002": {}}}"#).unwrap();
    let result = optimize(&request, &campus());
    assert_eq!(result.outcome, ScheduleOutcome::NothingToOptimize);
    assert_eq!(result.modules, request.modules);
}
