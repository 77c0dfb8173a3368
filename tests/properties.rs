//! Randomized properties of the optimizer on small course loads.

use proptest::prelude::*;
use std::collections::BTreeSet;
use u_timetable::config::OptimizerConfig;
use u_timetable::geo::{Coordinate, DistanceCache, VenueCatalog};
use u_timetable::lp::{
    BinarySolver, BranchAndBoundSolver, LinearModel, SolverConfig, SolverStatus,
};
use u_timetable::models::{Lesson, ModuleEntry, TimetableRequest, Weekday};
use u_timetable::optimizer::{ScheduleOutcome, Tier, TimetableOptimizer};

const MODULES: [&str; 3] = ["CS1010", "MA1521", "GEA1000"];
const TYPES: [&str; 2] = ["Lecture", "Tutorial"];
const VENUES: [&str; 4] = ["COM1", "LT27", "UTOWN", ""];
const DAYS: [Weekday; 3] = [Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday];

/// (module, type, day, start hour, hours, venue)
type Row = (usize, usize, usize, u32, u32, usize);

fn campus() -> DistanceCache {
    DistanceCache::new(
        &VenueCatalog::new()
            .with_venue("COM1", Coordinate::new(103.7737, 1.2950))
            .with_venue("LT27", Coordinate::new(103.7810, 1.2970))
            .with_venue("UTOWN", Coordinate::new(103.7727, 1.3050)),
    )
}

fn build_request(rows: &[Row]) -> TimetableRequest {
    let mut request = TimetableRequest::new();
    for (i, &(module, kind, day, hour, hours, venue)) in rows.iter().enumerate() {
        let lesson = Lesson::new(
            TYPES[kind],
            i.to_string(),
            DAYS[day],
            format!("{:02}00", hour),
            format!("{:02}00", hour + hours),
            VENUES[venue],
        );
        request
            .modules
            .entry(MODULES[module].to_string())
            .or_insert_with(|| ModuleEntry::with_lessons(Vec::new()))
            .timetable
            .get_or_insert_with(Vec::new)
            .push(lesson);
    }
    request
}

fn rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((0..3usize, 0..2usize, 0..3usize, 8..18u32, 1..3u32, 0..4usize), 1..14)
}

fn config() -> OptimizerConfig {
    OptimizerConfig::default()
        .with_time_limit_ms(5_000)
        .with_workers(1)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn selects_exactly_one_per_lesson_type(rows in rows()) {
        let request = build_request(&rows);
        let cache = campus();
        let result = TimetableOptimizer::bundled(&cache).with_config(config()).optimize(&request);
        prop_assert!(result.is_optimized());

        let expected: BTreeSet<(String, String)> = request
            .modules
            .iter()
            .flat_map(|(code, m)| m.lessons().iter().map(move |l| (code.clone(), l.lesson_type.clone())))
            .collect();
        let mut got = Vec::new();
        for (code, module) in &result.modules {
            for lesson in module.lessons() {
                got.push((code.clone(), lesson.lesson_type.clone()));
            }
        }
        prop_assert_eq!(got.len(), expected.len());
        prop_assert_eq!(got.into_iter().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn no_overlap_unless_overlap_relaxed(rows in rows()) {
        let request = build_request(&rows);
        let cache = campus();
        let result = TimetableOptimizer::bundled(&cache).with_config(config()).optimize(&request);

        let spans: Vec<_> = result
            .modules
            .values()
            .flat_map(|m| m.lessons().iter().map(Lesson::span))
            .collect();
        let overlapping = spans
            .iter()
            .enumerate()
            .any(|(i, a)| spans[i + 1..].iter().any(|b| a.overlaps(b)));

        match result.tier() {
            Some(Tier::Strict) | Some(Tier::RelaxedTravel) => prop_assert!(!overlapping),
            _ => {}
        }
        prop_assert_eq!(
            result.kpi.as_ref().map(|k| k.overlap_pairs > 0),
            Some(overlapping)
        );
    }

    #[test]
    fn tiers_escalate_only_after_failure(rows in rows()) {
        let request = build_request(&rows);
        let cache = campus();
        let result = TimetableOptimizer::bundled(&cache).with_config(config()).optimize(&request);

        let (last, earlier) = result.attempts.split_last().unwrap();
        for (attempt, tier) in earlier.iter().zip(Tier::ALL) {
            prop_assert_eq!(attempt.tier, tier);
            prop_assert!(matches!(
                attempt.status,
                SolverStatus::Infeasible | SolverStatus::Timeout | SolverStatus::ModelInvalid
            ));
        }
        if let ScheduleOutcome::Optimized { tier, status } = result.outcome {
            prop_assert_eq!(last.tier, tier);
            prop_assert_eq!(last.status, status);
        }
    }

    #[test]
    fn portfolio_matches_single_worker(costs in prop::collection::vec(0i64..50, 6..12)) {
        // groups of three with a chain of pairwise clashes
        let mut model = LinearModel::new("random");
        let vars: Vec<_> = (0..costs.len()).map(|i| model.add_var(format!("v{i}"))).collect();
        for chunk in vars.chunks(3) {
            model.add_exactly_one(chunk);
        }
        for (&var, &cost) in vars.iter().zip(&costs) {
            model.add_objective_term(var, cost);
        }
        for pair in vars.windows(4).step_by(2) {
            model.add_at_most_one(&[pair[0], pair[3]]);
        }

        let single = SolverConfig { num_workers: 1, time_limit_ms: 5_000, ..SolverConfig::default() };
        let many = SolverConfig { num_workers: 3, ..single.clone() };
        let a = BranchAndBoundSolver::new().solve(&model, &single);
        let b = BranchAndBoundSolver::new().solve(&model, &many);

        prop_assert_eq!(a.status, b.status);
        prop_assert_eq!(a.objective_value, b.objective_value);
        if a.is_solution_found() {
            prop_assert!(model.is_feasible(&a.values));
            prop_assert!(model.is_feasible(&b.values));
        }
    }
}
