//! Solution extraction.

use std::collections::BTreeMap;

use crate::builder::{TimetableModel, TimetableModelBuilder};
use crate::lp::Solution;
use crate::models::{Lesson, ModuleEntry};

/// Selection flag per candidate, in candidate order.
pub fn selected_candidates(built: &TimetableModel, solution: &Solution) -> Vec<bool> {
    built
        .lesson_vars()
        .iter()
        .map(|&var| solution.value(var))
        .collect()
}

/// Rebuilds the module map with only the selected lessons.
///
/// Selected lessons keep their input order. Modules without candidate
/// lessons are returned unchanged; every other module gets its
/// `moduleCode` filled from the map key when absent.
pub fn extract_modules(
    modules: &BTreeMap<String, ModuleEntry>,
    builder: &TimetableModelBuilder<'_>,
    selected: &[bool],
) -> BTreeMap<String, ModuleEntry> {
    let mut chosen: BTreeMap<&str, Vec<(usize, &Lesson)>> = BTreeMap::new();
    for (candidate, _) in builder
        .candidates()
        .iter()
        .zip(selected)
        .filter(|(_, is_selected)| **is_selected)
    {
        chosen
            .entry(candidate.key.module.as_str())
            .or_default()
            .push((candidate.key.ordinal, candidate.lesson));
    }

    modules
        .iter()
        .map(|(code, module)| {
            if !module.has_timetable() {
                return (code.clone(), module.clone());
            }
            let mut lessons = chosen.remove(code.as_str()).unwrap_or_default();
            lessons.sort_by_key(|(ordinal, _)| *ordinal);
            let entry = ModuleEntry {
                module_code: Some(module.module_code.clone().unwrap_or_else(|| code.clone())),
                timetable: Some(lessons.into_iter().map(|(_, lesson)| lesson.clone()).collect()),
                extra: module.extra.clone(),
            };
            (code.clone(), entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TierConfig;
    use crate::config::OptimizerConfig;
    use crate::geo::{DistanceCache, VenueCatalog};
    use crate::lp::SolverStatus;
    use crate::models::{PreferenceGrid, Weekday};
    use serde_json::json;

    #[test]
    fn test_extract_keeps_selected_in_input_order() {
        let mut modules = BTreeMap::new();
        let mut with_extra = ModuleEntry::with_lessons(vec![
            Lesson::new("Tutorial", "T1", Weekday::Monday, "0900", "1000", ""),
            Lesson::new("Lecture", "1", Weekday::Tuesday, "1000", "1200", ""),
            Lesson::new("Tutorial", "T2", Weekday::Monday, "1100", "1200", ""),
        ]);
        with_extra.extra.insert("title".into(), json!("Discrete Structures"));
        modules.insert("CS1231".to_string(), with_extra);
        let mut untouched = ModuleEntry::default();
        untouched.extra.insert("note".into(), json!("no classes"));
        modules.insert("CFG1002".to_string(), untouched.clone());

        let grid = PreferenceGrid::new();
        let cache = DistanceCache::new(&VenueCatalog::new());
        let config = OptimizerConfig::default();
        let builder = TimetableModelBuilder::new(&modules, &grid, &cache, &config);
        let built = builder.build(&TierConfig::strict());

        // candidates: Lecture 1, Tutorial T1, Tutorial T2
        let mut solution = Solution::empty(SolverStatus::Optimal);
        solution.values = vec![true, false, true];
        let selected = selected_candidates(&built, &solution);
        assert_eq!(selected, vec![true, false, true]);

        let output = extract_modules(&modules, &builder, &selected);
        assert_eq!(output["CFG1002"], untouched);

        let cs = &output["CS1231"];
        assert_eq!(cs.module_code.as_deref(), Some("CS1231"));
        assert_eq!(cs.extra["title"], json!("Discrete Structures"));
        let picked: Vec<&str> = cs.lessons().iter().map(|l| l.class_no.as_str()).collect();
        assert_eq!(picked, vec!["1", "T2"]);
    }
}
