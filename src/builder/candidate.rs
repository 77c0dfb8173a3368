//! Candidate lessons and their selection groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Lesson, LessonSpan, ModuleEntry};

/// Structured identity of one decision variable.
///
/// `ordinal` is the lesson's position in its module's timetable, so two
/// identical (module, type, section) rows still get distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LessonKey {
    /// Module code.
    pub module: String,
    /// Lesson type.
    pub lesson_type: String,
    /// Section identifier.
    pub section: String,
    /// Position in the module's timetable.
    pub ordinal: usize,
}

impl fmt::Display for LessonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}#{}",
            self.module, self.lesson_type, self.section, self.ordinal
        )
    }
}

/// A lesson eligible for selection.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Variable key.
    pub key: LessonKey,
    /// The input lesson.
    pub lesson: &'a Lesson,
    /// Resolved time window.
    pub span: LessonSpan,
    /// Index into the builder's groups.
    pub group: usize,
}

/// All candidates of one (module, lesson type); exactly one is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonGroup {
    /// Module code.
    pub module: String,
    /// Lesson type.
    pub lesson_type: String,
    /// Candidate indices.
    pub members: Vec<usize>,
}

/// Flattens modules into candidates, grouped by (module, lesson type).
///
/// Groups are ordered by module code, then lesson type; candidates follow
/// group order so every group's members are contiguous.
pub(crate) fn collect_candidates(
    modules: &BTreeMap<String, ModuleEntry>,
) -> (Vec<Candidate<'_>>, Vec<LessonGroup>) {
    let mut by_group: BTreeMap<(&str, &str), Vec<(usize, &Lesson)>> = BTreeMap::new();
    for (code, module) in modules {
        for (ordinal, lesson) in module.lessons().iter().enumerate() {
            by_group
                .entry((code.as_str(), lesson.lesson_type.as_str()))
                .or_default()
                .push((ordinal, lesson));
        }
    }

    let mut candidates = Vec::new();
    let mut groups = Vec::with_capacity(by_group.len());
    for ((module, lesson_type), lessons) in by_group {
        let group = groups.len();
        let mut members = Vec::with_capacity(lessons.len());
        for (ordinal, lesson) in lessons {
            members.push(candidates.len());
            candidates.push(Candidate {
                key: LessonKey {
                    module: module.to_string(),
                    lesson_type: lesson_type.to_string(),
                    section: lesson.class_no.clone(),
                    ordinal,
                },
                lesson,
                span: lesson.span(),
                group,
            });
        }
        groups.push(LessonGroup {
            module: module.to_string(),
            lesson_type: lesson_type.to_string(),
            members,
        });
    }
    (candidates, groups)
}
