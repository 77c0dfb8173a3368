//! Lesson (candidate section) model.
//!
//! A lesson is one concrete offering of a module's lesson type: a fixed
//! day, time window, and venue. Exactly one lesson per (module, lesson type)
//! ends up in the optimized timetable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::time::time_to_minutes;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// English day name, as used in the JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    /// Case-insensitive; accepts full names and three-letter abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| {
                let name = d.as_str().to_ascii_lowercase();
                lower == name || (lower.len() == 3 && name.starts_with(&lower))
            })
            .ok_or_else(|| format!("unknown weekday {s:?}"))
    }
}

/// A candidate lesson section.
///
/// Any field not modelled here (weeks, size, covidZone, ...) is kept in
/// `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Lesson type, e.g. `"Lecture"` or `"Tutorial"`.
    pub lesson_type: String,
    /// Section identifier within the lesson type.
    #[serde(rename = "classNo", alias = "sectionId")]
    pub class_no: String,
    /// Day the lesson takes place.
    pub day: Weekday,
    /// Start time, `"HHMM"`.
    pub start_time: String,
    /// End time, `"HHMM"`.
    pub end_time: String,
    /// Venue identifier (empty when the section has no venue).
    #[serde(default, alias = "venueId")]
    pub venue: String,
    /// Pass-through fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Lesson {
    /// Creates a lesson with no extra fields.
    pub fn new(
        lesson_type: impl Into<String>,
        class_no: impl Into<String>,
        day: Weekday,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        venue: impl Into<String>,
    ) -> Self {
        Self {
            lesson_type: lesson_type.into(),
            class_no: class_no.into(),
            day,
            start_time: start_time.into(),
            end_time: end_time.into(),
            venue: venue.into(),
            extra: Map::new(),
        }
    }

    /// Resolves the lesson's time window in minutes.
    ///
    /// Malformed times fall back to midnight (see [`time_to_minutes`]).
    pub fn span(&self) -> LessonSpan {
        LessonSpan::new(
            self.day,
            time_to_minutes(&self.start_time),
            time_to_minutes(&self.end_time),
        )
    }
}

/// A lesson's day and `[start, end)` window in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LessonSpan {
    /// Day of the week.
    pub day: Weekday,
    /// Start minute (inclusive).
    pub start: u32,
    /// End minute (exclusive).
    pub end: u32,
}

impl LessonSpan {
    /// Creates a span.
    pub fn new(day: Weekday, start: u32, end: u32) -> Self {
        Self { day, start, end }
    }

    /// Length in minutes; non-positive windows report a negative value.
    #[inline]
    pub fn duration(&self) -> i64 {
        i64::from(self.end) - i64::from(self.start)
    }

    /// Whether two spans share a day and intersect.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }

    /// Minutes between the end of the earlier span and the start of the
    /// later one, for same-day spans that do not overlap.
    pub fn gap_to(&self, other: &Self) -> Option<u32> {
        if self.day != other.day || self.overlaps(other) {
            return None;
        }
        if self.end <= other.start {
            Some(other.start - self.end)
        } else {
            Some(self.start.saturating_sub(other.end))
        }
    }
}
