//! Input validation for timetable requests.
//!
//! Audits a request for data-quality defects before optimization.
//! Detects:
//! - Malformed or inverted lesson times
//! - Venues missing from the venue catalog
//! - Repeated lesson rows within a module
//! - Modules carrying an empty timetable
//!
//! Findings are advisory: the optimizer logs them and carries on with its
//! lenient defaults (midnight for bad times, fixed distances for unknown
//! venues).

use std::collections::{BTreeSet, HashSet};

use crate::geo::DistanceCache;
use crate::models::TimetableRequest;
use crate::time::parse_time;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A start or end time is not `HHMM` / `HH:MM`.
    MalformedTime,
    /// A lesson does not end after it starts.
    NonPositiveDuration,
    /// A lesson references a venue the catalog does not know.
    UnknownVenue,
    /// The same lesson row appears twice in a module.
    DuplicateSection,
    /// A module lists a timetable with no lessons.
    EmptyTimetable,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a timetable request.
///
/// Checks:
/// 1. Every timetable that is present has at least one lesson
/// 2. Start and end times parse
/// 3. Every lesson ends after it starts
/// 4. No lesson row (type, section, day, times) is repeated in a module
/// 5. Every non-empty venue is known to `cache` (reported once per venue)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &TimetableRequest, cache: &DistanceCache) -> ValidationResult {
    let mut errors = Vec::new();
    let mut unknown_venues = BTreeSet::new();

    for (code, module) in &request.modules {
        if module.timetable.as_ref().is_some_and(|t| t.is_empty()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyTimetable,
                format!("Module '{code}' has an empty timetable"),
            ));
        }

        let mut rows = HashSet::new();
        for lesson in module.lessons() {
            let label = format!("{code} {} {}", lesson.lesson_type, lesson.class_no);

            let start = parse_time(&lesson.start_time);
            let end = parse_time(&lesson.end_time);
            for (field, parsed) in [("start", &start), ("end", &end)] {
                if let Err(err) = parsed {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MalformedTime,
                        format!("Lesson '{label}' has a bad {field} time: {err}"),
                    ));
                }
            }
            if let (Ok(start), Ok(end)) = (start, end) {
                if end <= start {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::NonPositiveDuration,
                        format!(
                            "Lesson '{label}' ends ({}) before it starts ({})",
                            lesson.end_time, lesson.start_time
                        ),
                    ));
                }
            }

            let row = (
                lesson.lesson_type.as_str(),
                lesson.class_no.as_str(),
                lesson.day,
                lesson.start_time.as_str(),
                lesson.end_time.as_str(),
            );
            if !rows.insert(row) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateSection,
                    format!("Lesson '{label}' on {} is listed twice", lesson.day),
                ));
            }

            if !lesson.venue.is_empty() && !cache.contains_venue(&lesson.venue) {
                unknown_venues.insert(lesson.venue.as_str());
            }
        }
    }

    for venue in unknown_venues {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownVenue,
            format!("Venue '{venue}' is not in the venue catalog"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
