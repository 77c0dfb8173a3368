//! Module entries and the optimization request.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{Lesson, PreferenceGrid};
use crate::error::RequestError;

/// One module in the course load.
///
/// On input, `timetable` lists every candidate lesson. On output it lists
/// only the selected ones. Modules without a timetable are passed through
/// untouched, including any extra fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    /// Module code, e.g. `"CS2103T"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_code: Option<String>,
    /// Candidate (input) or selected (output) lessons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timetable: Option<Vec<Lesson>>,
    /// Pass-through fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleEntry {
    /// Creates a module with the given candidate lessons.
    pub fn with_lessons(lessons: Vec<Lesson>) -> Self {
        Self {
            module_code: None,
            timetable: Some(lessons),
            extra: Map::new(),
        }
    }

    /// Candidate lessons, empty when the module has no timetable.
    pub fn lessons(&self) -> &[Lesson] {
        self.timetable.as_deref().unwrap_or(&[])
    }

    /// Whether the module contributes anything to optimize.
    pub fn has_timetable(&self) -> bool {
        !self.lessons().is_empty()
    }

    /// Lenient parse: lessons that fail to deserialize are dropped and logged.
    fn from_value_lenient(code: &str, value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            warn!("module {code}: entry is not an object; skipped");
            return None;
        };

        let timetable = match object.remove("timetable") {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, item)| match serde_json::from_value::<Lesson>(item) {
                        Ok(lesson) => Some(lesson),
                        Err(err) => {
                            warn!("module {code}: lesson #{i} unparseable ({err}); skipped");
                            None
                        }
                    })
                    .collect(),
            ),
            Some(Value::Null) | None => None,
            Some(_) => {
                warn!("module {code}: timetable is not a list; ignored");
                None
            }
        };

        let module_code = match object.remove("moduleCode") {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                object.insert("moduleCode".into(), other);
                None
            }
            None => None,
        };

        Some(Self {
            module_code,
            timetable,
            extra: object,
        })
    }
}

/// User constraints attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableConstraints {
    /// Per-day, per-hour availability.
    #[serde(default)]
    pub preferred_time_slots: PreferenceGrid,
}

/// Input to the optimizer.
///
/// # Example
/// ```
/// use u_timetable::models::TimetableRequest;
///
/// let request = TimetableRequest::from_json_str(r#"{
///     "modules": {
///         "CS2103T": {"timetable": [
///             {"lessonType": "Lecture", "classNo": "1", "day": "Friday",
///              "startTime": "1400", "endTime": "1600", "venue": "LT17"}
///         ]}
///     },
///     "constraints": {"preferredTimeSlots": {"Friday": {"1400": true}}}
/// }"#).unwrap();
/// assert_eq!(request.lesson_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableRequest {
    /// Modules keyed by module code.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
    /// Preference constraints.
    #[serde(default)]
    pub constraints: TimetableConstraints,
}

impl TimetableRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module.
    pub fn with_module(mut self, code: impl Into<String>, module: ModuleEntry) -> Self {
        self.modules.insert(code.into(), module);
        self
    }

    /// Sets the preference grid.
    pub fn with_preferences(mut self, grid: PreferenceGrid) -> Self {
        self.constraints.preferred_time_slots = grid;
        self
    }

    /// Total number of candidate lessons across all modules.
    pub fn lesson_count(&self) -> usize {
        self.modules.values().map(|m| m.lessons().len()).sum()
    }

    /// Parses a request from JSON text, tolerating bad entries.
    pub fn from_json_str(json: &str) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parses a request from a JSON value, tolerating bad entries.
    ///
    /// Module entries and lessons that cannot be read are skipped with a
    /// warning. A malformed `constraints` block degrades to no preferences.
    /// Only a non-object payload is an error.
    pub fn from_value(value: Value) -> Result<Self, RequestError> {
        let Value::Object(mut root) = value else {
            return Err(RequestError::NotAnObject);
        };

        let mut modules = BTreeMap::new();
        match root.remove("modules") {
            Some(Value::Object(entries)) => {
                for (code, entry) in entries {
                    if let Some(module) = ModuleEntry::from_value_lenient(&code, entry) {
                        modules.insert(code, module);
                    }
                }
            }
            Some(Value::Null) | None => {}
            Some(_) => warn!("request: `modules` is not an object; ignored"),
        }

        let constraints = match root.remove("constraints") {
            Some(raw) if !raw.is_null() => serde_json::from_value(raw).unwrap_or_else(|err| {
                warn!("request: constraints unreadable ({err}); using no preferences");
                TimetableConstraints::default()
            }),
            _ => TimetableConstraints::default(),
        };

        Ok(Self {
            modules,
            constraints,
        })
    }
}
