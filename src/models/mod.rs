//! Timetable domain models.
//!
//! Provides the input and output types of the optimizer. Shapes follow the
//! NUSMods JSON conventions (`lessonType`, `classNo`, `startTime` as
//! `"HHMM"`), and unknown fields are preserved so a selected lesson can be
//! returned exactly as it was received.
//!
//! # Domain Mappings
//!
//! | Type | University |
//! |------|-----------|
//! | ModuleEntry | Course/Module |
//! | Lesson | Class section |
//! | Lesson type | Lecture/Tutorial/Lab |
//! | PreferenceGrid | Student availability |

mod lesson;
mod module;
mod preference;

pub use lesson::{Lesson, LessonSpan, Weekday};
pub use module::{ModuleEntry, TimetableConstraints, TimetableRequest};
pub use preference::PreferenceGrid;
