//! Timetable model construction.
//!
//! Translates modules, preferences and venue distances into a 0/1
//! [`LinearModel`](crate::lp::LinearModel): one boolean per candidate
//! lesson, hard selection and overlap constraints, and a weighted
//! objective over preference, travel, common start times and compactness.
//!
//! # Key Components
//!
//! - [`TimetableModelBuilder`]: derives candidates and pair relations once,
//!   then builds a fresh model per [`TierConfig`]
//! - [`LessonKey`]: structured variable identity
//! - [`LessonPairs`]: overlap, travel-tight and compact pairs
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §3 (student
//! sectioning as 0/1 programming)

mod candidate;
mod model;
mod pairs;

pub use candidate::{Candidate, LessonGroup, LessonKey};
pub use model::{TierConfig, TimetableModel, TimetableModelBuilder};
pub use pairs::{CompactPair, LessonPairs, TravelPair};
