//! Student timetable optimization.
//!
//! Picks exactly one section for every (module, lesson type) of a course
//! load so that lessons do not overlap, consecutive lessons leave time to
//! walk between venues, and the timetable respects the student's hourly
//! preferences.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Lesson`, `ModuleEntry`, `TimetableRequest`,
//!   `PreferenceGrid`, `Weekday`
//! - **`time`**: `HHMM` parsing and formatting
//! - **`geo`**: Venue catalog, coordinate extraction, haversine distance cache
//! - **`preference`**: Time-preference penalty and score
//! - **`lp`**: 0/1 linear model, `BinarySolver` trait, bundled branch and bound
//! - **`builder`**: Translation of lessons into a 0/1 model per tier
//! - **`optimizer`**: Tiered fallback, solution extraction, KPIs
//! - **`validation`**: Data-quality audit of requests
//! - **`config`**: Objective weights, walking model, solver limits
//!
//! # Architecture
//!
//! The combinatorial search sits behind [`lp::BinarySolver`]; the crate
//! owns the formulation and the relaxation policy. A [`geo::DistanceCache`]
//! is built once from the venue catalog and shared by reference.
//!
//! # Example
//!
//! ```
//! use u_timetable::geo::{DistanceCache, VenueCatalog};
//! use u_timetable::models::TimetableRequest;
//! use u_timetable::optimizer::TimetableOptimizer;
//!
//! let request = TimetableRequest::from_json_str(r#"{
//!     "modules": {
//!         "MA1521": {"timetable": [
//!             {"lessonType": "Lecture", "classNo": "1", "day": "Monday",
//!              "startTime": "0800", "endTime": "1000", "venue": "LT27"},
//!             {"lessonType": "Lecture", "classNo": "2", "day": "Monday",
//!              "startTime": "1400", "endTime": "1600", "venue": "LT27"}
//!         ]}
//!     },
//!     "constraints": {"preferredTimeSlots": {"Monday": {"0800": false, "0900": false}}}
//! }"#).unwrap();
//!
//! let cache = DistanceCache::new(&VenueCatalog::new());
//! let result = TimetableOptimizer::bundled(&cache).optimize(&request);
//! assert_eq!(result.modules["MA1521"].lessons()[0].class_no, "2");
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Wolsey (1998), "Integer Programming"

pub mod builder;
pub mod config;
pub mod error;
pub mod geo;
pub mod lp;
pub mod models;
pub mod optimizer;
pub mod preference;
pub mod time;
pub mod validation;
