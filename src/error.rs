//! Error and defect types.
//!
//! Two families live here:
//!
//! - **Defects** ([`TimeParseError`], [`CoordinateError`], [`DistanceDefect`]):
//!   data-quality problems found in otherwise usable input. They are
//!   returned as explicit `Result` values so every substitution point can
//!   choose its own default and log it. None of them ever reaches the
//!   caller of [`TimetableOptimizer::optimize`](crate::optimizer::TimetableOptimizer::optimize).
//! - **Boundary errors** ([`RequestError`], [`CatalogError`]): raised only
//!   while turning raw JSON or files into domain types.

use thiserror::Error;

/// A wall-clock string that is not a valid `HHMM` / `HH:MM` time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// Input is neither 4 digits nor `HH:MM`.
    #[error("malformed time string {0:?}")]
    Malformed(String),
    /// Hour or minute outside the clock range.
    #[error("time {0:?} is out of range")]
    OutOfRange(String),
}

/// A venue record whose coordinate could not be extracted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// The record has no recognizable coordinate fields.
    #[error("no coordinate fields found")]
    MissingLocation,
    /// A coordinate field exists but is not numeric.
    #[error("field {0:?} is not a number")]
    NotANumber(&'static str),
    /// Longitude/latitude outside the valid geographic range.
    #[error("coordinate ({longitude}, {latitude}) out of range")]
    OutOfRange {
        /// Parsed longitude.
        longitude: f64,
        /// Parsed latitude.
        latitude: f64,
    },
}

/// Why a venue-pair distance had to be substituted with a default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceDefect {
    /// The venue is not present in the catalog.
    #[error("unknown venue {0:?}")]
    UnknownVenue(String),
    /// The venue is catalogued but its coordinate is unusable.
    #[error("venue {venue:?} has unusable coordinates: {source}")]
    MalformedCoordinate {
        /// Offending venue id.
        venue: String,
        /// Underlying extraction failure.
        source: CoordinateError,
    },
}

/// Failure to read an optimization request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The payload is not valid JSON.
    #[error("invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload is JSON but not an object.
    #[error("request must be a JSON object")]
    NotAnObject,
}

/// Failure to load the venue catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file exists but could not be read.
    #[error("cannot read venue catalog: {0}")]
    Io(#[from] std::io::Error),
    /// The catalog is not valid JSON.
    #[error("invalid venue catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The catalog is JSON but not an object keyed by venue id.
    #[error("venue catalog must be a JSON object keyed by venue id")]
    NotAnObject,
}
