//! Venue geography and walking distances.
//!
//! - [`Coordinate`]: longitude/latitude pair, extracted tolerantly from
//!   heterogeneous venue records.
//! - [`VenueCatalog`]: venue id → coordinate, loaded once per process.
//! - [`DistanceCache`]: great-circle distances for every catalogued venue
//!   pair, precomputed at construction and extended lazily on misses.
//!
//! # Reference
//! Sinnott (1984), "Virtues of the Haversine", Sky and Telescope 68(2)

mod cache;
mod catalog;
mod coordinate;

pub use cache::{DistanceCache, MALFORMED_COORDINATE_DISTANCE_M, UNKNOWN_VENUE_DISTANCE_M};
pub use catalog::{Venue, VenueCatalog};
pub use coordinate::{haversine_distance, Coordinate, EARTH_RADIUS_M};
