//! Precomputed venue-pair distance cache.
//!
//! # Concurrency
//! The cache is `Send + Sync` and may be shared by concurrent optimizer
//! runs. Reads take a shared lock; the lazy insert on a miss takes the
//! write lock and uses `entry().or_insert`, so racing writers agree on one
//! value and no entry is lost.

use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{haversine_distance, Coordinate, VenueCatalog};
use crate::error::{CoordinateError, DistanceDefect};

/// Distance assumed when a venue is missing from the catalog: far, but
/// not infinitely so.
pub const UNKNOWN_VENUE_DISTANCE_M: f64 = 1000.0;

/// Distance assumed when a catalogued venue has unusable coordinates.
pub const MALFORMED_COORDINATE_DISTANCE_M: f64 = 500.0;

/// Unordered venue pair; the lexicographically smaller id comes first.
type VenuePair = (String, String);

fn pair_key(a: &str, b: &str) -> VenuePair {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Great-circle distances between venues, in meters.
///
/// # Example
/// ```
/// use u_timetable::geo::{Coordinate, DistanceCache, VenueCatalog};
///
/// let catalog = VenueCatalog::new()
///     .with_venue("LT17", Coordinate::new(103.7805, 1.2935))
///     .with_venue("COM1", Coordinate::new(103.7737, 1.2950));
/// let cache = DistanceCache::new(&catalog);
///
/// assert_eq!(cache.distance("LT17", "LT17"), 0.0);
/// assert_eq!(cache.distance("LT17", "COM1"), cache.distance("COM1", "LT17"));
/// assert_eq!(cache.distance("LT17", "NOWHERE"), 1000.0);
/// ```
#[derive(Debug)]
pub struct DistanceCache {
    locations: HashMap<String, Result<Coordinate, CoordinateError>>,
    entries: RwLock<HashMap<VenuePair, f64>>,
}

impl DistanceCache {
    /// Builds the cache, computing every catalogued pair up front.
    ///
    /// O(V²) distance evaluations for V venues.
    pub fn new(catalog: &VenueCatalog) -> Self {
        let locations: HashMap<String, Result<Coordinate, CoordinateError>> = catalog
            .iter()
            .map(|venue| (venue.id.clone(), venue.location.clone()))
            .collect();

        let ids: Vec<&String> = catalog.iter().map(|venue| &venue.id).collect();
        let mut entries = HashMap::with_capacity(ids.len() * (ids.len() + 1) / 2);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i..] {
                let meters = if a == b {
                    0.0
                } else {
                    Self::compute(&locations, a, b).unwrap_or_else(|defect| substitute(&defect))
                };
                entries.insert(pair_key(a, b), meters);
            }
        }
        debug!(
            "distance matrix computed for {} venues ({} pairs)",
            ids.len(),
            entries.len()
        );

        Self {
            locations,
            entries: RwLock::new(entries),
        }
    }

    /// Distance between two venues in meters.
    ///
    /// Never fails: a venue id equal to itself is 0 m, an unknown venue
    /// counts as [`UNKNOWN_VENUE_DISTANCE_M`] and unusable coordinates as
    /// [`MALFORMED_COORDINATE_DISTANCE_M`]. Substitutions are logged and
    /// cached.
    pub fn distance(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 0.0;
        }
        let key = pair_key(a, b);
        if let Some(&meters) = self.entries.read().get(&key) {
            return meters;
        }

        let meters = self.resolve(a, b).unwrap_or_else(|defect| {
            let fallback = substitute(&defect);
            warn!("distance {a} <-> {b}: {defect}; assuming {fallback} m");
            fallback
        });
        *self.entries.write().entry(key).or_insert(meters)
    }

    /// Computes the distance, reporting why it cannot be derived from data.
    ///
    /// Does not consult or fill the cache.
    pub fn resolve(&self, a: &str, b: &str) -> Result<f64, DistanceDefect> {
        if a == b {
            return Ok(0.0);
        }
        Self::compute(&self.locations, a, b)
    }

    /// Whether the venue was in the catalog the cache was built from.
    pub fn contains_venue(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    /// Number of cached pairs (self-pairs included).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn compute(
        locations: &HashMap<String, Result<Coordinate, CoordinateError>>,
        a: &str,
        b: &str,
    ) -> Result<f64, DistanceDefect> {
        // unknown venues take precedence over malformed ones
        if let Some(unknown) = [a, b].into_iter().find(|id| !locations.contains_key(*id)) {
            return Err(DistanceDefect::UnknownVenue(unknown.to_string()));
        }
        let locate = |id: &str| match locations.get(id) {
            None => Err(DistanceDefect::UnknownVenue(id.to_string())),
            Some(Err(err)) => Err(DistanceDefect::MalformedCoordinate {
                venue: id.to_string(),
                source: err.clone(),
            }),
            Some(Ok(coordinate)) => Ok(*coordinate),
        };
        Ok(haversine_distance(locate(a)?, locate(b)?))
    }
}

fn substitute(defect: &DistanceDefect) -> f64 {
    match defect {
        DistanceDefect::UnknownVenue(_) => UNKNOWN_VENUE_DISTANCE_M,
        DistanceDefect::MalformedCoordinate { .. } => MALFORMED_COORDINATE_DISTANCE_M,
    }
}
