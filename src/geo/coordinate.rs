//! Geographic coordinates and the haversine distance.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoordinateError;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude (x), -180..=180.
    pub longitude: f64,
    /// Latitude (y), -90..=90.
    pub latitude: f64,
}

impl Coordinate {
    /// Creates a coordinate.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Extracts a coordinate from a venue record.
    ///
    /// Accepted shapes, tried in order:
    /// - `{"location": {"x": lon, "y": lat}}` (NUSMods venue file)
    /// - `{"location": {"longitude": .., "latitude": ..}}`
    /// - flat `{"x": .., "y": ..}`, `{"longitude": .., "latitude": ..}`
    ///   or `{"lng": .., "lat": ..}`
    ///
    /// Numeric strings are accepted. Nothing is defaulted here; the caller
    /// decides what a failure means.
    pub fn extract(record: &Value) -> Result<Self, CoordinateError> {
        let source = match record.get("location") {
            Some(location) if location.is_object() => location,
            _ => record,
        };

        const FIELD_PAIRS: [(&str, &str); 3] =
            [("x", "y"), ("longitude", "latitude"), ("lng", "lat")];

        for (lon_key, lat_key) in FIELD_PAIRS {
            if let (Some(lon), Some(lat)) = (source.get(lon_key), source.get(lat_key)) {
                let coordinate = Self::new(number(lon, lon_key)?, number(lat, lat_key)?);
                return coordinate.checked();
            }
        }
        Err(CoordinateError::MissingLocation)
    }

    fn checked(self) -> Result<Self, CoordinateError> {
        let in_range = self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude);
        if in_range {
            Ok(self)
        } else {
            Err(CoordinateError::OutOfRange {
                longitude: self.longitude,
                latitude: self.latitude,
            })
        }
    }
}

fn number(value: &Value, field: &'static str) -> Result<f64, CoordinateError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(CoordinateError::NotANumber(field)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinateError::NotANumber(field)),
        _ => Err(CoordinateError::NotANumber(field)),
    }
}

/// Great-circle distance in meters between two coordinates.
///
/// # Formula
/// `a = sin²(Δφ/2) + cos φ₁ · cos φ₂ · sin²(Δλ/2)`,
/// `d = 2R · asin(√a)`
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
