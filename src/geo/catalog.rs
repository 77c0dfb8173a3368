//! Venue catalog loading.

use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use super::Coordinate;
use crate::error::{CatalogError, CoordinateError};

/// A catalogued venue.
///
/// The coordinate keeps its extraction result so that a defective record
/// stays distinguishable from an unknown venue.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    /// Venue identifier, e.g. `"COM1-0201"`.
    pub id: String,
    /// Extracted position, or why it could not be read.
    pub location: Result<Coordinate, CoordinateError>,
}

/// Immutable venue id → coordinate reference data.
#[derive(Debug, Clone, Default)]
pub struct VenueCatalog {
    venues: BTreeMap<String, Venue>,
}

impl VenueCatalog {
    /// Creates an empty catalog. Every distance then defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a venue with a known coordinate.
    pub fn with_venue(mut self, id: impl Into<String>, coordinate: Coordinate) -> Self {
        let id = id.into();
        self.venues.insert(
            id.clone(),
            Venue {
                id,
                location: Ok(coordinate),
            },
        );
        self
    }

    /// Builds a catalog from a JSON object keyed by venue id.
    ///
    /// Records whose coordinates cannot be extracted are kept (marked
    /// defective) and logged.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(records) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut venues = BTreeMap::new();
        for (id, record) in records {
            let location = Coordinate::extract(&record);
            if let Err(err) = &location {
                warn!("venue {id}: {err}; distances involving it will use a default");
            }
            venues.insert(id.clone(), Venue { id, location });
        }
        Ok(Self { venues })
    }

    /// Parses a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Loads a catalog file.
    ///
    /// A missing file is not an error: the optimizer proceeds with an
    /// empty catalog and every distance falls back to the unknown-venue
    /// default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("{} not found; using an empty venue catalog", path.display());
                return Ok(Self::new());
            }
            Err(err) => return Err(err.into()),
        };
        let catalog = Self::from_json_str(&text)?;
        info!("Loaded {} venue locations from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Looks up a venue.
    pub fn get(&self, id: &str) -> Option<&Venue> {
        self.venues.get(id)
    }

    /// Whether the venue is catalogued (with or without usable coordinates).
    pub fn contains(&self, id: &str) -> bool {
        self.venues.contains_key(id)
    }

    /// Iterates venues in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Venue> {
        self.venues.values()
    }

    /// Number of catalogued venues.
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}
