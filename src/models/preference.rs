//! Student time-preference grid.
//!
//! The grid marks, per day, which one-hour slots the student is willing to
//! attend. Slots are keyed `"HH00"` on the wire.
//!
//! # Default
//! A slot with no entry is treated as **available**. Only an explicit
//! `false` blocks an hour. Both the penalty and the score readings in
//! [`crate::preference`] share this default.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::Weekday;
use crate::time::{hour_slot_key, parse_time};

/// Wire shape: `{"Monday": {"0900": true, ...}, ...}`.
type RawGrid = BTreeMap<String, BTreeMap<String, bool>>;

/// Per-day, per-hour availability flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGrid", into = "RawGrid")]
pub struct PreferenceGrid {
    days: HashMap<Weekday, [Option<bool>; 24]>,
}

impl PreferenceGrid {
    /// Creates an empty grid (every hour available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one hour slot.
    pub fn with_slot(mut self, day: Weekday, hour: u32, preferred: bool) -> Self {
        self.set(day, hour, preferred);
        self
    }

    /// Sets a run of hours `[from_hour, to_hour)` on one day.
    pub fn with_hours(mut self, day: Weekday, from_hour: u32, to_hour: u32, preferred: bool) -> Self {
        for hour in from_hour..to_hour {
            self.set(day, hour, preferred);
        }
        self
    }

    /// Sets one hour slot; hours outside 0..24 are ignored.
    pub fn set(&mut self, day: Weekday, hour: u32, preferred: bool) {
        if let Some(slot) = self
            .days
            .entry(day)
            .or_insert([None; 24])
            .get_mut(hour as usize)
        {
            *slot = Some(preferred);
        }
    }

    /// Explicit entry for an hour, if any.
    pub fn entry(&self, day: Weekday, hour: u32) -> Option<bool> {
        self.days
            .get(&day)
            .and_then(|hours| hours.get(hour as usize).copied().flatten())
    }

    /// Whether the hour may be used (absent entries are available).
    #[inline]
    pub fn is_available(&self, day: Weekday, hour: u32) -> bool {
        self.entry(day, hour).unwrap_or(true)
    }

    /// Whether the hour is explicitly marked unavailable.
    #[inline]
    pub fn is_blocked(&self, day: Weekday, hour: u32) -> bool {
        !self.is_available(day, hour)
    }

    /// Number of explicitly preferred slots across the week.
    pub fn preferred_slot_count(&self) -> usize {
        self.days
            .values()
            .flat_map(|hours| hours.iter())
            .filter(|slot| **slot == Some(true))
            .count()
    }

    /// Whether the grid carries no entries at all.
    pub fn is_empty(&self) -> bool {
        self.days.values().all(|hours| hours.iter().all(Option::is_none))
    }
}

impl From<RawGrid> for PreferenceGrid {
    fn from(raw: RawGrid) -> Self {
        let mut grid = PreferenceGrid::new();
        for (day_key, slots) in raw {
            let day = match day_key.parse::<Weekday>() {
                Ok(day) => day,
                Err(err) => {
                    warn!("preference grid: {err}; skipping its slots");
                    continue;
                }
            };
            for (slot_key, preferred) in slots {
                match parse_time(&slot_key) {
                    Ok(minutes) => grid.set(day, minutes / 60, preferred),
                    Err(err) => warn!("preference grid {day}: {err}; slot skipped"),
                }
            }
        }
        grid
    }
}

impl From<PreferenceGrid> for RawGrid {
    fn from(grid: PreferenceGrid) -> Self {
        let mut raw = RawGrid::new();
        for (day, hours) in &grid.days {
            let slots: BTreeMap<String, bool> = hours
                .iter()
                .enumerate()
                .filter_map(|(hour, slot)| slot.map(|v| (hour_slot_key(hour as u32), v)))
                .collect();
            if !slots.is_empty() {
                raw.insert(day.to_string(), slots);
            }
        }
        raw
    }
}
