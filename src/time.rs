//! Wall-clock time conversions.
//!
//! Lesson times arrive as `"HHMM"` strings (NUSMods style) and are handled
//! internally as minutes since midnight (0..=1439).

use crate::error::TimeParseError;
use log::warn;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses `"HHMM"` or `"HH:MM"` into minutes since midnight.
///
/// # Examples
/// ```
/// use u_timetable::time::parse_time;
///
/// assert_eq!(parse_time("0930"), Ok(570));
/// assert_eq!(parse_time("14:05"), Ok(845));
/// assert!(parse_time("25:00").is_err());
/// ```
pub fn parse_time(text: &str) -> Result<u32, TimeParseError> {
    let trimmed = text.trim();
    let (hours, minutes) = match trimmed.len() {
        4 => (trimmed.get(..2), trimmed.get(2..)),
        5 if trimmed.as_bytes()[2] == b':' => (trimmed.get(..2), trimmed.get(3..)),
        _ => return Err(TimeParseError::Malformed(text.to_string())),
    };

    let digits = |part: Option<&str>| -> Result<u32, TimeParseError> {
        match part {
            Some(p) if p.bytes().all(|b| b.is_ascii_digit()) => p
                .parse::<u32>()
                .map_err(|_| TimeParseError::Malformed(text.to_string())),
            _ => Err(TimeParseError::Malformed(text.to_string())),
        }
    };

    let hours = digits(hours)?;
    let minutes = digits(minutes)?;
    if hours >= 24 || minutes >= 60 {
        return Err(TimeParseError::OutOfRange(text.to_string()));
    }
    Ok(hours * 60 + minutes)
}

/// Lenient [`parse_time`]: malformed input maps to 0 (midnight).
///
/// The substitution is logged; it never fails.
pub fn time_to_minutes(text: &str) -> u32 {
    parse_time(text).unwrap_or_else(|err| {
        warn!("{err}; treating it as 00:00");
        0
    })
}

/// Formats minutes since midnight as `"HH:MM"`.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Preference-grid key (`"HH00"`) for an hour of the day.
pub fn hour_slot_key(hour: u32) -> String {
    format!("{hour:02}00")
}
