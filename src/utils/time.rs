//! Timecode parsing and formatting utilities
//!
//! Seconds (`f64`) are the canonical unit everywhere in the crate; the
//! `HH:MM:SS[.fff]` text form only exists at the JSON and text-track edges.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MixtapeError, MixtapeResult};

static TIMECODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2,}):([0-9]{2}):([0-9]{2}(?:\.[0-9]+)?)$").expect("timecode pattern is valid")
});

/// Parse `HH:MM:SS[.fraction]` into seconds
pub fn parse_timecode(text: &str) -> MixtapeResult<f64> {
    let malformed = || MixtapeError::MalformedTimecode {
        value: text.to_string(),
        location: None,
    };

    let captures = TIMECODE.captures(text.trim()).ok_or_else(malformed)?;
    let hours: f64 = captures[1].parse().map_err(|_| malformed())?;
    let minutes: f64 = captures[2].parse().map_err(|_| malformed())?;
    let seconds: f64 = captures[3].parse().map_err(|_| malformed())?;

    Ok(((hours * 60.0) + minutes) * 60.0 + seconds)
}

/// Format seconds as `HH:MM:SS.fff`
///
/// Rounds to the millisecond first so the seconds field never reads `60.000`.
pub fn format_timecode(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
}

/// A time field from the batch description: either seconds or a timecode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    /// Already in seconds
    Seconds(f64),
    /// `HH:MM:SS[.fff]` text
    Timecode(String),
}

impl TimeValue {
    /// Decode into seconds; numbers pass through unchanged
    pub fn to_seconds(&self) -> MixtapeResult<f64> {
        match self {
            TimeValue::Seconds(seconds) => Ok(*seconds),
            TimeValue::Timecode(text) => parse_timecode(text),
        }
    }
}

impl From<f64> for TimeValue {
    fn from(seconds: f64) -> Self {
        TimeValue::Seconds(seconds)
    }
}

impl From<&str> for TimeValue {
    fn from(text: &str) -> Self {
        TimeValue::Timecode(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_parse_full_timecode() {
        assert_close(parse_timecode("01:02:03.456").unwrap(), 3723.456);
        assert_eq!(parse_timecode("00:01:30.000").unwrap(), 90.0);
    }

    #[test]
    fn test_parse_without_fraction() {
        assert_eq!(parse_timecode("00:00:07").unwrap(), 7.0);
    }

    #[test]
    fn test_parse_long_hours() {
        assert_eq!(parse_timecode("100:00:00.000").unwrap(), 360_000.0);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for text in ["1:30", "01:30.5", "abc", "00:00:7", "00:00:07.", ""] {
            match parse_timecode(text) {
                Err(MixtapeError::MalformedTimecode { value, .. }) => assert_eq!(value, text),
                other => panic!("{text:?} should be malformed, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_format_pads_fields() {
        assert_eq!(format_timecode(0.0), "00:00:00.000");
        assert_eq!(format_timecode(3723.456), "01:02:03.456");
        assert_eq!(format_timecode(59.9996), "00:01:00.000");
    }

    #[test]
    fn test_round_trip_within_a_millisecond() {
        let mut value = 0.0;
        while value < 200_000.0 {
            let back = parse_timecode(&format_timecode(value)).unwrap();
            assert!((back - value).abs() <= 0.001, "{value} came back as {back}");
            value = value * 1.7 + 0.0137;
        }
    }

    #[test]
    fn test_time_value_numbers_pass_through() {
        assert_eq!(TimeValue::Seconds(12.25).to_seconds().unwrap(), 12.25);
        assert_eq!(TimeValue::from("00:00:12.250").to_seconds().unwrap(), 12.25);
    }

    #[test]
    fn test_time_value_deserializes_both_forms() {
        let values: Vec<TimeValue> = serde_json::from_str(r#"[5, 2.5, "00:00:01.000"]"#).unwrap();
        assert_eq!(values[0], TimeValue::Seconds(5.0));
        assert_eq!(values[1], TimeValue::Seconds(2.5));
        assert_eq!(values[2], TimeValue::Timecode("00:00:01.000".to_string()));
    }
}
