//! Shared value types used across the store, the scheduling core and the API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Day of the teaching week. Persisted as 1 (Monday) through 7 (Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid day of week: {0}")]
pub struct ParseDayError(pub String);

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Database representation (1..=7)
    pub fn number(self) -> i16 {
        self as i16
    }

    /// Zero-based position, Monday = 0
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl TryFrom<i16> for DayOfWeek {
    type Error = ParseDayError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1..=7 => Ok(Self::ALL[(value - 1) as usize]),
            other => Err(ParseDayError(other.to_string())),
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = ParseDayError;

    /// Accepts full names, three-letter abbreviations (any case) and 1..7
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i16>() {
            return DayOfWeek::try_from(n);
        }
        let lower = trimmed.to_ascii_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == lower || (lower.len() == 3 && day.as_str().starts_with(&lower)))
            .ok_or_else(|| ParseDayError(s.to_string()))
    }
}

/// Accepts anything `FromStr` does, plus bare integers 1..7
impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i16),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => DayOfWeek::try_from(n),
            Raw::Name(name) => name.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde adapter for wall-clock times written as `HH:MM`. Seconds are
/// optional on input and written back only when non-zero.
pub mod clock_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Option<NaiveTime> {
        let value = value.trim();
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let format = if time.second() == 0 { "%H:%M" } else { "%H:%M:%S" };
        serializer.serialize_str(&time.format(format).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_names_abbreviations_and_numbers() {
        assert_eq!("Monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!("tue".parse::<DayOfWeek>().unwrap(), DayOfWeek::Tuesday);
        assert_eq!("7".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert!("0".parse::<DayOfWeek>().is_err());
        assert!("funday".parse::<DayOfWeek>().is_err());
        assert!("mo".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn days_order_from_monday() {
        assert!(DayOfWeek::Monday < DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::Friday.number(), 5);
        assert_eq!(DayOfWeek::Friday.index(), 4);
    }

    #[test]
    fn day_serializes_lowercase() {
        let json = serde_json::to_string(&DayOfWeek::Thursday).unwrap();
        assert_eq!(json, "\"thursday\"");
    }

    #[test]
    fn day_deserializes_from_names_or_numbers() {
        let days: Vec<DayOfWeek> = serde_json::from_str(r#"["Monday", "wed", 5]"#).unwrap();
        assert_eq!(days, vec![DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]);
        assert!(serde_json::from_str::<DayOfWeek>("8").is_err());
    }

    #[test]
    fn clock_time_accepts_optional_seconds() {
        let t = clock_time::parse("09:30").unwrap();
        assert_eq!(t, chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(clock_time::parse("09:30:15").unwrap(), chrono::NaiveTime::from_hms_opt(9, 30, 15).unwrap());
        assert!(clock_time::parse("25:00").is_none());
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "clock_time")]
        start: chrono::NaiveTime,
        #[serde(with = "clock_time")]
        end: chrono::NaiveTime,
    }

    #[test]
    fn clock_time_keeps_seconds_when_written_back() {
        let slot: Slot = serde_json::from_str(r#"{"start":"09:00:10","end":"09:00:50"}"#).unwrap();
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["start"], "09:00:10");
        assert_eq!(json["end"], "09:00:50");
        assert_eq!(serde_json::from_value::<Slot>(json).unwrap(), slot);

        let whole: Slot = serde_json::from_str(r#"{"start":"09:00:00","end":"10:30"}"#).unwrap();
        let json = serde_json::to_value(&whole).unwrap();
        assert_eq!((json["start"].as_str(), json["end"].as_str()), (Some("09:00"), Some("10:30")));
    }
}
