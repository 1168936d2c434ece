//! Core type definitions with validation.

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The time string was not a zero-padded 24-hour `HH:MM` value.
    #[error("invalid time of day {value:?}, expected zero-padded HH:MM")]
    InvalidTimeOfDay { value: String },

    /// The month number was outside 1–12.
    #[error("month must be between 1 and 12, got {value}")]
    MonthOutOfRange { value: u32 },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated bird identifier.
    ///
    /// Bird IDs are the keys of the `birds` table in the catalog file
    /// (e.g., "robin", "blackbird").
    BirdId, "bird ID"
);

define_string_id!(
    /// A validated season identifier.
    ///
    /// Season IDs are the keys of the `seasons` table in the catalog file and
    /// link quiet hours and bird schedules to a set of months.
    SeasonId, "season ID"
);

/// Pre-compiled pattern for zero-padded 24-hour times.
static TIME_OF_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").unwrap());

const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute resolution, stored as minutes since midnight.
///
/// Ordering matches the lexicographic ordering of the `HH:MM` strings it is
/// parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight, the first minute of the day.
    pub const MIDNIGHT: Self = Self(0);

    /// Creates a time of day from hour and minute components.
    ///
    /// Returns `None` if `hour > 23` or `minute > 59`.
    #[must_use]
    pub const fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Creates a time of day from minutes since midnight.
    ///
    /// Returns `None` for values of 1440 or more.
    #[must_use]
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(Self(minutes))
        } else {
            None
        }
    }

    /// Extracts the time of day from a timestamp, discarding seconds.
    #[must_use]
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        // hour() < 24 and minute() < 60, so the sum is always below 1440.
        let minutes = timestamp.hour() * 60 + timestamp.minute();
        Self(u16::try_from(minutes).unwrap_or(MINUTES_PER_DAY - 1))
    }

    /// Returns minutes since midnight (0–1439).
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Returns the hour component (0–23).
    #[must_use]
    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Returns the minute component (0–59).
    #[must_use]
    pub const fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeOfDay {
            value: s.to_string(),
        };
        let caps = TIME_OF_DAY_RE.captures(s).ok_or_else(invalid)?;
        let hour: u16 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u16 = caps[2].parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// A calendar month in the range 1–12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Month(u8);

impl Month {
    /// Every month in calendar order.
    pub const ALL: [Self; 12] = [
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
        Self(8),
        Self(9),
        Self(10),
        Self(11),
        Self(12),
    ];

    /// Creates a month after validation.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(m @ 1..=12) => Ok(Self(m)),
            _ => Err(ValidationError::MonthOutOfRange { value }),
        }
    }

    /// Returns the month number (1–12).
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0 as u32
    }

    /// Returns the zero-based index (0–11), for month-indexed tables.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u32> for Month {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u32 {
    fn from(m: Month) -> Self {
        m.number()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
