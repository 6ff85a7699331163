//! Runtime lengths for courses and chapters.
//!
//! Authors type durations as free text ("15 min", "4 hours"); the value is
//! parsed once at the edge into whole minutes so aggregates never have to
//! re-read display strings.

use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d+\s*[A-Za-z]*\s*)+$").expect("duration shape pattern is valid")
});
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*([A-Za-z]*)").expect("duration token pattern is valid"));

/// Errors raised while parsing a duration string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("unrecognised duration \"{0}\"")]
    Malformed(String),
    #[error("unknown duration unit \"{0}\"")]
    UnknownUnit(String),
    #[error("duration \"{0}\" is too large")]
    Overflow(String),
}

/// A whole number of minutes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDuration {
    minutes: u32,
}

impl ContentDuration {
    pub const ZERO: Self = Self { minutes: 0 };

    pub const fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self {
            minutes: hours.saturating_mul(60),
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self {
            minutes: self.minutes.saturating_add(other.minutes),
        }
    }

    /// Parses strings such as `"15 min"`, `"4 hours"`, `"1h 30m"` or a bare
    /// number of minutes.
    pub fn parse(text: &str) -> Result<Self, DurationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DurationError::Empty);
        }
        if !SHAPE.is_match(trimmed) {
            return Err(DurationError::Malformed(trimmed.to_string()));
        }

        let mut total: u32 = 0;
        for caps in TOKEN.captures_iter(trimmed) {
            let value: u32 = caps[1]
                .parse()
                .map_err(|_| DurationError::Overflow(trimmed.to_string()))?;
            let unit = caps[2].to_ascii_lowercase();
            let factor = match unit.as_str() {
                "" | "m" | "min" | "mins" | "minute" | "minutes" => 1,
                "h" | "hr" | "hrs" | "hour" | "hours" => 60,
                _ => return Err(DurationError::UnknownUnit(caps[2].to_string())),
            };
            total = value
                .checked_mul(factor)
                .and_then(|minutes| total.checked_add(minutes))
                .ok_or_else(|| DurationError::Overflow(trimmed.to_string()))?;
        }
        Ok(Self { minutes: total })
    }
}

impl FromStr for ContentDuration {
    type Err = DurationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl TryFrom<String> for ContentDuration {
    type Error = DurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentDuration> for String {
    fn from(value: ContentDuration) -> Self {
        value.to_string()
    }
}

impl Sum for ContentDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for ContentDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.minutes / 60;
        let minutes = self.minutes % 60;
        match (hours, minutes) {
            (0, m) => write!(f, "{m} min"),
            (1, 0) => f.write_str("1 hour"),
            (h, 0) => write!(f, "{h} hours"),
            (h, m) => write!(f, "{h}h {m}m"),
        }
    }
}
