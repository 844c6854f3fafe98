use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::input::InputError;

/// Identifier of a content item (a historical post or a draft).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Build an id, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, InputError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyId);
        }
        Ok(ContentId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A planning week, identified by its Monday.
///
/// Serialized as `YYYY-MM-DD`. Parsing rejects dates that are not a Monday,
/// so two spellings of the same week cannot coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekId(NaiveDate);

impl WeekId {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let back = u64::from(date.weekday().num_days_from_monday());
        // Subtracting at most six days from a valid NaiveDate only fails at
        // the very start of chrono's range.
        WeekId(date.checked_sub_days(Days::new(back)).unwrap_or(date))
    }

    /// The first Monday strictly after `date` (a Monday maps to the next one).
    pub fn following(date: NaiveDate) -> Self {
        let ahead = 7 - u64::from(date.weekday().num_days_from_monday());
        let monday = date.checked_add_days(Days::new(ahead)).unwrap_or(date);
        WeekId::containing(monday)
    }

    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            InputError::InvalidWeek {
                value: raw.to_string(),
                reason: "expected YYYY-MM-DD",
            }
        })?;
        if date.weekday() != Weekday::Mon {
            return Err(InputError::InvalidWeek {
                value: raw.to_string(),
                reason: "week must start on a Monday",
            });
        }
        Ok(WeekId(date))
    }

    pub fn monday(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for WeekId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        WeekId::parse(&raw).map_err(serde::de::Error::custom)
    }
}
