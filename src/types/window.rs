use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::input::InputError;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Parse a day name. Accepts the short form (`Tue`) and the full English
/// name (`Tuesday`), case-insensitively.
pub fn parse_day(raw: &str) -> Result<Weekday, InputError> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| InputError::UnknownDay(raw.to_string()))
}

pub fn day_name(day: Weekday) -> &'static str {
    DAY_NAMES[day.num_days_from_monday() as usize]
}

/// A candidate posting slot type: (day-of-week, hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct TimeWindow {
    day: Weekday,
    hour: u8,
}

impl TimeWindow {
    pub fn new(day: Weekday, hour: u32) -> Result<Self, InputError> {
        if hour > 23 {
            return Err(InputError::HourOutOfRange(i64::from(hour)));
        }
        Ok(TimeWindow {
            day,
            hour: hour as u8,
        })
    }

    /// Like `new`, but hours past 23 are pinned to 23.
    pub fn saturating(day: Weekday, hour: u32) -> Self {
        TimeWindow {
            day,
            hour: hour.min(23) as u8,
        }
    }

    /// The window a local wall-clock time falls into.
    pub fn from_local(at: NaiveDateTime) -> Self {
        TimeWindow {
            day: at.weekday(),
            hour: at.hour() as u8,
        }
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.hour)
    }

    /// Same day, hour shifted by `delta`. `None` when the result leaves 0..=23.
    pub fn shifted(&self, delta: i32) -> Option<Self> {
        let hour = i32::from(self.hour) + delta;
        if (0..=23).contains(&hour) {
            Some(TimeWindow {
                day: self.day,
                hour: hour as u8,
            })
        } else {
            None
        }
    }

    fn sort_key(&self) -> (u32, u8) {
        (self.day.num_days_from_monday(), self.hour)
    }
}

impl Ord for TimeWindow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for TimeWindow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00", day_name(self.day), self.hour)
    }
}

/// Wire shape `{day, hour}`. Hours arrive signed so that negative values are
/// reported as out of range rather than as a type error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWindow {
    pub day: String,
    pub hour: i64,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = InputError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        let day = parse_day(&raw.day)?;
        if !(0..=23).contains(&raw.hour) {
            return Err(InputError::HourOutOfRange(raw.hour));
        }
        TimeWindow::new(day, raw.hour as u32)
    }
}

impl From<TimeWindow> for RawWindow {
    fn from(window: TimeWindow) -> Self {
        RawWindow {
            day: day_name(window.day).to_string(),
            hour: i64::from(window.hour),
        }
    }
}
