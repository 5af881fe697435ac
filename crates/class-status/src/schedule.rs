//! Weekly schedule model: days, minute-granular times of day, and class blocks.
//!
//! Times travel as zero-padded 24-hour `HH:MM` text but are held as minute-of-day
//! integers, so ordering never depends on the textual form.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatusError};

pub type UserId = i64;
pub type BlockId = i64;

/// Day of the week, 0 = Monday through 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MONDAY: DayOfWeek = DayOfWeek(0);
    pub const SUNDAY: DayOfWeek = DayOfWeek(6);

    pub fn new(day: i64) -> Result<Self> {
        match u8::try_from(day) {
            Ok(d) if d <= 6 => Ok(DayOfWeek(d)),
            _ => Err(StatusError::InvalidDay(day)),
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// The day an instant falls on.
    pub fn of(instant: NaiveDateTime) -> Self {
        Self::from(instant.weekday())
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_monday is always in 0..=6.
        DayOfWeek(weekday.num_days_from_monday() as u8)
    }
}

impl TryFrom<i64> for DayOfWeek {
    type Error = StatusError;

    fn try_from(day: i64) -> Result<Self> {
        Self::new(day)
    }
}

impl From<DayOfWeek> for i64 {
    fn from(day: DayOfWeek) -> Self {
        i64::from(day.0)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wall-clock time of day at minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(23 * 60 + 59);

    /// Build from an hour (0–23) and minute (0–59).
    pub fn new(hour: u16, minute: u16) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(StatusError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(TimeOfDay(hour * 60 + minute))
    }

    /// The minute an instant falls in; seconds and below are dropped.
    pub fn of(instant: NaiveDateTime) -> Self {
        // hour() < 24 and minute() < 60, so this fits in u16.
        TimeOfDay((instant.hour() * 60 + instant.minute()) as u16)
    }

    pub fn minute_of_day(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl FromStr for TimeOfDay {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || StatusError::InvalidTime(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digit = |b: u8| -> Result<u16> {
            if b.is_ascii_digit() {
                Ok(u16::from(b - b'0'))
            } else {
                Err(invalid())
            }
        };
        let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
        let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;
        TimeOfDay::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = StatusError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A recurring weekly interval during which a user is in class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub id: BlockId,
    pub user_id: UserId,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub course_name: Option<String>,
}

impl ScheduleBlock {
    /// Whether `time` lies within `[start_time, end_time]`, both ends inclusive.
    ///
    /// An inverted block (`start_time > end_time`) never covers anything; it is
    /// not read as wrapping past midnight.
    pub fn covers(&self, time: TimeOfDay) -> bool {
        self.start_time <= time && time <= self.end_time
    }
}

/// A block as submitted, before the store assigns an id and owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlock {
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub course_name: Option<String>,
}

impl NewBlock {
    pub fn into_block(self, id: BlockId, user_id: UserId) -> ScheduleBlock {
        ScheduleBlock {
            id,
            user_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            course_name: self.course_name,
        }
    }
}
