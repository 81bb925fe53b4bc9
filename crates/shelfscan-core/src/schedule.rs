//! Attendance hours, borrow periods and library opening hours.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hours attended in one visit, `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Hours(u8);

impl Hours {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(value: i64) -> Result<Self> {
        checked_range("hours", value, Self::MIN, Self::MAX).map(Self)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every selectable value, smallest first.
    pub fn choices() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1 {
            write!(f, "1 hour")
        } else {
            write!(f, "{} hours", self.0)
        }
    }
}

/// Working days until a borrowed book is due, `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ReturnDays(u8);

impl ReturnDays {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(value: i64) -> Result<Self> {
        checked_range("return days", value, Self::MIN, Self::MAX).map(Self)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn choices() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl Default for ReturnDays {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for ReturnDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn checked_range(what: &'static str, value: i64, min: u8, max: u8) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or(Error::OutOfRange {
            what,
            min,
            max,
            value,
        })
}

/// Date a book borrowed on `start` is due, counting only weekdays.
pub fn due_date(start: NaiveDate, days: ReturnDays) -> NaiveDate {
    let mut date = start;
    let mut remaining = days.get();
    while remaining > 0 {
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

/// Whether the library is accepting visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryStatus {
    Open,
    NotYetOpen,
    Closed,
    LunchBreak,
}

impl LibraryStatus {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Notice shown when scanning is refused.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Open => "Library is open.",
            Self::NotYetOpen => "Library is not opened yet.",
            Self::Closed => "Library is closed.",
            Self::LunchBreak => "Library is closed for lunch.",
        }
    }
}

/// Daily schedule as `HHMM` integers (e.g. `1230` is 12:30).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningHours {
    pub open: u16,
    pub close: u16,
    pub lunch_start: u16,
    pub lunch_end: u16,
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self {
            open: 800,
            close: 1700,
            lunch_start: 1200,
            lunch_end: 1300,
        }
    }
}

impl OpeningHours {
    /// Status at a wall-clock time. Closing time and lunch start are
    /// already closed; lunch end is open again.
    pub fn status(&self, time: NaiveTime) -> LibraryStatus {
        #[allow(clippy::cast_possible_truncation)]
        let now = (time.hour() * 100 + time.minute()) as u16;

        if now < self.open {
            LibraryStatus::NotYetOpen
        } else if now >= self.close {
            LibraryStatus::Closed
        } else if now >= self.lunch_start && now < self.lunch_end {
            LibraryStatus::LunchBreak
        } else {
            LibraryStatus::Open
        }
    }

    pub fn status_now(&self) -> LibraryStatus {
        self.status(Local::now().time())
    }
}
