use std::fmt;

use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: u32 = 12;
pub const MAX_DAYS_PER_MONTH: u32 = 31;

/// A calendar date as supplied by the host calendar.
///
/// Years are signed so BCE years can be represented directly (248 BCE is `-248`).
/// Field order makes the derived `Ord` chronological.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl SimDate {
    /// Create a date from year, month (1–12) and day (1–31).
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        assert!(
            (1..=MONTHS_PER_YEAR).contains(&month),
            "month out of range: {month}"
        );
        assert!(
            (1..=MAX_DAYS_PER_MONTH).contains(&day),
            "day out of range: {day}"
        );
        Self { year, month, day }
    }

    /// First day of the given year.
    pub fn from_year(year: i32) -> Self {
        Self::new(year, 1, 1)
    }

    /// Same month and day in another year.
    pub fn with_year(self, year: i32) -> Self {
        Self { year, ..self }
    }

    pub fn calendar_day(self) -> CalendarDay {
        CalendarDay {
            month: self.month,
            day: self.day,
        }
    }

    pub fn is_new_year(self) -> bool {
        self.month == 1 && self.day == 1
    }
}

impl Default for SimDate {
    fn default() -> Self {
        Self::from_year(0)
    }
}

impl fmt::Display for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Y{}.M{}.D{}", self.year, self.month, self.day)
    }
}

/// A fixed (month, day) point that recurs every year, e.g. election day.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    pub month: u32,
    pub day: u32,
}

impl CalendarDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn in_year(self, year: i32) -> SimDate {
        SimDate::new(year, self.month, self.day)
    }
}
