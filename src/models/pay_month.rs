//! Pay month and date range models.
//!
//! This module contains the [`PayMonth`] type that anchors salary proration and
//! the [`DateRange`] type used to query and backfill records.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month that salary is computed for.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayMonth;
/// use chrono::NaiveDate;
///
/// let month = PayMonth::new(2026, 2).unwrap();
/// assert_eq!(month.days_in_month(), 28);
///
/// // During the month only days up to yesterday are countable.
/// let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
/// assert_eq!(month.last_countable_day(today), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayMonth {
    /// Calendar year.
    pub year: i32,
    /// Month of the year, 1 to 12.
    pub month: u32,
}

impl PayMonth {
    /// Creates a pay month, rejecting months outside 1 to 12 and
    /// years chrono cannot represent.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation {
                field: "month".to_string(),
                message: format!("must be between 1 and 12, got {}", month),
            });
        }
        // The last day must also be representable for the month to be usable.
        let candidate = Self { year, month };
        candidate.try_last_day().ok_or_else(|| EngineError::Validation {
            field: "year".to_string(),
            message: format!("{} is outside the supported calendar range", year),
        })?;
        Ok(candidate)
    }

    /// The pay month containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.try_last_day().unwrap_or(NaiveDate::MAX)
    }

    fn try_last_day(&self) -> Option<NaiveDate> {
        let (next_year, next_month) = if self.month == 12 {
            (self.year.checked_add(1)?, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
    }

    /// Number of calendar days in the month.
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// The last day of the month that may count towards pay, as a day count.
    ///
    /// - Months entirely in the past: every day counts.
    /// - The current month: days up to yesterday count.
    /// - Months in the future: nothing counts.
    pub fn last_countable_day(&self, today: NaiveDate) -> u32 {
        if today < self.first_day() {
            0
        } else if today > self.last_day() {
            self.days_in_month()
        } else {
            today.day() - 1
        }
    }

    /// The whole month as a date range.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start_date: self.first_day(),
            end_date: self.last_day(),
        }
    }

    /// Checks if a date falls within the month.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for PayMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end before the start.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        if end_date < start_date {
            return Err(EngineError::Validation {
                field: "end_date".to_string(),
                message: format!("{} is before start date {}", end_date, start_date),
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Checks if a date falls within the range, inclusive of both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
