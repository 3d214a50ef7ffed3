// ABOUTME: Week range helpers used by journals and top-management reports
// ABOUTME: Monday-to-Sunday weeks, range validation, and display labels

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest range (in days between start and end) accepted for a reporting week
pub const MAX_WEEK_SPAN_DAYS: i64 = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeekError {
    #[error("Start date must be before or equal to end date.")]
    StartAfterEnd,
    #[error("Date range should not exceed 2 weeks.")]
    TooLong,
}

/// An inclusive date range, normally Monday..Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The Monday..Sunday week containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The week containing today's local date
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// The week immediately before this one
    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Duration::days(7),
            end: self.end - Duration::days(7),
        }
    }

    /// Validate a user-selected reporting range
    pub fn validate(&self) -> Result<(), WeekError> {
        if self.start > self.end {
            return Err(WeekError::StartAfterEnd);
        }
        if (self.end - self.start).num_days() > MAX_WEEK_SPAN_DAYS {
            return Err(WeekError::TooLong);
        }
        Ok(())
    }

    /// Use the requested range when both ends are present and valid, else the current week
    pub fn from_selection(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => {
                let range = Self::new(start, end);
                if range.validate().is_ok() {
                    range
                } else {
                    Self::current()
                }
            }
            _ => Self::current(),
        }
    }

    /// e.g. `January 06 to January 12, 2025`
    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%B %d"),
            self.end.format("%B %d, %Y")
        )
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
