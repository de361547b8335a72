//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type: one calendar month of a tax year,
//! the unit every payroll run is computed for.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents a monthly payroll period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::month(2024, 2).unwrap();
/// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(period.days(), 29);
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The tax year.
    pub year: i32,
    /// The calendar month (1-12).
    pub month: u32,
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Creates the period covering a calendar month.
    ///
    /// Returns `InvalidPeriod` if the month is not in 1-12 or the year is out of
    /// the supported date range.
    pub fn month(year: i32, month: u32) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidPeriod { year, month };
        let start_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end_date = start_date
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;
        Ok(Self {
            year,
            month,
            start_date,
            end_date,
        })
    }

    /// Returns the number of days in the period.
    pub fn days(&self) -> i64 {
        days_inclusive(self.start_date, self.end_date)
    }

    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns the later months of the same tax year, in order.
    pub fn remaining_in_year(&self) -> Vec<PayPeriod> {
        ((self.month + 1)..=12)
            .filter_map(|month| PayPeriod::month(self.year, month).ok())
            .collect()
    }

    /// Returns true if `other` is an earlier month of the same tax year.
    pub fn follows_in_year(&self, other: &PayPeriod) -> bool {
        other.year == self.year && other.month < self.month
    }

    /// Returns the `YYYY-MM` label of the period.
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

/// Counts the days from `from` to `to`, both inclusive; zero if `to < from`.
pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> i64 {
    ((to - from).num_days() + 1).max(0)
}

/// Counts the Mondays from `from` to `to`, both inclusive.
///
/// # Example
///
/// ```
/// use payroll_engine::models::count_mondays;
/// use chrono::NaiveDate;
///
/// // January 2024 starts on a Monday.
/// let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(count_mondays(from, to), 5);
/// ```
pub fn count_mondays(from: NaiveDate, to: NaiveDate) -> u32 {
    if to < from {
        return 0;
    }
    let offset = (7 - from.weekday().num_days_from_monday()) % 7;
    let first_monday = from + chrono::Duration::days(i64::from(offset));
    debug_assert_eq!(first_monday.weekday(), Weekday::Mon);
    if first_monday > to {
        return 0;
    }
    ((to - first_monday).num_days() / 7 + 1) as u32
}
