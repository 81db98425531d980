use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FiscalYearError {
    #[error("fiscal year start month must be between 1 and 12, got {0}")]
    InvalidStartMonth(u32),

    #[error("fiscal year {0} is outside the supported date range")]
    OutOfRange(i32),
}

/// A twelve-month fiscal year beginning on the first day of `start_month`
/// in `start_year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiscalYear {
    start_year: i32,
    start_month: u32,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl FiscalYear {
    pub fn new(
        start_year: i32,
        start_month: u32,
    ) -> Result<Self, FiscalYearError> {
        if !(1..=12).contains(&start_month) {
            return Err(FiscalYearError::InvalidStartMonth(start_month));
        }
        let start_date = NaiveDate::from_ymd_opt(start_year, start_month, 1)
            .ok_or(FiscalYearError::OutOfRange(start_year))?;
        let end_date = NaiveDate::from_ymd_opt(start_year + 1, start_month, 1)
            .and_then(|next| next.pred_opt())
            .ok_or(FiscalYearError::OutOfRange(start_year))?;

        Ok(Self {
            start_year,
            start_month,
            start_date,
            end_date,
        })
    }

    /// The fiscal year that `date` falls in.
    pub fn containing(
        date: NaiveDate,
        start_month: u32,
    ) -> Result<Self, FiscalYearError> {
        let start_year = if date.month() >= start_month {
            date.year()
        } else {
            date.year() - 1
        };
        Self::new(start_year, start_month)
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the fiscal year, inclusive.
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Label such as `2024-25`, or `2024` for calendar-aligned years.
    pub fn label(&self) -> String {
        if self.start_month == 1 {
            self.start_year.to_string()
        } else {
            format!("{}-{:02}", self.start_year, (self.start_year + 1).rem_euclid(100))
        }
    }

    /// Months of this fiscal year not yet elapsed on `date`, counting the
    /// month `date` falls in as not yet received.
    pub fn remaining_months_as_of(
        &self,
        date: NaiveDate,
    ) -> u32 {
        if date < self.start_date {
            return 12;
        }
        if date > self.end_date {
            return 0;
        }
        let month_index = |year: i32, month0: u32| year * 12 + month0 as i32;
        let elapsed = month_index(date.year(), date.month0())
            - month_index(self.start_year, self.start_month - 1);
        12 - elapsed as u32
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "FY {}", self.label())
    }
}
