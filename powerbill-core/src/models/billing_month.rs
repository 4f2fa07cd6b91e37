use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Season;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingMonthError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),

    #[error("expected a billing month formatted as YYYY-MM, got '{0}'")]
    InvalidFormat(String),
}

/// A calendar month of a calendar year. Persisted usage records are keyed
/// by this value, one record per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    pub fn new(
        year: i32,
        month: u32,
    ) -> Result<Self, BillingMonthError> {
        if !(1..=12).contains(&month) {
            return Err(BillingMonthError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, 1..=12.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn season(&self) -> Season {
        Season::from_month(self.month)
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingMonth {
    type Err = BillingMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|_| BillingMonthError::InvalidFormat(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_accepts_every_calendar_month() {
        for month in 1..=12 {
            assert!(BillingMonth::new(2025, month).is_ok());
        }
    }

    #[test]
    fn new_rejects_month_zero_and_thirteen() {
        assert_eq!(
            BillingMonth::new(2025, 0),
            Err(BillingMonthError::MonthOutOfRange(0))
        );
        assert_eq!(
            BillingMonth::new(2025, 13),
            Err(BillingMonthError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn from_date_drops_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 17).unwrap();

        let month = BillingMonth::from_date(date);

        assert_eq!(month, BillingMonth::new(2024, 8).unwrap());
        assert_eq!(month.season(), Season::Summer);
    }

    #[test]
    fn parses_and_displays_year_month() {
        let month: BillingMonth = "2025-03".parse().unwrap();

        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2025-03");
    }

    #[test]
    fn parse_rejects_garbage_and_invalid_months() {
        assert_eq!(
            "March".parse::<BillingMonth>(),
            Err(BillingMonthError::InvalidFormat("March".to_string()))
        );
        assert!("2025-13".parse::<BillingMonth>().is_err());
        assert!("2025-03-01".parse::<BillingMonth>().is_err());
    }

    #[test]
    fn orders_by_year_then_month() {
        let dec_2024 = BillingMonth::new(2024, 12).unwrap();
        let jan_2025 = BillingMonth::new(2025, 1).unwrap();

        assert!(dec_2024 < jan_2025);
    }
}
