// In crates/core-types/src/types.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// The date format used by trade records, CLI arguments and reports.
pub const DEFAULT_DATE_FORMAT: &str = "%Y/%m/%d";

/// A `chrono` format string, built once from settings and passed down to
/// every component that parses or renders dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateFormat(String);

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }

    /// Parses a date string, failing with a message that names the expected format.
    pub fn parse(&self, value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), &self.0).map_err(|_| Error::InvalidDate {
            value: value.to_string(),
            format: self.0.clone(),
        })
    }

    pub fn render(&self, date: NaiveDate) -> String {
        date.format(&self.0).to_string()
    }

    /// Parses a `start`/`end` pair into a validated range.
    pub fn parse_range(&self, start: &str, end: &str) -> Result<DateRange> {
        DateRange::new(self.parse(start)?, self.parse(end)?)
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

/// An inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// True when the whole `[entry, close]` span of a trade lies inside the range.
    pub fn covers(&self, entry: NaiveDate, close: NaiveDate) -> bool {
        entry >= self.start && close <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A single closed trade with its derived columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub close_date: NaiveDate,
    /// Calendar days the position was held, counting both ends.
    pub holding_days: u32,
    /// Earning minus cost.
    pub net_earning: Decimal,
    /// Capital committed to the trade (`invest` or `margin` column).
    pub invested: Decimal,
}

impl Trade {
    /// Builds a trade from its raw columns.
    ///
    /// # Errors
    ///
    /// * `Error::ClosesBeforeEntry` when the close date precedes the entry date.
    /// * `Error::NetEarningOverflow` when `earning - cost` leaves the `Decimal` range.
    pub fn new(
        entry_date: NaiveDate,
        close_date: NaiveDate,
        earning: Decimal,
        cost: Decimal,
        invested: Decimal,
    ) -> Result<Self> {
        let closes_before_entry = || Error::ClosesBeforeEntry {
            entry: entry_date.to_string(),
            close: close_date.to_string(),
        };
        let days = (close_date - entry_date).num_days();
        if days < 0 {
            return Err(closes_before_entry());
        }
        let holding_days = u32::try_from(days + 1).map_err(|_| closes_before_entry())?;
        let net_earning = earning.checked_sub(cost).ok_or_else(|| Error::NetEarningOverflow {
            earning: earning.to_string(),
            cost: cost.to_string(),
        })?;

        Ok(Self {
            entry_date,
            close_date,
            holding_days,
            net_earning,
            invested,
        })
    }

    pub fn is_win(&self) -> bool {
        self.net_earning > Decimal::ZERO
    }

    pub fn is_loss(&self) -> bool {
        self.net_earning < Decimal::ZERO
    }
}
