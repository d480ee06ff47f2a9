// In crates/trade-store/src/lib.rs

use core_types::{DateFormat, DateRange, Trade};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::TradeRecord;

/// An immutable, entry-date ordered table of trades.
///
/// Built once from a record source; every query works on a fresh
/// `TradeTable` produced by [`TradeTable::select_range`].
///
/// The summed absolute net earnings and the summed invested amounts both fit
/// in a `Decimal`, so totals, running sums and extremes over any selection
/// never overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeTable {
    trades: Vec<Trade>,
}

impl TradeTable {
    /// Builds a table from raw records, deriving net earning and holding days.
    ///
    /// # Errors
    ///
    /// * `Error::EmptySource` if `records` yields nothing.
    /// * `Error::Date` if a date triple does not form a valid date.
    /// * `Error::InvalidRecord` if a row is missing its dates, closes before
    ///   it opens, has a non-positive invested amount, or its net earning
    ///   leaves the `Decimal` range.
    /// * `Error::TotalOutOfRange` if the column totals leave the `Decimal` range.
    pub fn load<I>(records: I, date_format: &DateFormat) -> Result<Self>
    where
        I: IntoIterator<Item = TradeRecord>,
    {
        let trades = records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| to_trade(idx + 1, &record, date_format))
            .collect::<Result<Vec<_>>>()?;

        Self::from_trades(trades)
    }

    /// Reads CSV records (with a header row) from any reader.
    pub fn from_reader<R: Read>(reader: R, date_format: &DateFormat) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let records = reader
            .deserialize::<TradeRecord>()
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        tracing::debug!(rows = records.len(), "Parsed trade record rows.");
        Self::load(records, date_format)
    }

    /// Opens and reads a CSV trade record file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, date_format: &DateFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(file, date_format)?;
        tracing::info!(path = %path.display(), trades = table.len(), "Loaded trade records.");
        Ok(table)
    }

    /// Builds a table from already-derived trades, sorting them by entry date.
    pub fn from_trades(mut trades: Vec<Trade>) -> Result<Self> {
        if trades.is_empty() {
            return Err(Error::EmptySource);
        }

        for (idx, trade) in trades.iter().enumerate() {
            if trade.close_date < trade.entry_date {
                return Err(Error::InvalidRecord {
                    row: idx + 1,
                    reason: format!(
                        "close date {} precedes entry date {}",
                        trade.close_date, trade.entry_date
                    ),
                });
            }
            if trade.invested <= Decimal::ZERO {
                return Err(Error::InvalidRecord {
                    row: idx + 1,
                    reason: format!("invested amount must be positive, got {}", trade.invested),
                });
            }
        }

        checked_total(trades.iter().map(|t| t.net_earning.abs()), "absolute net earning")?;
        checked_total(trades.iter().map(|t| t.invested), "invested amount")?;

        // Stable, so rows sharing an entry date keep their source order.
        trades.sort_by_key(|t| t.entry_date);
        Ok(Self { trades })
    }

    /// Returns every trade opened on or after `range.start` and closed on or
    /// before `range.end`, re-indexed from zero.
    ///
    /// # Errors
    ///
    /// `Error::EmptyRange` if no trade falls inside the range.
    pub fn select_range(&self, range: &DateRange) -> Result<Self> {
        let trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|t| range.covers(t.entry_date, t.close_date))
            .copied()
            .collect();

        if trades.is_empty() {
            return Err(Error::EmptyRange {
                start: range.start,
                end: range.end,
            });
        }

        tracing::debug!(%range, selected = trades.len(), total = self.len(), "Selected trades in range.");
        Ok(Self { trades })
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// The chronologically ordered P&L series.
    pub fn net_earnings(&self) -> Vec<Decimal> {
        self.trades.iter().map(|t| t.net_earning).collect()
    }

    pub fn invested(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.trades.iter().map(|t| t.invested)
    }

    /// The earliest entry date and latest close date actually present.
    pub fn real_date_range(&self) -> DateRange {
        // Construction rejects empty tables and trades closing before entry.
        let first = self.trades[0];
        self.trades.iter().fold(
            DateRange { start: first.entry_date, end: first.close_date },
            |range, t| DateRange {
                start: range.start.min(t.entry_date),
                end: range.end.max(t.close_date),
            },
        )
    }
}

fn to_trade(row: usize, record: &TradeRecord, date_format: &DateFormat) -> Result<Trade> {
    let (entry, close) = record.date_strings().ok_or_else(|| Error::InvalidRecord {
        row,
        reason: "missing entry_year/entry_month/entry_day or year/month/day columns".to_string(),
    })?;

    let entry_date = date_format
        .parse(&entry)
        .map_err(|source| Error::Date { row, source })?;
    let close_date = date_format
        .parse(&close)
        .map_err(|source| Error::Date { row, source })?;

    Trade::new(entry_date, close_date, record.earning, record.cost, record.invest).map_err(|source| {
        Error::InvalidRecord {
            row,
            reason: source.to_string(),
        }
    })
}

fn checked_total(mut values: impl Iterator<Item = Decimal>, column: &'static str) -> Result<Decimal> {
    values
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
        .ok_or(Error::TotalOutOfRange { column })
}
