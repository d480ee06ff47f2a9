// In crates/trade-store/src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Trade record source contains no trades")]
    EmptySource,

    #[error("Failed to read trade records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse trade records: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: {source}")]
    Date {
        row: usize,
        #[source]
        source: core_types::Error,
    },

    #[error("Row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("Total {column} of the trade records exceeds the supported numeric range")]
    TotalOutOfRange { column: &'static str },

    #[error("No trades were opened and closed between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
}

impl Error {
    /// True for the "nothing in the requested range" case, as opposed to a
    /// malformed or empty record source.
    pub fn is_empty_range(&self) -> bool {
        matches!(self, Error::EmptyRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
