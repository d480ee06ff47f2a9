// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid date `{value}`: date should be in the format {format}")]
    InvalidDate { value: String, format: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvertedRange { start: String, end: String },

    #[error("Close date {close} precedes entry date {entry}")]
    ClosesBeforeEntry { entry: String, close: String },

    #[error("Net earning of {earning} minus {cost} is out of range")]
    NetEarningOverflow { earning: String, cost: String },
}

pub type Result<T> = std::result::Result<T, Error>;
