// In crates/analytics/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] trade_store::Error),

    #[error(transparent)]
    Risk(#[from] risk::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
