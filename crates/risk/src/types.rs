// In crates/risk/src/types.rs

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The operator's risk parameters, read from `configs.json` in the data directory.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RiskSettings {
    /// Total deployable capital.
    pub capital: f64,
    /// Fraction of `capital` the operator is willing to lose, in `(0, 1]`.
    pub risk_taking_ratio: f64,
}

impl RiskSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.capital.is_finite() || self.capital <= 0.0 {
            return Err(Error::InvalidParameters(format!(
                "capital must be a positive number, got {}",
                self.capital
            )));
        }
        if !(self.risk_taking_ratio > 0.0 && self.risk_taking_ratio <= 1.0) {
            return Err(Error::InvalidParameters(format!(
                "risk_taking_ratio must be in (0, 1], got {}",
                self.risk_taking_ratio
            )));
        }
        Ok(())
    }
}
