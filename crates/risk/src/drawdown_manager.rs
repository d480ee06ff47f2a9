// In crates/risk/src/drawdown_manager.rs

use crate::types::RiskSettings;
use crate::{Error, Result, RiskManager};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;

/// A risk manager that sizes capital against the worst historical drawdown.
///
/// If the worst losing streak were to repeat at the recommended size, the
/// loss would be `risk_taking_ratio` of capital:
/// `allowed = floor(capital * risk_taking_ratio / potential_max_loss_ratio)`.
/// A ratio small enough to push that past the `Decimal` range yields
/// `Decimal::MAX`.
#[derive(Debug, Clone)]
pub struct DrawdownRiskManager {
    capital: Decimal,
    risk_taking_ratio: Decimal,
}

impl DrawdownRiskManager {
    /// Creates a new `DrawdownRiskManager` from validated settings.
    pub fn new(settings: RiskSettings) -> Result<Self> {
        settings.validate()?;

        let capital = Decimal::from_f64(settings.capital).ok_or_else(|| {
            Error::InvalidParameters(format!("capital {} is out of range", settings.capital))
        })?;
        let risk_taking_ratio = Decimal::from_f64(settings.risk_taking_ratio).ok_or_else(|| {
            Error::InvalidParameters(format!(
                "risk_taking_ratio {} is out of range",
                settings.risk_taking_ratio
            ))
        })?;

        Ok(Self { capital, risk_taking_ratio })
    }
}

impl RiskManager for DrawdownRiskManager {
    fn name(&self) -> &'static str {
        "DrawdownRiskManager"
    }

    fn capital(&self) -> Decimal {
        self.capital
    }

    fn risk_taking_ratio(&self) -> Decimal {
        self.risk_taking_ratio
    }

    fn allowed_investing_capital(&self, potential_max_loss_ratio: Decimal) -> Decimal {
        // No historical loss: nothing to scale by, deploy everything.
        if potential_max_loss_ratio <= Decimal::ZERO {
            return self.capital;
        }

        let allowed = self
            .capital
            .checked_mul(self.risk_taking_ratio)
            .and_then(|budget| budget.checked_div(potential_max_loss_ratio))
            .map_or(Decimal::MAX, |allowed| allowed.floor());
        tracing::debug!(
            %potential_max_loss_ratio,
            %allowed,
            "Sized investing capital against historical drawdown."
        );
        allowed
    }
}
