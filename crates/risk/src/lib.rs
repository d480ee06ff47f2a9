// In crates/risk/src/lib.rs

use rust_decimal::Decimal;

pub mod drawdown_manager;
pub mod error;
pub mod types;

// Re-export public types
pub use drawdown_manager::DrawdownRiskManager;
pub use error::{Error, Result};
pub use types::RiskSettings;

/// The universal interface for a risk sizing module.
///
/// A `RiskManager` owns the operator's capital and turns a historical loss
/// profile into a recommendation for how much of that capital to deploy.
pub trait RiskManager: Send + Sync {
    /// The name of the risk management strategy.
    fn name(&self) -> &'static str;

    /// Total deployable capital.
    fn capital(&self) -> Decimal;

    /// Fraction of capital the operator is willing to lose.
    fn risk_taking_ratio(&self) -> Decimal;

    /// Sizes the capital to deploy given the ratio between the worst
    /// historical loss and the capital exposed while it happened.
    ///
    /// # Arguments
    ///
    /// * `potential_max_loss_ratio`: worst accumulated loss divided by the
    ///   average invested amount during that losing streak. Never negative.
    ///
    /// Saturates at `Decimal::MAX` rather than overflowing.
    fn allowed_investing_capital(&self, potential_max_loss_ratio: Decimal) -> Decimal;
}
