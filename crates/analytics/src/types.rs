// In crates/analytics/src/types.rs

use core_types::DateRange;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// A ratio whose denominator may be missing.
///
/// `Unbounded` stands for "positive over nothing" (e.g. wins with no losses),
/// `Undefined` for "nothing over nothing".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Finite(f64),
    Unbounded,
    Undefined,
}

impl Ratio {
    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Finite(v) => Some(*v),
            _ => None,
        }
    }

    /// `"NN.NN%"`, or `"inf"` / `"nan"` for the non-finite cases.
    pub fn as_percentage(&self) -> String {
        match self {
            Ratio::Finite(v) => format_percentage(*v),
            Ratio::Unbounded => "inf".to_string(),
            Ratio::Undefined => "nan".to_string(),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Finite(v) => serializer.serialize_f64(*v),
            Ratio::Unbounded => serializer.serialize_str("inf"),
            Ratio::Undefined => serializer.serialize_str("nan"),
        }
    }
}

/// Formats a raw fraction as a percentage with two decimals.
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Absolute aggregates over a selection of trades.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GrossNumbers {
    pub trade_count: usize,
    pub total_invested: Decimal,
    pub max_single_invested: Decimal,
    pub average_invested: Decimal,
    pub net_profit: Decimal,
    pub max_accum_profit: Decimal,
    /// The maximum drawdown: magnitude of the worst accumulated losing streak.
    pub max_accum_loss: Decimal,
    /// Inclusive trade indices of that losing streak.
    pub losing_streak_span: Option<(usize, usize)>,
    pub max_single_loss: Decimal,
    pub max_single_profit: Decimal,
    pub average_holding_days: f64,
    pub max_holding_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonRatios {
    pub win_ratio: Ratio,
    pub profit_factor: Ratio,
    pub profit_loss_ratio: Ratio,
    /// Net profit over capital.
    pub roa: f64,
    /// Net profit over the largest single invested amount.
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UdfRatios {
    pub return_on_average_investment: f64,
    pub return_on_trades: f64,
    /// Falls back to 1 when there was no losing streak.
    pub avg_invest_during_losing_streak: Decimal,
    pub potential_max_loss_ratio: Decimal,
    pub allowed_investing_capital: Decimal,
    pub risk_invest_ratio: Decimal,
    pub profit_risk_ratio: Ratio,
    pub overall_risk_invest_ratio: Ratio,
    pub max_drawdown_percentage: f64,
}

/// Everything computed for one query, before presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    /// The dates actually covered by the selected trades.
    pub real_date_range: DateRange,
    pub gross: GrossNumbers,
    pub common: CommonRatios,
    pub udf: UdfRatios,
    pub expecting_roa: f64,
}
