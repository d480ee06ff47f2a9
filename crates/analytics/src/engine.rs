// In crates/analytics/src/engine.rs

use crate::runs::{extract_extremes, extract_max_accum_loss, extract_max_accum_profit};
use crate::types::{CommonRatios, GrossNumbers, MetricsReport, Ratio, UdfRatios};
use crate::Result;
use core_types::DateRange;
use rayon::prelude::*;
use risk::{DrawdownRiskManager, RiskManager, RiskSettings};
use rust_decimal::prelude::*;
use trade_store::TradeTable;

/// The engine responsible for calculating risk metrics from a selection of trades.
///
/// Holds no per-query state, so one engine can serve many queries, including
/// concurrently from several threads.
pub struct MetricsEngine {
    risk_manager: Box<dyn RiskManager>,
}

impl MetricsEngine {
    /// Creates an engine sized by a `DrawdownRiskManager` built from `settings`.
    pub fn new(settings: RiskSettings) -> Result<Self> {
        let risk_manager = DrawdownRiskManager::new(settings)?;
        Ok(Self::with_risk_manager(Box::new(risk_manager)))
    }

    pub fn with_risk_manager(risk_manager: Box<dyn RiskManager>) -> Self {
        tracing::debug!(
            risk_manager = risk_manager.name(),
            capital = %risk_manager.capital(),
            risk_taking_ratio = %risk_manager.risk_taking_ratio(),
            "Metrics engine ready."
        );
        Self { risk_manager }
    }

    /// Selects the trades inside `range` and computes the full metrics for them.
    ///
    /// # Errors
    ///
    /// `trade_store::Error::EmptyRange` if no trade falls inside the range.
    pub fn query(&self, table: &TradeTable, range: &DateRange) -> Result<MetricsReport> {
        tracing::info!(%range, "Extracting metrics for date range.");
        let selected = table.select_range(range)?;
        let report = self.extract_metrics(&selected);
        tracing::info!(
            trades = report.gross.trade_count,
            real_range = %report.real_date_range,
            "Metrics extracted."
        );
        Ok(report)
    }

    /// Runs one independent query per range in parallel.
    ///
    /// Each range gets its own result; an empty range does not fail the others.
    pub fn query_shards(
        &self,
        table: &TradeTable,
        ranges: &[DateRange],
    ) -> Vec<(DateRange, Result<MetricsReport>)> {
        tracing::info!(shards = ranges.len(), "Extracting metrics for date range shards.");
        ranges
            .par_iter()
            .map(|range| (*range, self.query(table, range)))
            .collect()
    }

    /// Computes every section of the report for an already selected table.
    pub fn extract_metrics(&self, selected: &TradeTable) -> MetricsReport {
        let gross = self.extract_gross_numbers(selected);
        let common = self.extract_common_ratios(selected, &gross);
        let udf = self.extract_udf_ratios(selected, &gross);

        // Return on capital if `allowed_investing_capital` had been deployed at the observed ROI.
        let expecting_roa = product_fraction(
            (udf.allowed_investing_capital, gross.net_profit),
            (gross.max_single_invested, self.risk_manager.capital()),
        );

        MetricsReport {
            real_date_range: selected.real_date_range(),
            gross,
            common,
            udf,
            expecting_roa,
        }
    }

    pub fn extract_gross_numbers(&self, selected: &TradeTable) -> GrossNumbers {
        let trades = selected.trades();
        let pl = selected.net_earnings();

        let trade_count = trades.len();
        let total_invested: Decimal = selected.invested().sum();
        let max_single_invested = selected.invested().max().unwrap_or(Decimal::ZERO);
        let average_invested = if trade_count > 0 {
            total_invested / Decimal::from(trade_count)
        } else {
            Decimal::ZERO
        };

        let net_profit: Decimal = pl.iter().sum();
        let max_accum_profit = extract_max_accum_profit(&pl);
        let (max_accum_loss, losing_streak_span) = extract_max_accum_loss(&pl);
        let (max_single_loss, max_single_profit) = extract_extremes(&pl);

        let total_days: u64 = trades.iter().map(|t| u64::from(t.holding_days)).sum();
        let average_holding_days = if trade_count > 0 {
            total_days as f64 / trade_count as f64
        } else {
            0.0
        };
        let max_holding_days = trades.iter().map(|t| t.holding_days).max().unwrap_or(0);

        GrossNumbers {
            trade_count,
            total_invested,
            max_single_invested,
            average_invested,
            net_profit,
            max_accum_profit,
            max_accum_loss,
            losing_streak_span,
            max_single_loss,
            max_single_profit,
            average_holding_days,
            max_holding_days,
        }
    }

    pub fn extract_common_ratios(&self, selected: &TradeTable, gross: &GrossNumbers) -> CommonRatios {
        let wins: Vec<Decimal> = selected.trades().iter().filter(|t| t.is_win()).map(|t| t.net_earning).collect();
        let losses: Vec<Decimal> = selected.trades().iter().filter(|t| t.is_loss()).map(|t| t.net_earning).collect();

        let gross_profit: Decimal = wins.iter().sum();
        let gross_loss: Decimal = losses.iter().sum();

        let win_ratio = against_losses(wins.len(), losses.len(), || {
            wins.len() as f64 / gross.trade_count as f64
        });
        let profit_factor = against_losses(wins.len(), losses.len(), || {
            fraction(gross_profit, gross_loss).abs()
        });
        let profit_loss_ratio = against_losses(wins.len(), losses.len(), || {
            fraction(mean(gross_profit, wins.len()), mean(gross_loss, losses.len())).abs()
        });

        CommonRatios {
            win_ratio,
            profit_factor,
            profit_loss_ratio,
            roa: fraction(gross.net_profit, self.risk_manager.capital()),
            roi: fraction(gross.net_profit, gross.max_single_invested),
        }
    }

    pub fn extract_udf_ratios(&self, selected: &TradeTable, gross: &GrossNumbers) -> UdfRatios {
        let max_drawdown = gross.max_accum_loss;
        let capital = self.risk_manager.capital();

        let (return_on_average_investment, return_on_trades) = if gross.net_profit.is_zero() {
            (0.0, 0.0)
        } else {
            (
                fraction(gross.net_profit, gross.average_invested),
                fraction(gross.net_profit, gross.total_invested),
            )
        };

        let avg_invest_during_losing_streak = match gross.losing_streak_span {
            // Nothing lost: only a safe divisor is needed, the ratio below is 0 either way.
            None => Decimal::ONE,
            Some((start, end)) if start == end => selected.trades()[start].invested,
            Some((start, end)) => {
                let streak = &selected.trades()[start..=end];
                let total: Decimal = streak.iter().map(|t| t.invested).sum();
                total / Decimal::from(streak.len())
            }
        };

        // Saturates for a drawdown far larger than the exposure behind it.
        let potential_max_loss_ratio = max_drawdown
            .checked_div(avg_invest_during_losing_streak)
            .unwrap_or(Decimal::MAX);
        let allowed_investing_capital = self.risk_manager.allowed_investing_capital(potential_max_loss_ratio);

        let profit_risk_ratio = if max_drawdown.is_zero() {
            Ratio::Unbounded
        } else {
            Ratio::Finite(fraction(gross.net_profit, max_drawdown))
        };
        let overall_risk_invest_ratio = if gross.average_invested.is_zero() {
            Ratio::Unbounded
        } else {
            Ratio::Finite(fraction(max_drawdown, gross.average_invested))
        };

        UdfRatios {
            return_on_average_investment,
            return_on_trades,
            avg_invest_during_losing_streak,
            potential_max_loss_ratio,
            allowed_investing_capital,
            risk_invest_ratio: potential_max_loss_ratio,
            profit_risk_ratio,
            overall_risk_invest_ratio,
            max_drawdown_percentage: fraction(max_drawdown, capital),
        }
    }
}

/// `computed()` when there is at least one losing trade to divide by,
/// `Unbounded` with wins only, `Undefined` with neither.
fn against_losses(wins: usize, losses: usize, computed: impl FnOnce() -> f64) -> Ratio {
    if losses > 0 {
        Ratio::Finite(computed())
    } else if wins > 0 {
        Ratio::Unbounded
    } else {
        Ratio::Undefined
    }
}

fn mean(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

/// `numerator / denominator` as `f64`; zero when the denominator is zero.
///
/// Quotients outside the `Decimal` range are computed in `f64` instead.
fn fraction(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    numerator
        .checked_div(denominator)
        .and_then(|v| v.to_f64())
        .unwrap_or_else(|| as_f64(numerator) / as_f64(denominator))
}

/// `(a * b) / (c * d)` as `f64`, falling back to `f64` arithmetic when a
/// product leaves the `Decimal` range.
fn product_fraction(numerator: (Decimal, Decimal), denominator: (Decimal, Decimal)) -> f64 {
    match (
        numerator.0.checked_mul(numerator.1),
        denominator.0.checked_mul(denominator.1),
    ) {
        (Some(n), Some(d)) => fraction(n, d),
        _ if denominator.0.is_zero() || denominator.1.is_zero() => 0.0,
        _ => {
            (as_f64(numerator.0) / as_f64(denominator.0)) * (as_f64(numerator.1) / as_f64(denominator.1))
        }
    }
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::Trade;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn trade(entry: (i32, u32, u32), close: (i32, u32, u32), earning: Decimal, invested: Decimal) -> Trade {
        Trade::new(
            ymd(entry.0, entry.1, entry.2),
            ymd(close.0, close.1, close.2),
            earning,
            dec!(0),
            invested,
        )
        .unwrap()
    }

    fn engine() -> MetricsEngine {
        MetricsEngine::new(RiskSettings { capital: 10_000.0, risk_taking_ratio: 0.1 }).unwrap()
    }

    fn scenario_table() -> TradeTable {
        TradeTable::from_trades(vec![
            trade((2023, 1, 1), (2023, 1, 2), dec!(100), dec!(1000)),
            trade((2023, 1, 3), (2023, 1, 4), dec!(-50), dec!(500)),
            trade((2023, 1, 5), (2023, 1, 5), dec!(-30), dec!(500)),
        ])
        .unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_gross_numbers_for_scenario() {
        let gross = engine().extract_gross_numbers(&scenario_table());

        assert_eq!(gross.trade_count, 3);
        assert_eq!(gross.total_invested, dec!(2000));
        assert_eq!(gross.max_single_invested, dec!(1000));
        assert_eq!(gross.net_profit, dec!(20));
        assert_eq!(gross.max_accum_profit, dec!(100));
        assert_eq!(gross.max_accum_loss, dec!(80));
        assert_eq!(gross.losing_streak_span, Some((1, 2)));
        assert_eq!(gross.max_single_loss, dec!(50));
        assert_eq!(gross.max_single_profit, dec!(100));
        assert_eq!(gross.max_holding_days, 2);
        assert_close(gross.average_holding_days, 5.0 / 3.0);
    }

    #[test]
    fn test_common_ratios_for_scenario() {
        let engine = engine();
        let table = scenario_table();
        let gross = engine.extract_gross_numbers(&table);
        let common = engine.extract_common_ratios(&table, &gross);

        assert_close(common.win_ratio.value().unwrap(), 1.0 / 3.0);
        assert_close(common.profit_factor.value().unwrap(), 1.25);
        assert_close(common.profit_loss_ratio.value().unwrap(), 2.5);
        assert_close(common.roa, 0.002);
        assert_close(common.roi, 0.02);
        assert_eq!(Ratio::Finite(common.roi).as_percentage(), "2.00%");
    }

    #[test]
    fn test_udf_ratios_for_scenario() {
        let engine = engine();
        let table = scenario_table();
        let gross = engine.extract_gross_numbers(&table);
        let udf = engine.extract_udf_ratios(&table, &gross);

        assert_eq!(udf.avg_invest_during_losing_streak, dec!(500));
        assert_eq!(udf.potential_max_loss_ratio, dec!(0.16));
        assert_eq!(udf.risk_invest_ratio, dec!(0.16));
        assert_eq!(udf.allowed_investing_capital, dec!(6250));
        assert_close(udf.return_on_average_investment, 0.03);
        assert_close(udf.return_on_trades, 0.01);
        assert_close(udf.profit_risk_ratio.value().unwrap(), 0.25);
        assert_close(udf.overall_risk_invest_ratio.value().unwrap(), 0.12);
        assert_close(udf.max_drawdown_percentage, 0.008);
    }

    #[test]
    fn test_metrics_for_scenario() {
        let report = engine().extract_metrics(&scenario_table());
        assert_close(report.expecting_roa, 0.0125);
        assert_eq!(report.real_date_range.start, ymd(2023, 1, 1));
        assert_eq!(report.real_date_range.end, ymd(2023, 1, 5));
    }

    #[test]
    fn test_single_losing_trade_streak_uses_its_own_investment() {
        let table = TradeTable::from_trades(vec![
            trade((2023, 1, 1), (2023, 1, 1), dec!(-40), dec!(800)),
            trade((2023, 1, 2), (2023, 1, 2), dec!(60), dec!(200)),
        ])
        .unwrap();
        let engine = engine();
        let gross = engine.extract_gross_numbers(&table);
        let udf = engine.extract_udf_ratios(&table, &gross);

        assert_eq!(gross.losing_streak_span, Some((0, 0)));
        assert_eq!(udf.avg_invest_during_losing_streak, dec!(800));
        assert_eq!(udf.potential_max_loss_ratio, dec!(0.05));
        assert_eq!(udf.allowed_investing_capital, dec!(20000));
    }

    #[test]
    fn test_all_winning_range_allows_full_capital() {
        let table = TradeTable::from_trades(vec![
            trade((2023, 3, 1), (2023, 3, 1), dec!(15), dec!(300)),
            trade((2023, 3, 1), (2023, 3, 1), dec!(5), dec!(100)),
        ])
        .unwrap();
        let report = engine().extract_metrics(&table);

        assert_eq!(report.gross.max_accum_loss, dec!(0));
        assert_eq!(report.gross.losing_streak_span, None);
        assert_eq!(report.udf.avg_invest_during_losing_streak, dec!(1));
        assert_eq!(report.udf.potential_max_loss_ratio, dec!(0));
        assert_eq!(report.udf.allowed_investing_capital, dec!(10000));
        assert_eq!(report.udf.profit_risk_ratio, Ratio::Unbounded);
        assert_eq!(report.common.win_ratio, Ratio::Unbounded);
        assert_eq!(report.common.profit_factor, Ratio::Unbounded);
    }

    #[test]
    fn test_flat_range_leaves_ratios_undefined() {
        let table = TradeTable::from_trades(vec![trade((2023, 3, 1), (2023, 3, 2), dec!(0), dec!(300))]).unwrap();
        let engine = engine();
        let report = engine.extract_metrics(&table);

        assert_eq!(report.common.win_ratio, Ratio::Undefined);
        assert_eq!(report.common.profit_loss_ratio, Ratio::Undefined);
        assert_eq!(report.udf.return_on_average_investment, 0.0);
        assert_eq!(report.udf.return_on_trades, 0.0);
    }

    #[test]
    fn test_all_losing_range() {
        let table = TradeTable::from_trades(vec![
            trade((2023, 4, 1), (2023, 4, 1), dec!(-10), dec!(100)),
            trade((2023, 4, 2), (2023, 4, 2), dec!(-30), dec!(300)),
        ])
        .unwrap();
        let engine = engine();
        let report = engine.extract_metrics(&table);

        assert_eq!(report.gross.max_accum_profit, dec!(0));
        assert_eq!(report.gross.max_accum_loss, dec!(40));
        assert_close(report.common.win_ratio.value().unwrap(), 0.0);
        assert_close(report.common.profit_factor.value().unwrap(), 0.0);
        // 40 lost over an average 200 exposure: 1000 / 0.2.
        assert_eq!(report.udf.allowed_investing_capital, dec!(5000));
    }

    #[test]
    fn test_win_ratio_stays_in_unit_interval() {
        let table = TradeTable::from_trades(vec![
            trade((2023, 5, 1), (2023, 5, 1), dec!(10), dec!(100)),
            trade((2023, 5, 2), (2023, 5, 2), dec!(0), dec!(100)),
            trade((2023, 5, 3), (2023, 5, 3), dec!(-10), dec!(100)),
            trade((2023, 5, 4), (2023, 5, 4), dec!(20), dec!(100)),
        ])
        .unwrap();
        let engine = engine();
        let gross = engine.extract_gross_numbers(&table);
        let win_ratio = engine.extract_common_ratios(&table, &gross).win_ratio.value().unwrap();
        assert_close(win_ratio, 0.5);
        assert!((0.0..=1.0).contains(&win_ratio));
    }

    #[test]
    fn test_query_selects_range() {
        let engine = engine();
        let table = scenario_table();

        let range = DateRange::new(ymd(2023, 1, 3), ymd(2023, 1, 31)).unwrap();
        let report = engine.query(&table, &range).unwrap();
        assert_eq!(report.gross.trade_count, 2);
        assert_eq!(report.gross.net_profit, dec!(-80));
        assert_eq!(report.real_date_range.start, ymd(2023, 1, 3));
        assert_eq!(report.real_date_range.end, ymd(2023, 1, 5));
    }

    #[test]
    fn test_query_empty_range_fails() {
        let range = DateRange::new(ymd(2022, 1, 1), ymd(2022, 12, 31)).unwrap();
        let err = engine().query(&scenario_table(), &range).unwrap_err();
        assert!(matches!(err, crate::Error::Store(ref e) if e.is_empty_range()));
    }

    #[test]
    fn test_query_shards_reports_each_range() {
        let ranges = vec![
            DateRange::new(ymd(2023, 1, 1), ymd(2023, 1, 2)).unwrap(),
            DateRange::new(ymd(2023, 2, 1), ymd(2023, 2, 28)).unwrap(),
            DateRange::new(ymd(2023, 1, 3), ymd(2023, 1, 5)).unwrap(),
        ];
        let results = engine().query_shards(&scenario_table(), &ranges);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, ranges[0]);
        assert_eq!(results[0].1.as_ref().unwrap().gross.net_profit, dec!(100));
        assert!(results[1].1.is_err());
        assert_eq!(results[2].1.as_ref().unwrap().gross.max_accum_loss, dec!(80));
    }

    #[test]
    fn test_tiny_drawdown_on_large_position_saturates() {
        let table = TradeTable::from_trades(vec![
            trade((2023, 1, 1), (2023, 1, 2), dec!(-0.000000000000000001), dec!(10000000000)),
            trade((2023, 1, 3), (2023, 1, 4), dec!(5), dec!(100)),
        ])
        .unwrap();
        let report = engine().extract_metrics(&table);

        assert_eq!(report.udf.potential_max_loss_ratio, dec!(0.0000000000000000000000000001));
        assert_eq!(report.udf.allowed_investing_capital, Decimal::MAX);
        assert!(report.expecting_roa.is_finite());
        assert!(report.expecting_roa > 0.0);
    }

    #[test]
    fn test_huge_drawdown_on_tiny_position_saturates_ratio() {
        let table = TradeTable::from_trades(vec![trade(
            (2023, 1, 1),
            (2023, 1, 1),
            dec!(-10000000000000000000000000000),
            dec!(0.0000000001),
        )])
        .unwrap();
        let udf = engine().extract_metrics(&table).udf;

        assert_eq!(udf.potential_max_loss_ratio, Decimal::MAX);
        assert_eq!(udf.allowed_investing_capital, dec!(0));
        assert!(matches!(udf.overall_risk_invest_ratio, Ratio::Finite(v) if v.is_finite() && v > 1e30));
    }

    #[test]
    fn test_engine_exposes_risk_manager() {
        let engine = engine();
        assert_eq!(engine.risk_manager.name(), "DrawdownRiskManager");
        assert_eq!(engine.risk_manager.risk_taking_ratio(), dec!(0.1));
    }
}
