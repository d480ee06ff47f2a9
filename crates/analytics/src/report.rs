// In crates/analytics/src/report.rs

use crate::types::{format_percentage, MetricsReport, Ratio};
use core_types::DateFormat;
use rust_decimal::prelude::*;
use serde::Serialize;

/// The presentation form of a [`MetricsReport`].
///
/// Percentages are pre-rendered strings; every other value stays numeric.
/// Fields left as `None` are omitted from the serialized output, which is
/// how the privacy-reduced report drops monetary figures.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    #[serde(rename = "Real Date Range")]
    pub real_date_range: (String, String),
    #[serde(rename = "Gross Numbers")]
    pub gross_numbers: GrossSection,
    #[serde(rename = "Common Ratios")]
    pub common_ratios: CommonSection,
    #[serde(rename = "User Defined Ratios")]
    pub udf_ratios: UdfSection,
    #[serde(rename = "Expecting ROA")]
    pub expecting_roa: String,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct GrossSection {
    #[serde(rename = "Trade Count", skip_serializing_if = "Option::is_none")]
    pub trade_count: Option<usize>,
    #[serde(rename = "Trade Volume", skip_serializing_if = "Option::is_none")]
    pub trade_volume: Option<f64>,
    #[serde(rename = "Maximum Invest", skip_serializing_if = "Option::is_none")]
    pub maximum_invest: Option<f64>,
    #[serde(rename = "Average Invest", skip_serializing_if = "Option::is_none")]
    pub average_invest: Option<f64>,
    #[serde(rename = "Net Profit", skip_serializing_if = "Option::is_none")]
    pub net_profit: Option<f64>,
    #[serde(rename = "Max Accumulated Profit", skip_serializing_if = "Option::is_none")]
    pub max_accum_profit: Option<f64>,
    #[serde(rename = "Max Accumulated Loss", skip_serializing_if = "Option::is_none")]
    pub max_accum_loss: Option<f64>,
    #[serde(rename = "Losing Streak Span", skip_serializing_if = "Option::is_none")]
    pub losing_streak_span: Option<(usize, usize)>,
    #[serde(rename = "Max Single Loss", skip_serializing_if = "Option::is_none")]
    pub max_single_loss: Option<f64>,
    #[serde(rename = "Max Single Profit", skip_serializing_if = "Option::is_none")]
    pub max_single_profit: Option<f64>,
    #[serde(rename = "Average Holding Days", skip_serializing_if = "Option::is_none")]
    pub average_holding_days: Option<f64>,
    #[serde(rename = "Max Holding Days", skip_serializing_if = "Option::is_none")]
    pub max_holding_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct CommonSection {
    #[serde(rename = "Win Ratio", skip_serializing_if = "Option::is_none")]
    pub win_ratio: Option<String>,
    #[serde(rename = "Profit Factor", skip_serializing_if = "Option::is_none")]
    pub profit_factor: Option<Ratio>,
    #[serde(rename = "Profit-Loss Ratio", skip_serializing_if = "Option::is_none")]
    pub profit_loss_ratio: Option<Ratio>,
    #[serde(rename = "ROA", skip_serializing_if = "Option::is_none")]
    pub roa: Option<String>,
    #[serde(rename = "ROI", skip_serializing_if = "Option::is_none")]
    pub roi: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct UdfSection {
    #[serde(rename = "Return on Average Investment", skip_serializing_if = "Option::is_none")]
    pub return_on_average_investment: Option<String>,
    #[serde(rename = "Return on Trades", skip_serializing_if = "Option::is_none")]
    pub return_on_trades: Option<String>,
    #[serde(rename = "Avg Invest During Losing Streak", skip_serializing_if = "Option::is_none")]
    pub avg_invest_during_losing_streak: Option<f64>,
    #[serde(rename = "Potential Max Loss Ratio", skip_serializing_if = "Option::is_none")]
    pub potential_max_loss_ratio: Option<f64>,
    #[serde(rename = "Allowed Investing Capital", skip_serializing_if = "Option::is_none")]
    pub allowed_investing_capital: Option<f64>,
    #[serde(rename = "Risk-Invest Ratio", skip_serializing_if = "Option::is_none")]
    pub risk_invest_ratio: Option<f64>,
    #[serde(rename = "Profit-Risk Ratio", skip_serializing_if = "Option::is_none")]
    pub profit_risk_ratio: Option<Ratio>,
    #[serde(rename = "Overall Risk-Invest Ratio", skip_serializing_if = "Option::is_none")]
    pub overall_risk_invest_ratio: Option<Ratio>,
    #[serde(rename = "Max Drawdown Percentage", skip_serializing_if = "Option::is_none")]
    pub max_drawdown_percentage: Option<String>,
}

/// Turns raw metrics into presentation records.
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    date_format: DateFormat,
}

impl ReportFormatter {
    pub fn new(date_format: DateFormat) -> Self {
        Self { date_format }
    }

    /// Renders `metrics`; with `keep_privacy` only scale-free fields survive.
    pub fn format(&self, metrics: &MetricsReport, keep_privacy: bool) -> Report {
        let full = self.format_full(metrics);
        if keep_privacy { redact(full) } else { full }
    }

    fn format_full(&self, metrics: &MetricsReport) -> Report {
        let gross = &metrics.gross;
        let common = &metrics.common;
        let udf = &metrics.udf;

        Report {
            real_date_range: (
                self.date_format.render(metrics.real_date_range.start),
                self.date_format.render(metrics.real_date_range.end),
            ),
            gross_numbers: GrossSection {
                trade_count: Some(gross.trade_count),
                trade_volume: gross.total_invested.to_f64(),
                maximum_invest: gross.max_single_invested.to_f64(),
                average_invest: gross.average_invested.to_f64(),
                net_profit: gross.net_profit.to_f64(),
                max_accum_profit: gross.max_accum_profit.to_f64(),
                max_accum_loss: gross.max_accum_loss.to_f64(),
                losing_streak_span: gross.losing_streak_span,
                max_single_loss: gross.max_single_loss.to_f64(),
                max_single_profit: gross.max_single_profit.to_f64(),
                average_holding_days: Some(gross.average_holding_days),
                max_holding_days: Some(gross.max_holding_days),
            },
            common_ratios: CommonSection {
                win_ratio: Some(common.win_ratio.as_percentage()),
                profit_factor: Some(common.profit_factor),
                profit_loss_ratio: Some(common.profit_loss_ratio),
                roa: Some(format_percentage(common.roa)),
                roi: Some(format_percentage(common.roi)),
            },
            udf_ratios: UdfSection {
                return_on_average_investment: Some(format_percentage(udf.return_on_average_investment)),
                return_on_trades: Some(format_percentage(udf.return_on_trades)),
                avg_invest_during_losing_streak: udf.avg_invest_during_losing_streak.to_f64(),
                potential_max_loss_ratio: udf.potential_max_loss_ratio.to_f64(),
                allowed_investing_capital: udf.allowed_investing_capital.to_f64(),
                risk_invest_ratio: udf.risk_invest_ratio.to_f64(),
                profit_risk_ratio: Some(udf.profit_risk_ratio),
                overall_risk_invest_ratio: Some(udf.overall_risk_invest_ratio),
                max_drawdown_percentage: Some(format_percentage(udf.max_drawdown_percentage)),
            },
            expecting_roa: format_percentage(metrics.expecting_roa),
        }
    }
}

/// Keeps the fixed allow-list of fields that do not disclose the scale of capital.
fn redact(full: Report) -> Report {
    Report {
        real_date_range: full.real_date_range,
        gross_numbers: GrossSection {
            average_holding_days: full.gross_numbers.average_holding_days,
            max_holding_days: full.gross_numbers.max_holding_days,
            ..Default::default()
        },
        common_ratios: CommonSection {
            win_ratio: full.common_ratios.win_ratio,
            roi: full.common_ratios.roi,
            ..Default::default()
        },
        udf_ratios: UdfSection {
            potential_max_loss_ratio: full.udf_ratios.potential_max_loss_ratio,
            risk_invest_ratio: full.udf_ratios.risk_invest_ratio,
            profit_risk_ratio: full.udf_ratios.profit_risk_ratio,
            overall_risk_invest_ratio: full.udf_ratios.overall_risk_invest_ratio,
            ..Default::default()
        },
        expecting_roa: full.expecting_roa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MetricsEngine;
    use chrono::NaiveDate;
    use core_types::Trade;
    use risk::RiskSettings;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use trade_store::TradeTable;

    const MONETARY_KEYS: [&str; 6] = [
        "Trade Volume",
        "Maximum Invest",
        "Average Invest",
        "Net Profit",
        "Avg Invest During Losing Streak",
        "Allowed Investing Capital",
    ];

    fn scenario_metrics() -> MetricsReport {
        let day = |d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap();
        let table = TradeTable::from_trades(vec![
            Trade::new(day(1), day(2), dec!(100), dec!(0), dec!(1000)).unwrap(),
            Trade::new(day(3), day(4), dec!(-50), dec!(0), dec!(500)).unwrap(),
            Trade::new(day(5), day(5), dec!(-30), dec!(0), dec!(500)).unwrap(),
        ])
        .unwrap();
        let engine = MetricsEngine::new(RiskSettings { capital: 10_000.0, risk_taking_ratio: 0.1 }).unwrap();
        engine.extract_metrics(&table)
    }

    fn all_keys(value: &Value) -> Vec<String> {
        let mut keys = Vec::new();
        if let Value::Object(map) = value {
            for (key, nested) in map {
                keys.push(key.clone());
                keys.extend(all_keys(nested));
            }
        }
        keys
    }

    #[test]
    fn test_full_report_renders_percentages() {
        let report = ReportFormatter::default().format(&scenario_metrics(), false);

        assert_eq!(report.real_date_range, ("2023/01/01".to_string(), "2023/01/05".to_string()));
        assert_eq!(report.common_ratios.roi.as_deref(), Some("2.00%"));
        assert_eq!(report.common_ratios.roa.as_deref(), Some("0.20%"));
        assert_eq!(report.common_ratios.win_ratio.as_deref(), Some("33.33%"));
        assert_eq!(report.udf_ratios.max_drawdown_percentage.as_deref(), Some("0.80%"));
        assert_eq!(report.expecting_roa, "1.25%");
        assert_eq!(report.gross_numbers.net_profit, Some(20.0));
        assert_eq!(report.udf_ratios.allowed_investing_capital, Some(6250.0));
    }

    #[test]
    fn test_full_report_serializes_with_labels() {
        let report = ReportFormatter::default().format(&scenario_metrics(), false);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["Gross Numbers"]["Net Profit"], Value::from(20.0));
        assert_eq!(json["Gross Numbers"]["Losing Streak Span"], serde_json::json!([1, 2]));
        assert_eq!(json["Common Ratios"]["ROI"], Value::from("2.00%"));
        assert_eq!(json["User Defined Ratios"]["Risk-Invest Ratio"], Value::from(0.16));
        assert_eq!(json["Real Date Range"], serde_json::json!(["2023/01/01", "2023/01/05"]));

        let keys = all_keys(&json);
        for key in MONETARY_KEYS {
            assert!(keys.iter().any(|k| k == key), "{key} missing from full report");
        }
    }

    #[test]
    fn test_private_report_omits_monetary_figures() {
        let report = ReportFormatter::default().format(&scenario_metrics(), true);
        let json = serde_json::to_value(&report).unwrap();
        let keys = all_keys(&json);

        for key in MONETARY_KEYS {
            assert!(!keys.iter().any(|k| k == key), "{key} leaked into private report");
        }
        assert_eq!(json["Common Ratios"]["ROI"], Value::from("2.00%"));
        assert_eq!(json["Common Ratios"]["Win Ratio"], Value::from("33.33%"));
        assert_eq!(json["Gross Numbers"]["Max Holding Days"], Value::from(2));
        assert_eq!(json["Expecting ROA"], Value::from("1.25%"));
        assert!(json["User Defined Ratios"].get("Profit-Risk Ratio").is_some());
    }

    #[test]
    fn test_sentinel_ratios_render_as_strings() {
        let mut metrics = scenario_metrics();
        metrics.common.win_ratio = Ratio::Unbounded;
        metrics.udf.profit_risk_ratio = Ratio::Unbounded;
        metrics.common.profit_factor = Ratio::Undefined;

        let json = serde_json::to_value(ReportFormatter::default().format(&metrics, false)).unwrap();
        assert_eq!(json["Common Ratios"]["Win Ratio"], Value::from("inf"));
        assert_eq!(json["Common Ratios"]["Profit Factor"], Value::from("nan"));
        assert_eq!(json["User Defined Ratios"]["Profit-Risk Ratio"], Value::from("inf"));
    }
}
