// In crates/trade-store/src/types.rs

use rust_decimal::Decimal;
use serde::Deserialize;

/// One raw row of the trade record source.
///
/// Two layouts are accepted: `entry_*`/`close_*` date triples, or a single
/// `year`/`month`/`day` triple for trades opened and closed on the same day.
/// The invested amount may be named `invest` or `margin`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TradeRecord {
    #[serde(default)]
    pub entry_year: Option<i32>,
    #[serde(default)]
    pub entry_month: Option<u32>,
    #[serde(default)]
    pub entry_day: Option<u32>,
    #[serde(default)]
    pub close_year: Option<i32>,
    #[serde(default)]
    pub close_month: Option<u32>,
    #[serde(default)]
    pub close_day: Option<u32>,

    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,

    #[serde(with = "rust_decimal::serde::str")]
    pub earning: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub cost: Decimal,
    #[serde(alias = "margin", with = "rust_decimal::serde::str")]
    pub invest: Decimal,
}

type Ymd = (i32, u32, u32);

impl TradeRecord {
    /// A record for a trade held from `entry` to `close`.
    pub fn held(entry: Ymd, close: Ymd, earning: Decimal, cost: Decimal, invest: Decimal) -> Self {
        Self {
            entry_year: Some(entry.0),
            entry_month: Some(entry.1),
            entry_day: Some(entry.2),
            close_year: Some(close.0),
            close_month: Some(close.1),
            close_day: Some(close.2),
            year: None,
            month: None,
            day: None,
            earning,
            cost,
            invest,
        }
    }

    /// A record for a trade opened and closed on the same day.
    pub fn same_day(date: Ymd, earning: Decimal, cost: Decimal, invest: Decimal) -> Self {
        Self {
            entry_year: None,
            entry_month: None,
            entry_day: None,
            close_year: None,
            close_month: None,
            close_day: None,
            year: Some(date.0),
            month: Some(date.1),
            day: Some(date.2),
            earning,
            cost,
            invest,
        }
    }

    /// The entry and close dates as `YYYY/MM/DD` strings, or `None` when the
    /// row carries neither a complete entry triple nor a single-date triple.
    /// A missing close triple means the trade closed on its entry day.
    pub fn date_strings(&self) -> Option<(String, String)> {
        let entry = triple(self.entry_year, self.entry_month, self.entry_day)
            .or_else(|| triple(self.year, self.month, self.day))?;
        let close = triple(self.close_year, self.close_month, self.close_day).unwrap_or(entry);
        Some((date_string(entry), date_string(close)))
    }
}

fn triple(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Option<Ymd> {
    Some((year?, month?, day?))
}

fn date_string((year, month, day): Ymd) -> String {
    format!("{year}/{month:0>2}/{day:0>2}")
}
