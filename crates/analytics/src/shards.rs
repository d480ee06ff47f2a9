// In crates/analytics/src/shards.rs

use chrono::{Datelike, NaiveDate};
use core_types::DateRange;

/// The calendar bucket used to split a long range into independent queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardPeriod {
    Month,
    Year,
}

/// Splits `range` into consecutive, non-overlapping calendar buckets.
///
/// The first and last shard are clipped to the range bounds.
pub fn split_range(range: &DateRange, period: ShardPeriod) -> Vec<DateRange> {
    let mut shards = Vec::new();
    let mut cursor = range.start;

    while cursor <= range.end {
        let shard_end = period_end(cursor, period).map_or(range.end, |end| end.min(range.end));
        shards.push(DateRange { start: cursor, end: shard_end });

        match shard_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    shards
}

/// Last day of the month or year containing `date`.
fn period_end(date: NaiveDate, period: ShardPeriod) -> Option<NaiveDate> {
    let next_start = match period {
        ShardPeriod::Month if date.month() == 12 => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1),
        ShardPeriod::Month => NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1),
        ShardPeriod::Year => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1),
    };
    next_start?.pred_opt()
}
