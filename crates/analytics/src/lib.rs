// In crates/analytics/src/lib.rs

pub mod engine;
pub mod error;
pub mod report;
pub mod runs;
pub mod shards;
pub mod types;

pub use engine::MetricsEngine;
pub use error::{Error, Result};
pub use report::{Report, ReportFormatter};
pub use shards::{split_range, ShardPeriod};
pub use types::{CommonRatios, GrossNumbers, MetricsReport, Ratio, UdfRatios};
