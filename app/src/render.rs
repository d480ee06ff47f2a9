// In app/src/render.rs

use analytics::Report;
use anyhow::Result;
use serde::Serialize;

/// One entry of the `shards` output: either a report or the reason there is none.
#[derive(Debug, Serialize)]
pub struct ShardOutcome {
    #[serde(rename = "Requested Range")]
    pub requested_range: (String, String),
    #[serde(rename = "Metrics", skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Report>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Prints `result` as pretty JSON under a title line.
pub fn show_result<T: Serialize>(result: &T, title: &str) -> Result<()> {
    let body = serde_json::to_string_pretty(result)?;
    println!("{title}:");
    println!("{body}");
    Ok(())
}
