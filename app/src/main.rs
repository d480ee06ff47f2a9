// In app/src/main.rs

use analytics::{split_range, MetricsEngine, ReportFormatter, ShardPeriod};
use anyhow::{Context, Result};
use app_config::Settings;
use clap::{Parser, Subcommand, ValueEnum};
use core_types::DateRange;
use std::path::{Path, PathBuf};
use trade_store::TradeTable;
use tracing_subscriber::prelude::*;
mod render;
use crate::render::{show_result, ShardOutcome};

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Trade record analysis.")]
struct Cli {
    /// Directory holding the trade record and risk configuration files.
    #[arg(long = "dir", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extracts risk metrics for the trades inside one date range.
    Query {
        /// Start date in YYYY/MM/DD.
        #[arg(short = 's', long)]
        start_date: String,

        /// End date in YYYY/MM/DD.
        #[arg(short = 'e', long)]
        end_date: String,

        /// Omit absolute monetary figures from the report.
        #[arg(long)]
        keep_privacy: bool,
    },

    /// Splits a date range into calendar buckets and extracts metrics for each, in parallel.
    Shards {
        /// Start date in YYYY/MM/DD.
        #[arg(short = 's', long)]
        start_date: String,

        /// End date in YYYY/MM/DD.
        #[arg(short = 'e', long)]
        end_date: String,

        /// The calendar bucket to split by.
        #[arg(long, value_enum, default_value_t = Period::Month)]
        by: Period,

        /// Omit absolute monetary figures from the reports.
        #[arg(long)]
        keep_privacy: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Period {
    Month,
    Year,
}

impl From<Period> for ShardPeriod {
    fn from(period: Period) -> Self {
        match period {
            Period::Month => ShardPeriod::Month,
            Period::Year => ShardPeriod::Year,
        }
    }
}

/// Everything a query needs, loaded once at startup.
struct Workspace {
    settings: Settings,
    table: TradeTable,
    engine: MetricsEngine,
    formatter: ReportFormatter,
}

// --- Main Application Entry Point ---

fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let settings = app_config::load_settings().context("Failed to load application settings")?;
    init_tracing(&settings.app.log_level);

    // Parse command-line arguments.
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| settings.data.dir.clone());
    let workspace = load_workspace(settings, &data_dir)?;

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Query {
            start_date,
            end_date,
            keep_privacy,
        } => handle_query(&workspace, &start_date, &end_date, keep_privacy)?,
        Commands::Shards {
            start_date,
            end_date,
            by,
            keep_privacy,
        } => handle_shards(&workspace, &start_date, &end_date, by, keep_privacy)?,
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only the rendered report.
///
/// An unrecognised `log_level` falls back to `info` and is reported once the
/// subscriber is installed.
fn init_tracing(log_level: &str) {
    let parsed = parse_log_level(log_level);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new().with_default(parsed.unwrap_or(tracing::Level::INFO)),
        );
    tracing_subscriber::registry().with(fmt_layer).init();

    if parsed.is_none() {
        tracing::warn!(log_level, "Unrecognised app.log_level, falling back to info.");
    }
}

fn parse_log_level(log_level: &str) -> Option<tracing::Level> {
    log_level.trim().parse().ok()
}

fn load_workspace(settings: Settings, data_dir: &Path) -> Result<Workspace> {
    let date_format = settings.app.date_format.clone();

    let risk_path = settings.data.risk_config_path(data_dir);
    let risk_settings = app_config::load_risk_settings(&risk_path)
        .with_context(|| format!("Failed to load risk configuration from {}", risk_path.display()))?;

    let record_path = settings.data.trade_record_path(data_dir);
    let table = TradeTable::from_csv_path(&record_path, &date_format)
        .with_context(|| format!("Failed to load trade records from {}", record_path.display()))?;

    let engine = MetricsEngine::new(risk_settings)?;
    tracing::info!(trades = table.len(), "Trade record analysis ready.");

    Ok(Workspace {
        settings,
        table,
        engine,
        formatter: ReportFormatter::new(date_format),
    })
}

fn parse_range(workspace: &Workspace, start_date: &str, end_date: &str) -> Result<DateRange> {
    workspace
        .settings
        .app
        .date_format
        .parse_range(start_date, end_date)
        .context("Invalid date range")
}

// --- "Query" Subcommand Logic ---

fn handle_query(workspace: &Workspace, start_date: &str, end_date: &str, keep_privacy: bool) -> Result<()> {
    let range = parse_range(workspace, start_date, end_date)?;
    let metrics = workspace.engine.query(&workspace.table, &range)?;
    let report = workspace.formatter.format(&metrics, keep_privacy);
    show_result(&report, "Metrics")
}

// --- "Shards" Subcommand Logic ---

fn handle_shards(
    workspace: &Workspace,
    start_date: &str,
    end_date: &str,
    period: Period,
    keep_privacy: bool,
) -> Result<()> {
    let range = parse_range(workspace, start_date, end_date)?;
    let shards = split_range(&range, period.into());
    let date_format = &workspace.settings.app.date_format;

    let mut outcomes = Vec::with_capacity(shards.len());
    for (shard, result) in workspace.engine.query_shards(&workspace.table, &shards) {
        let requested_range = (date_format.render(shard.start), date_format.render(shard.end));
        let outcome = match result {
            Ok(metrics) => ShardOutcome {
                requested_range,
                metrics: Some(workspace.formatter.format(&metrics, keep_privacy)),
                error: None,
            },
            Err(analytics::Error::Store(err)) if err.is_empty_range() => {
                tracing::warn!(%shard, "No trades in shard.");
                ShardOutcome {
                    requested_range,
                    metrics: None,
                    error: Some(err.to_string()),
                }
            }
            Err(err) => return Err(err.into()),
        };
        outcomes.push(outcome);
    }

    if outcomes.iter().all(|o| o.metrics.is_none()) {
        anyhow::bail!("No trades were opened and closed between {start_date} and {end_date}");
    }

    show_result(&outcomes, "Metrics")
}
