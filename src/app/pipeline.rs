//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! timeframe resolution -> fetch -> grade truncation -> consensus tally
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::{Local, NaiveDateTime};

use crate::consensus::{self, TALLY_WINDOW};
use crate::data::yahoo::YahooClient;
use crate::domain::{DashConfig, DashboardData, TickerBundle};
use crate::error::AppError;
use crate::timeframe::DateRange;

/// Execute a full dashboard render pass against the live clock.
pub fn run_dashboard(client: &YahooClient, config: &DashConfig) -> Result<DashboardData, AppError> {
    run_dashboard_at(client, config, Local::now().naive_local())
}

/// Execute a render pass against an explicit "now" snapshot.
///
/// The snapshot is taken once per pass: the primary and the comparison
/// ticker always share the same resolved window.
pub fn run_dashboard_at(
    client: &YahooClient,
    config: &DashConfig,
    now: NaiveDateTime,
) -> Result<DashboardData, AppError> {
    let range = config.timeframe.resolve(now);

    let primary = fetch_bundle(client, &config.symbol, &range)?;
    let compare = match &config.compare {
        Some(symbol) => Some(fetch_bundle(client, symbol, &range)?),
        None => None,
    };

    Ok(DashboardData {
        range,
        timeframe: config.timeframe,
        primary,
        compare,
    })
}

fn fetch_bundle(
    client: &YahooClient,
    symbol: &str,
    range: &DateRange,
) -> Result<TickerBundle, AppError> {
    let series = client.fetch_history(symbol, range)?;
    let summary = client.fetch_summary(symbol)?;

    // Grades arrive most-recent-first; only the tally window feeds the
    // consensus computation and the tables.
    let recent_grades: Vec<_> = summary.grades.into_iter().take(TALLY_WINDOW).collect();
    let labels: Vec<String> = recent_grades.iter().map(|g| g.to_grade.clone()).collect();

    // No grades (or token-free grades) means no sentence, not a failed pass.
    let consensus = consensus::tally(&labels).ok();

    Ok(TickerBundle {
        symbol: symbol.to_string(),
        series,
        info: summary.info,
        metrics: summary.metrics,
        recent_grades,
        consensus,
    })
}
