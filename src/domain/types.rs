//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can
//! be used in-memory during a render pass and inspected in tests without any
//! provider round trip.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::consensus::ConsensusResult;
use crate::timeframe::{DateRange, Timeframe};

/// One daily close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily close series for one symbol, ascending by date.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.points.first().map(|p| p.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Percent change from first to last close over the fetched window.
    pub fn window_change_pct(&self) -> Option<f64> {
        let first = self.first_close()?;
        let last = self.last_close()?;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

/// Company facts shown in the sidebar. Fields the provider omits stay `None`
/// and render as a dash.
#[derive(Debug, Clone, Default)]
pub struct CompanyInfo {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub symbol: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

/// Key trading metrics shown in the sidebar.
#[derive(Debug, Clone, Default)]
pub struct KeyMetrics {
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

/// One analyst rating action. The provider's "action" classification is
/// intentionally dropped; only the grade text feeds the consensus tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRecord {
    pub date: NaiveDate,
    pub firm: String,
    pub from_grade: String,
    pub to_grade: String,
}

/// Everything fetched and derived for one symbol.
#[derive(Debug, Clone)]
pub struct TickerBundle {
    pub symbol: String,
    pub series: PriceSeries,
    pub info: CompanyInfo,
    pub metrics: KeyMetrics,
    /// Most-recent-first, truncated to the tally window.
    pub recent_grades: Vec<GradeRecord>,
    /// `None` when there were no grades to tally.
    pub consensus: Option<ConsensusResult>,
}

impl TickerBundle {
    /// Sidebar title, e.g. `"AAPL - Apple Inc."`.
    pub fn title(&self) -> String {
        let name = self
            .info
            .short_name
            .as_deref()
            .or(self.info.long_name.as_deref())
            .unwrap_or("-");
        format!("{} - {}", self.symbol, name)
    }
}

/// Assembled output of one dashboard render pass.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub range: DateRange,
    pub timeframe: Timeframe,
    pub primary: TickerBundle,
    pub compare: Option<TickerBundle>,
}

/// Per-request selection state, passed explicitly from the UI layer into the
/// pipeline. There is no shared mutable selection state anywhere else.
#[derive(Debug, Clone)]
pub struct DashConfig {
    pub symbol: String,
    pub compare: Option<String>,
    pub timeframe: Timeframe,
}
