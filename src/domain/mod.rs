//! Domain types used throughout the dashboard pipeline.
//!
//! This module defines:
//!
//! - fetched market data (`PricePoint`, `PriceSeries`, `CompanyInfo`,
//!   `KeyMetrics`, `GradeRecord`)
//! - per-request selection state (`DashConfig`)
//! - assembled render inputs (`TickerBundle`, `DashboardData`)

pub mod types;

pub use types::*;
