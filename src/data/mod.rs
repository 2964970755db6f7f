//! External data access: the Yahoo Finance client and the static ticker
//! universe resource.

pub mod tickers;
pub mod yahoo;

pub use tickers::load_tickers;
pub use yahoo::{TickerSummary, YahooClient};
