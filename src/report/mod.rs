//! Formatted terminal output: fact tables, metric tables, analyst actions,
//! and the consensus sentence.
//!
//! We keep formatting code in one place so:
//! - the fetch/tally code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
