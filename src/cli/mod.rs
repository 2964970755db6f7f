//! Command-line parsing for the stock details dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/tally code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::timeframe::Timeframe;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "qd", version, about = "Stock Details Dashboard (Yahoo-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a one-shot report: company facts, key metrics, analyst actions,
    /// and the consensus sentence.
    Show(ViewArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying dashboard pipeline as `qd show`, but
    /// renders a price chart and sidebar in a terminal UI using Ratatui.
    Tui(ViewArgs),
}

/// Common options for both front-ends.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Ticker symbol. When omitted, `show` prompts over the ticker universe
    /// and `tui` starts on the universe's first symbol.
    #[arg(short = 's', long)]
    pub symbol: Option<String>,

    /// Second symbol overlaid on the chart for comparison.
    #[arg(short = 'c', long)]
    pub compare: Option<String>,

    /// Timeframe selector.
    #[arg(short = 't', long, value_enum, default_value_t = Timeframe::Ytd)]
    pub timeframe: Timeframe,

    /// Delimited file whose first column lists the ticker universe.
    #[arg(long, default_value = "constituents.csv")]
    pub tickers: PathBuf,
}
