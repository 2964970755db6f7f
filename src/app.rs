//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - assembles the per-request selection state
//! - dispatches to the one-shot report or the interactive TUI

use clap::Parser;

use crate::cli::{Command, ViewArgs};
use crate::data::{YahooClient, load_tickers};
use crate::domain::DashConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `qd` binary.
pub fn run() -> Result<(), AppError> {
    // We want `qd` and `qd -s AAPL` to behave like `qd tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_show(args: ViewArgs) -> Result<(), AppError> {
    let config = dash_config_from_args(&args)?;
    let client = YahooClient::new()?;
    let data = pipeline::run_dashboard(&client, &config)?;
    print!("{}", crate::report::format_dashboard(&data));
    Ok(())
}

/// Build the per-request selection state from CLI args.
///
/// When no symbol was given, the interactive picker prompts over the ticker
/// universe file.
pub fn dash_config_from_args(args: &ViewArgs) -> Result<DashConfig, AppError> {
    let symbol = match &args.symbol {
        Some(symbol) => normalize_symbol(symbol),
        None => {
            let universe = load_tickers(&args.tickers)?;
            crate::cli::picker::prompt_for_symbol(&universe)?
        }
    };

    Ok(DashConfig {
        symbol,
        compare: args.compare.as_deref().map(normalize_symbol),
        timeframe: args.timeframe,
    })
}

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Rewrite argv so `qd` defaults to `qd tui`.
///
/// Rules:
/// - `qd`                      -> `qd tui`
/// - `qd -s AAPL ...`          -> `qd tui -s AAPL ...`
/// - `qd --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
