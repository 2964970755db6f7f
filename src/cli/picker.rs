//! Interactive ticker picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `qd show` and choose a ticker" UX
//!
//! The picker lists a preview of the loaded universe and accepts either a
//! number from the list or a symbol typed directly. Typed symbols are not
//! required to be in the universe; they are fetched as-is.

use std::io::{self, Write};

use crate::error::AppError;

/// How many universe entries to print before eliding the rest.
const PREVIEW_ROWS: usize = 20;

/// Prompt the user to select a ticker from the universe.
///
/// Behavior:
/// - list the first entries of the universe
/// - accept either a number (from the list) or a symbol
/// - `q` cancels
pub fn prompt_for_symbol(universe: &[String]) -> Result<String, AppError> {
    if universe.is_empty() {
        return Err(AppError::new(
            2,
            "Ticker universe is empty. Provide a symbol with `qd show -s <symbol>`.",
        ));
    }

    println!("Universe has {} symbol(s):", universe.len());
    for (idx, symbol) in universe.iter().take(PREVIEW_ROWS).enumerate() {
        println!("{:>3}) {symbol}", idx + 1);
    }
    if universe.len() > PREVIEW_ROWS {
        println!("     ... and {} more", universe.len() - PREVIEW_ROWS);
    }

    loop {
        print!(
            "Select a ticker by number (1-{}) or type a symbol (q to quit): ",
            universe.len()
        );
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a symbol with `qd show -s <symbol>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=universe.len()).contains(&choice) {
                return Ok(universe[choice - 1].clone());
            }
            println!(
                "Invalid choice: {choice}. Enter a number between 1 and {}.",
                universe.len()
            );
            continue;
        }

        match resolve_symbol(universe, input) {
            Some(symbol) => return Ok(symbol),
            None => {
                println!("Empty symbol. Type a ticker like AAPL.");
                continue;
            }
        }
    }
}

/// Map typed input to a symbol: the universe's canonical spelling when it
/// matches case-insensitively, otherwise the input uppercased as-is.
pub fn resolve_symbol(universe: &[String], input: &str) -> Option<String> {
    let wanted = input.trim();
    if wanted.is_empty() {
        return None;
    }
    let canonical = universe
        .iter()
        .find(|s| s.eq_ignore_ascii_case(wanted))
        .cloned();
    Some(canonical.unwrap_or_else(|| wanted.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Vec<String> {
        vec!["AAPL".to_string(), "BRK.B".to_string(), "MSFT".to_string()]
    }

    #[test]
    fn canonical_spelling_wins_case_insensitively() {
        assert_eq!(resolve_symbol(&universe(), "brk.b").as_deref(), Some("BRK.B"));
        assert_eq!(resolve_symbol(&universe(), "msft").as_deref(), Some("MSFT"));
    }

    #[test]
    fn unknown_symbols_pass_through_uppercased() {
        assert_eq!(resolve_symbol(&universe(), "nvda").as_deref(), Some("NVDA"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(resolve_symbol(&universe(), "   ").is_none());
    }
}
