//! Static ticker universe loaded from a delimited text resource.
//!
//! The expected shape is an S&P-constituents style CSV whose first column is
//! the symbol (`Symbol,Name,Sector`). Only the first column is read; the
//! header row is skipped. The universe drives the picker and TUI cycling but
//! does not gate fetches.

use std::fs;
use std::path::Path;

use crate::error::AppError;

/// Load the ticker symbols from `path`.
pub fn load_tickers(path: &Path) -> Result<Vec<String>, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to read tickers file {}: {e}", path.display()),
        )
    })?;

    let tickers = parse_tickers(&raw);
    if tickers.is_empty() {
        return Err(AppError::new(
            2,
            format!("No ticker symbols found in {}.", path.display()),
        ));
    }
    Ok(tickers)
}

/// Parse symbols out of CSV text: first field of each line after the header.
fn parse_tickers(raw: &str) -> Vec<String> {
    raw.lines()
        .skip(1)
        .filter_map(|line| {
            let field = line.split(',').next().unwrap_or("");
            let symbol = field.trim().trim_matches('"').trim();
            if symbol.is_empty() {
                None
            } else {
                Some(symbol.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_column_and_skips_header() {
        let raw = "Symbol,Name,Sector\nAAPL,Apple Inc.,Technology\nMSFT,Microsoft,Technology\n";
        assert_eq!(parse_tickers(raw), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn trims_whitespace_and_quotes() {
        let raw = "Symbol\n \"BRK.B\" ,Berkshire\nGOOGL\n";
        assert_eq!(parse_tickers(raw), vec!["BRK.B", "GOOGL"]);
    }

    #[test]
    fn drops_blank_lines_and_empty_fields() {
        let raw = "Symbol,Name\n\n,missing symbol\nNVDA,NVIDIA\n";
        assert_eq!(parse_tickers(raw), vec!["NVDA"]);
    }

    #[test]
    fn header_only_file_yields_no_symbols() {
        assert!(parse_tickers("Symbol,Name,Sector\n").is_empty());
    }
}
