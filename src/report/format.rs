//! String builders for the `show` report and the TUI sidebar.

use crate::consensus::{ConsensusResult, TALLY_WINDOW};
use crate::domain::{CompanyInfo, DashboardData, GradeRecord, KeyMetrics, TickerBundle};
use crate::timeframe::{DateRange, Timeframe};

/// Shown whenever the `1D` timeframe is selected.
pub const ONE_DAY_NOTE: &str = "Please note that if Market is closed, 1D will show nothing";

/// Company facts block.
pub fn format_company_info(info: &CompanyInfo) -> String {
    let mut out = String::new();
    push_row(&mut out, "Company Name", info.long_name.as_deref());
    push_row(&mut out, "Ticker", info.symbol.as_deref());
    push_row(&mut out, "Exchange", info.exchange.as_deref());
    push_row(&mut out, "Sector", info.sector.as_deref());
    push_row(&mut out, "Industry", info.industry.as_deref());
    out
}

/// Key metrics block.
pub fn format_key_metrics(metrics: &KeyMetrics) -> String {
    let mut out = String::new();
    push_row(&mut out, "Open", fmt_price(metrics.open).as_deref());
    push_row(
        &mut out,
        "Previous Close",
        fmt_price(metrics.previous_close).as_deref(),
    );
    push_row(&mut out, "Day High", fmt_price(metrics.day_high).as_deref());
    push_row(&mut out, "Day Low", fmt_price(metrics.day_low).as_deref());
    push_row(
        &mut out,
        "52-Week High",
        fmt_price(metrics.fifty_two_week_high).as_deref(),
    );
    push_row(
        &mut out,
        "52-Week Low",
        fmt_price(metrics.fifty_two_week_low).as_deref(),
    );
    push_row(&mut out, "Volume", fmt_big(metrics.volume).as_deref());
    push_row(&mut out, "Market Cap", fmt_big(metrics.market_cap).as_deref());
    out
}

/// Recent analyst actions table, most recent first.
pub fn format_grades(grades: &[GradeRecord]) -> String {
    if grades.is_empty() {
        return "No analyst actions on record.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:<24} {:<16} {:<16}\n",
        "Date Graded", "Firm", "Previous Grade", "Current Grade"
    ));
    for grade in grades.iter().take(TALLY_WINDOW) {
        out.push_str(&format!(
            "{:<12} {:<24} {:<16} {:<16}\n",
            grade.date.format("%Y-%m-%d"),
            truncate(&grade.firm, 24),
            truncate(&grade.from_grade, 16),
            truncate(&grade.to_grade, 16),
        ));
    }
    out
}

/// The consensus sentence, verbatim.
pub fn format_consensus(consensus: &ConsensusResult) -> String {
    format!(
        "The current consensus between experts is '{}' with {} occurrences out of the most recent 15.",
        consensus.word, consensus.count
    )
}

/// One-line description of the resolved window plus the close move across it.
pub fn format_window_summary(timeframe: Timeframe, range: &DateRange, bundle: &TickerBundle) -> String {
    let mut out = format!(
        "Timeframe: {} ({} to {})\n",
        timeframe.label(),
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d"),
    );

    match (bundle.series.last_close(), bundle.series.window_change_pct()) {
        (Some(last), Some(pct)) => {
            out.push_str(&format!("Close: {last:.2} ({pct:+.2}% over window)\n"));
        }
        (Some(last), None) => {
            out.push_str(&format!("Close: {last:.2}\n"));
        }
        _ => out.push_str("No price data in the selected window.\n"),
    }
    out
}

/// Full `qd show` report: window summary, sidebar blocks for the primary
/// ticker, then the comparison ticker's blocks when present.
pub fn format_dashboard(data: &DashboardData) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", data.primary.title()));
    out.push_str(&format_window_summary(data.timeframe, &data.range, &data.primary));
    if data.timeframe == Timeframe::D1 {
        out.push_str(ONE_DAY_NOTE);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format_bundle(&data.primary));

    if let Some(compare) = &data.compare {
        out.push_str(&format!("\n=== {} ===\n", compare.title()));
        out.push_str(&format_window_summary(data.timeframe, &data.range, compare));
        out.push('\n');
        out.push_str(&format_bundle(compare));
    }

    out
}

fn format_bundle(bundle: &TickerBundle) -> String {
    let mut out = String::new();
    out.push_str(&format_company_info(&bundle.info));
    out.push('\n');
    out.push_str(&format_key_metrics(&bundle.metrics));
    out.push('\n');
    out.push_str(&format_grades(&bundle.recent_grades));
    if let Some(consensus) = &bundle.consensus {
        out.push('\n');
        out.push_str(&format_consensus(consensus));
        out.push('\n');
    }
    out
}

fn push_row(out: &mut String, label: &str, value: Option<&str>) {
    out.push_str(&format!("{label:<16} {}\n", value.unwrap_or("-")));
}

/// Two-decimal price, or `None` to render a dash.
fn fmt_price(value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{v:.2}"))
}

/// Humanized large quantity (volume, market cap): 3.30T, 51.00M, ...
fn fmt_big(value: Option<f64>) -> Option<String> {
    let v = value?;
    let formatted = if v.abs() >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if v.abs() >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v.abs() >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v.abs() >= 1e3 {
        format!("{:.2}K", v / 1e3)
    } else {
        format!("{v:.0}")
    };
    Some(formatted)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PricePoint, PriceSeries};
    use chrono::NaiveDate;

    fn bundle() -> TickerBundle {
        TickerBundle {
            symbol: "AAPL".to_string(),
            series: PriceSeries {
                points: vec![
                    PricePoint {
                        date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                        close: 200.0,
                    },
                    PricePoint {
                        date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
                        close: 210.0,
                    },
                ],
            },
            info: CompanyInfo {
                long_name: Some("Apple Inc.".to_string()),
                short_name: Some("Apple".to_string()),
                symbol: Some("AAPL".to_string()),
                exchange: Some("NasdaqGS".to_string()),
                sector: Some("Technology".to_string()),
                industry: None,
            },
            metrics: KeyMetrics {
                open: Some(213.6),
                previous_close: Some(212.5),
                day_high: None,
                day_low: None,
                fifty_two_week_high: Some(237.2),
                fifty_two_week_low: Some(164.1),
                volume: Some(51_000_000.0),
                market_cap: Some(3_300_000_000_000.0),
            },
            recent_grades: vec![GradeRecord {
                date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
                firm: "Morgan Stanley".to_string(),
                from_grade: "Equal-Weight".to_string(),
                to_grade: "Overweight".to_string(),
            }],
            consensus: Some(ConsensusResult {
                word: "Overweight".to_string(),
                count: 4,
            }),
        }
    }

    #[test]
    fn consensus_sentence_is_verbatim() {
        let sentence = format_consensus(&ConsensusResult {
            word: "Buy".to_string(),
            count: 7,
        });
        assert_eq!(
            sentence,
            "The current consensus between experts is 'Buy' with 7 occurrences out of the most recent 15."
        );
    }

    #[test]
    fn company_info_renders_dash_for_missing_fields() {
        let text = format_company_info(&bundle().info);
        assert!(text.contains("Company Name"));
        assert!(text.contains("Apple Inc."));
        assert!(text.lines().any(|l| l.starts_with("Industry") && l.ends_with('-')));
    }

    #[test]
    fn metrics_humanize_large_values() {
        let text = format_key_metrics(&bundle().metrics);
        assert!(text.contains("3.30T"));
        assert!(text.contains("51.00M"));
        assert!(text.contains("213.60"));
    }

    #[test]
    fn grades_table_has_headers_and_rows() {
        let text = format_grades(&bundle().recent_grades);
        assert!(text.contains("Date Graded"));
        assert!(text.contains("Morgan Stanley"));
        assert!(text.contains("Equal-Weight"));
        assert!(text.contains("Overweight"));
    }

    #[test]
    fn dashboard_report_includes_compare_block() {
        let mut compare = bundle();
        compare.symbol = "MSFT".to_string();
        compare.info.short_name = Some("Microsoft".to_string());

        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let data = DashboardData {
            range: Timeframe::Ytd.resolve(now),
            timeframe: Timeframe::Ytd,
            primary: bundle(),
            compare: Some(compare),
        };

        let text = format_dashboard(&data);
        assert!(text.contains("=== AAPL - Apple ==="));
        assert!(text.contains("=== MSFT - Microsoft ==="));
        assert!(text.contains("Timeframe: YTD"));
        assert!(text.contains("+5.00% over window"));
    }

    #[test]
    fn one_day_note_only_for_1d() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut data = DashboardData {
            range: Timeframe::D1.resolve(now),
            timeframe: Timeframe::D1,
            primary: bundle(),
            compare: None,
        };
        assert!(format_dashboard(&data).contains(ONE_DAY_NOTE));

        data.timeframe = Timeframe::M1;
        data.range = Timeframe::M1.resolve(now);
        assert!(!format_dashboard(&data).contains(ONE_DAY_NOTE));
    }
}
