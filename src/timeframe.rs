//! Symbolic timeframe selectors and their resolution to concrete date ranges.
//!
//! A timeframe is a label like `1M` or `YTD`. Resolution is a pure function of
//! `(label, now)`: the caller snapshots "now" once per request and passes it
//! in, which keeps the mapping deterministic and testable.
//!
//! Deltas are calendar days, not trading days. `1W` is five calendar days to
//! approximate a trading week.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Start-of-history sentinel used by `MAX` to request the provider's full
/// available range.
const MAX_SENTINEL_YEAR: i32 = 1900;

/// A symbolic duration selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    #[value(name = "1D")]
    D1,
    #[serde(rename = "1W")]
    #[value(name = "1W")]
    W1,
    #[serde(rename = "1M")]
    #[value(name = "1M")]
    M1,
    #[serde(rename = "3M")]
    #[value(name = "3M")]
    M3,
    #[serde(rename = "6M")]
    #[value(name = "6M")]
    M6,
    #[serde(rename = "YTD")]
    #[value(name = "YTD")]
    Ytd,
    #[serde(rename = "1Y")]
    #[value(name = "1Y")]
    Y1,
    #[serde(rename = "2Y")]
    #[value(name = "2Y")]
    Y2,
    #[serde(rename = "5Y")]
    #[value(name = "5Y")]
    Y5,
    #[serde(rename = "10Y")]
    #[value(name = "10Y")]
    Y10,
    #[serde(rename = "MAX")]
    #[value(name = "MAX")]
    Max,
}

/// A resolved request window. `end` is always the "now" snapshot the range
/// was resolved from, so `start <= end` holds for every timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Start bound as epoch seconds (naive instant taken as UTC; the
    /// provider defines bound inclusivity).
    pub fn start_epoch(&self) -> i64 {
        self.start.and_utc().timestamp()
    }

    /// End bound as epoch seconds.
    pub fn end_epoch(&self) -> i64 {
        self.end.and_utc().timestamp()
    }
}

impl Timeframe {
    /// All selectors in display order.
    pub const ALL: [Timeframe; 11] = [
        Timeframe::D1,
        Timeframe::W1,
        Timeframe::M1,
        Timeframe::M3,
        Timeframe::M6,
        Timeframe::Ytd,
        Timeframe::Y1,
        Timeframe::Y2,
        Timeframe::Y5,
        Timeframe::Y10,
        Timeframe::Max,
    ];

    /// The symbolic label, e.g. `"1M"`.
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::D1 => "1D",
            Timeframe::W1 => "1W",
            Timeframe::M1 => "1M",
            Timeframe::M3 => "3M",
            Timeframe::M6 => "6M",
            Timeframe::Ytd => "YTD",
            Timeframe::Y1 => "1Y",
            Timeframe::Y2 => "2Y",
            Timeframe::Y5 => "5Y",
            Timeframe::Y10 => "10Y",
            Timeframe::Max => "MAX",
        }
    }

    /// Fixed calendar-day delta, or `None` for the `YTD`/`MAX` special cases.
    pub fn fixed_delta_days(self) -> Option<i64> {
        match self {
            Timeframe::D1 => Some(1),
            Timeframe::W1 => Some(5),
            Timeframe::M1 => Some(30),
            Timeframe::M3 => Some(90),
            Timeframe::M6 => Some(180),
            Timeframe::Y1 => Some(365),
            Timeframe::Y2 => Some(730),
            Timeframe::Y5 => Some(1825),
            Timeframe::Y10 => Some(3650),
            Timeframe::Ytd | Timeframe::Max => None,
        }
    }

    /// Next selector in display order, wrapping at the end.
    pub fn next(self) -> Timeframe {
        let idx = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous selector in display order, wrapping at the start.
    pub fn prev(self) -> Timeframe {
        let idx = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Resolve this selector against a "now" snapshot.
    ///
    /// - fixed-delta selectors: `start = now - delta_days`
    /// - `YTD`: January 1 of the current year, time zeroed
    /// - `MAX`: the 1900 sentinel
    pub fn resolve(self, now: NaiveDateTime) -> DateRange {
        let start = match self {
            Timeframe::Ytd => jan1(now.year()),
            Timeframe::Max => jan1(MAX_SENTINEL_YEAR),
            _ => {
                let days = self.fixed_delta_days().unwrap_or(0);
                now - chrono::Duration::days(days)
            }
        };
        DateRange { start, end: now }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Timeframe::ALL
            .into_iter()
            .find(|t| t.label() == wanted)
            .ok_or_else(|| {
                let valid = Timeframe::ALL.map(|t| t.label()).join(", ");
                AppError::new(2, format!("Invalid timeframe '{s}'. Valid: {valid}."))
            })
    }
}

/// Midnight, January 1 of `year`. Total for any in-range chrono year.
fn jan1(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(13, 45, 30)
            .unwrap()
    }

    #[test]
    fn fixed_deltas_subtract_calendar_days() {
        let expected = [
            (Timeframe::D1, 1),
            (Timeframe::W1, 5),
            (Timeframe::M1, 30),
            (Timeframe::M3, 90),
            (Timeframe::M6, 180),
            (Timeframe::Y1, 365),
            (Timeframe::Y2, 730),
            (Timeframe::Y5, 1825),
            (Timeframe::Y10, 3650),
        ];
        for (tf, days) in expected {
            let range = tf.resolve(now());
            assert_eq!(range.end, now(), "{tf}: end should be the now snapshot");
            assert_eq!(
                range.start,
                now() - chrono::Duration::days(days),
                "{tf}: start should be now - {days}d"
            );
        }
    }

    #[test]
    fn ytd_starts_january_first_time_zeroed() {
        let range = Timeframe::Ytd.resolve(now());
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(range.start, jan1);
        assert_eq!(range.end, now());
    }

    #[test]
    fn max_starts_at_1900_sentinel() {
        let range = Timeframe::Max.resolve(now());
        let sentinel = NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(range.start, sentinel);
    }

    #[test]
    fn start_never_exceeds_end() {
        for tf in Timeframe::ALL {
            let range = tf.resolve(now());
            assert!(range.start <= range.end, "{tf}: start > end");
        }
    }

    #[test]
    fn each_call_uses_its_own_now_snapshot() {
        let later = now() + chrono::Duration::hours(2);
        let a = Timeframe::M1.resolve(now());
        let b = Timeframe::M1.resolve(later);
        assert_eq!(a.end, now());
        assert_eq!(b.end, later);
    }

    #[test]
    fn labels_parse_round_trip() {
        for tf in Timeframe::ALL {
            let parsed: Timeframe = tf.label().parse().unwrap();
            assert_eq!(parsed, tf);
        }
        // Parsing is forgiving about case and surrounding whitespace.
        assert_eq!(" ytd ".parse::<Timeframe>().unwrap(), Timeframe::Ytd);
    }

    #[test]
    fn unknown_labels_are_rejected() {
        for bad in ["7D", "1w2", "", "forever"] {
            let err = bad.parse::<Timeframe>().unwrap_err();
            assert_eq!(err.exit_code(), 2, "'{bad}' should be a usage error");
        }
    }

    #[test]
    fn next_prev_cycle_the_full_set() {
        let mut tf = Timeframe::D1;
        for _ in 0..Timeframe::ALL.len() {
            tf = tf.next();
        }
        assert_eq!(tf, Timeframe::D1);
        assert_eq!(Timeframe::D1.prev(), Timeframe::Max);
        assert_eq!(Timeframe::Max.next(), Timeframe::D1);
    }

    #[test]
    fn epoch_bounds_are_ordered() {
        let range = Timeframe::Y1.resolve(now());
        assert!(range.start_epoch() < range.end_epoch());
    }
}
