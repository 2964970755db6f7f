//! Consensus-word tally over recent analyst grade labels.
//!
//! Each grade is a short free-text label ("Buy", "Sector Outperform", ...)
//! drawn from an open vocabulary. The tally splits every label on whitespace
//! and reports the single most frequent token across the sequence.
//!
//! Tie-break: when several tokens share the maximum count, the winner is the
//! first of them to appear in the input. Callers rely on this being stable,
//! so the scan below must stay in first-encountered order.

use std::collections::HashMap;

use crate::error::AppError;

/// How many of the most recent grades the callers feed into the tally.
pub const TALLY_WINDOW: usize = 15;

/// The most frequent grade token and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusResult {
    pub word: String,
    pub count: usize,
}

/// Tally grade labels and return the most frequent whitespace-delimited token.
///
/// The caller is expected to have truncated `grades` to the most recent
/// entries it wants considered. A sequence with no tokens at all (empty, or
/// labels that are pure whitespace) has no well-defined winner and fails.
pub fn tally(grades: &[String]) -> Result<ConsensusResult, AppError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut seen_order: Vec<&str> = Vec::new();

    for grade in grades {
        for word in grade.split_whitespace() {
            let count = counts.entry(word).or_insert(0);
            if *count == 0 {
                seen_order.push(word);
            }
            *count += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for word in seen_order {
        let count = counts.get(word).copied().unwrap_or(0);
        // Strictly-greater keeps the earliest token on ties.
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((word, count));
        }
    }

    match best {
        Some((word, count)) => Ok(ConsensusResult {
            word: word.to_string(),
            count,
        }),
        None => Err(AppError::new(3, "No analyst grades to tally.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_sequence_fails() {
        let err = tally(&[]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn whitespace_only_labels_fail() {
        let err = tally(&labels(&["   ", "\t"])).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn multi_word_labels_are_tokenized() {
        // "Buy" + "Buy Hold" -> tokens [Buy, Buy, Hold]
        let result = tally(&labels(&["Buy", "Buy Hold"])).unwrap();
        assert_eq!(result.word, "Buy");
        assert_eq!(result.count, 2);
    }

    #[test]
    fn ties_resolve_to_first_encountered_token() {
        let result = tally(&labels(&["Outperform", "Neutral", "Sell"])).unwrap();
        assert_eq!(result.word, "Outperform");
        assert_eq!(result.count, 1);
    }

    #[test]
    fn later_majority_beats_earlier_token() {
        let result = tally(&labels(&["Hold", "Buy", "Buy"])).unwrap();
        assert_eq!(result.word, "Buy");
        assert_eq!(result.count, 2);
    }

    #[test]
    fn tally_is_idempotent() {
        let input = labels(&["Overweight", "Equal-Weight", "Overweight Buy"]);
        let first = tally(&input).unwrap();
        let second = tally(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fifteen_identical_labels_count_fifteen() {
        let input = vec!["Buy".to_string(); 15];
        let result = tally(&input).unwrap();
        assert_eq!(result.word, "Buy");
        assert_eq!(result.count, 15);
    }

    #[test]
    fn tokens_are_case_sensitive() {
        // "buy" and "Buy" are distinct tokens; first-encountered wins the tie.
        let result = tally(&labels(&["buy", "Buy"])).unwrap();
        assert_eq!(result.word, "buy");
        assert_eq!(result.count, 1);
    }
}
