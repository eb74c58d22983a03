//! Amount extraction and plain-decimal parsing.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_MARKER, PLAIN_DECIMAL};
use super::{ExtractionMatch, FieldExtractor};

/// Amount field extractor.
///
/// The candidate is the first whitespace-delimited token after a `TTC` marker.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }

    fn token_after(text: &str, marker_start: usize) -> Option<&str> {
        text[marker_start + AMOUNT_MARKER.len()..].split_whitespace().next()
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        // Only the last marker counts, even when nothing follows it.
        let start = text.rfind(AMOUNT_MARKER)?;
        let token = Self::token_after(text, start)?;
        Some(ExtractionMatch::new(token.to_string(), &text[start..]))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        text.match_indices(AMOUNT_MARKER)
            .filter_map(|(start, _)| {
                Self::token_after(text, start)
                    .map(|token| ExtractionMatch::new(token.to_string(), &text[start..]))
            })
            .collect()
    }
}

/// Extract the amount candidate from text.
pub fn extract_amount(text: &str) -> Option<String> {
    AmountExtractor::new().extract(text).map(|m| m.value)
}

/// Whether an amount string is a plain non-negative decimal (`10`, `10.5`, `10.`, `.5`).
///
/// Only the shape is checked; see [`is_valid_amount`] for the range.
pub fn is_plain_decimal(s: &str) -> bool {
    PLAIN_DECIMAL.is_match(s)
}

/// Whether an amount counts towards the control sum: a plain decimal that
/// fits in a [`Decimal`].
pub fn is_valid_amount(s: &str) -> bool {
    parse_amount(s).is_some()
}

/// Parse a plain non-negative decimal.
///
/// Returns `None` for anything [`is_plain_decimal`] rejects, and for values
/// too large to be represented.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    if !is_plain_decimal(s) {
        return None;
    }

    let normalized = s.strip_suffix('.').unwrap_or(s);
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized.to_string()
    };

    Decimal::from_str(&normalized).ok()
}
