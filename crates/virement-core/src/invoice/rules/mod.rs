//! Rule-based field extractors for invoice text.

pub mod amount;
pub mod iban;
pub mod patterns;
pub mod reference;

pub use amount::{extract_amount, is_plain_decimal, is_valid_amount, parse_amount, AmountExtractor};
pub use iban::{extract_iban, validate_bic, validate_iban, IbanExtractor};
pub use patterns::*;
pub use reference::{extract_reference, ReferenceExtractor};

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, in document order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched value with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Zero-based line number in the source text.
    pub line: Option<usize>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            line: None,
            source: source.into(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Every line matching `marker`, trimmed, in document order.
pub(crate) fn matching_lines(text: &str, marker: &Regex) -> Vec<ExtractionMatch<String>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| marker.is_match(line))
        .map(|(idx, line)| ExtractionMatch::new(line.trim().to_string(), line).with_line(idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_lines_keeps_order_and_line_numbers() {
        let text = "IBAN A\nnothing\n  IBAN B  ";
        let matches = matching_lines(text, &IBAN_LINE);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].value, "IBAN A");
        assert_eq!(matches[0].line, Some(0));
        assert_eq!(matches[1].value, "IBAN B");
        assert_eq!(matches[1].source, "  IBAN B  ");
        assert_eq!(matches[1].line, Some(2));
    }
}
