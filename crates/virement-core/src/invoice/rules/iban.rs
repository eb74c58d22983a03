//! IBAN line extraction plus advisory IBAN/BIC checks.

use super::patterns::{BIC_PATTERN, IBAN_LINE};
use super::{matching_lines, ExtractionMatch, FieldExtractor};

/// IBAN field extractor.
///
/// Picks whole lines mentioning `FR76` or `IBAN`; the last one wins.
pub struct IbanExtractor;

impl IbanExtractor {
    /// Create a new IBAN extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for IbanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IbanExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).pop()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        matching_lines(text, &IBAN_LINE)
    }
}

/// Extract the IBAN candidate line from text.
pub fn extract_iban(text: &str) -> Option<String> {
    IbanExtractor::new().extract(text).map(|m| m.value)
}

/// Validate an IBAN using the checksum algorithm.
///
/// Algorithm:
/// 1. Move first 4 characters to the end
/// 2. Replace letters with numbers (A=10, B=11, ..., Z=35)
/// 3. The resulting number mod 97 should equal 1
pub fn validate_iban(iban: &str) -> bool {
    let iban: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if iban.len() < 5 || !iban.is_ascii() {
        return false;
    }

    let country_code = &iban[..2];
    let check_digits = &iban[2..4];

    if !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !check_digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);

    let mut remainder: u32 = 0;
    for c in rearranged.chars() {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        // Letters expand to two digits.
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }

    remainder == 1
}

/// Check the shape of a BIC (8 or 11 characters).
pub fn validate_bic(bic: &str) -> bool {
    BIC_PATTERN.is_match(&bic.trim().to_uppercase())
}
