//! Invoice reference extraction.

use super::patterns::REFERENCE_LINE;
use super::{matching_lines, ExtractionMatch, FieldExtractor};

/// Reference field extractor.
///
/// Picks whole lines mentioning `Facture` or `Réf`; the last one wins.
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ReferenceExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).pop()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        matching_lines(text, &REFERENCE_LINE)
    }
}

/// Extract the reference candidate line from text.
pub fn extract_reference(text: &str) -> Option<String> {
    ReferenceExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reference() {
        let text = "ACME SARL\n  Facture n° F-2024-017  \nDate : 12/03/2024";
        assert_eq!(extract_reference(text), Some("Facture n° F-2024-017".to_string()));
    }

    #[test]
    fn test_extract_reference_last_wins() {
        let text = "Facture n° 1\nRéf. client : C-88\nTotal TTC 10.00";
        assert_eq!(extract_reference(text), Some("Réf. client : C-88".to_string()));
    }

    #[test]
    fn test_extract_reference_requires_accent() {
        assert_eq!(extract_reference("Ref. client : C-88"), None);
        assert_eq!(extract_reference("facture 12"), None);
    }
}
