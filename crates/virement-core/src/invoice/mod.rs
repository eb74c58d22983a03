//! Invoice field extraction module.

pub mod rules;

use tracing::debug;

use crate::models::record::FieldSuggestions;

use rules::{AmountExtractor, FieldExtractor, IbanExtractor, ReferenceExtractor};

/// Derive suggested field values from recognized text.
///
/// Never fails: fields whose pattern is absent stay `None`.
pub fn extract_fields(text: &str) -> FieldSuggestions {
    let suggestions = FieldSuggestions {
        amount_due: AmountExtractor::new().extract(text).map(|m| m.value),
        invoice_reference: ReferenceExtractor::new().extract(text).map(|m| m.value),
        creditor_iban: IbanExtractor::new().extract(text).map(|m| m.value),
    };

    debug!(
        "Extracted {}/3 fields from {} chars of text",
        suggestions.found_count(),
        text.len()
    );

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_fields_full_invoice() {
        let text = "\
PAPETERIE DURAND
Facture n° FA-2024-0042
Date : 05/02/2024

Désignation        Qté   Prix
Ramettes A4         10   45.00

Total HT 45.00
TVA 20% 9.00
Total TTC 54.00 EUR

Règlement par virement
IBAN : FR76 3000 6000 0112 3456 7890 189
BIC : AGRIFRPP";

        assert_eq!(
            extract_fields(text),
            FieldSuggestions {
                amount_due: Some("54.00".to_string()),
                invoice_reference: Some("Facture n° FA-2024-0042".to_string()),
                creditor_iban: Some("IBAN : FR76 3000 6000 0112 3456 7890 189".to_string()),
            }
        );
    }

    #[test]
    fn test_extract_fields_nothing_found() {
        assert_eq!(extract_fields("illegible scan"), FieldSuggestions::default());
    }

    #[test]
    fn test_same_line_feeds_two_fields() {
        let fields = extract_fields("Facture 7 - IBAN FR76 0000");
        assert_eq!(fields.invoice_reference.as_deref(), Some("Facture 7 - IBAN FR76 0000"));
        assert_eq!(fields.creditor_iban.as_deref(), Some("Facture 7 - IBAN FR76 0000"));
        assert_eq!(fields.amount_due, None);
    }
}
