//! Invoice records confirmed by the operator and the suggestions that seed them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::invoice::rules::amount::is_valid_amount;
use crate::invoice::rules::iban::{validate_bic, validate_iban};

/// One invoice as confirmed by a human, ready for payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Supplier (creditor) name, may be empty.
    pub supplier_name: String,

    /// Invoice identifier, used as end-to-end ID and remittance note.
    pub invoice_reference: String,

    /// Amount due, kept exactly as entered.
    pub amount_due: String,

    /// Creditor IBAN, not validated.
    pub creditor_iban: String,

    /// Creditor BIC, not validated.
    pub creditor_bic: String,

    /// Requested payment date.
    pub payment_date: NaiveDate,
}

impl InvoiceRecord {
    /// Create an empty record dated `payment_date`.
    pub fn empty(payment_date: NaiveDate) -> Self {
        Self {
            supplier_name: String::new(),
            invoice_reference: String::new(),
            amount_due: String::new(),
            creditor_iban: String::new(),
            creditor_bic: String::new(),
            payment_date,
        }
    }

    /// Advisory checks. Never blocks confirmation or export.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.invoice_reference.trim().is_empty() {
            issues.push("Invoice reference is empty".to_string());
        }

        if !is_valid_amount(&self.amount_due) {
            issues.push(format!(
                "Amount '{}' is not a representable plain decimal and will be left out of the control sum",
                self.amount_due
            ));
        }

        if self.creditor_iban.trim().is_empty() {
            issues.push("Creditor IBAN is empty".to_string());
        } else if !validate_iban(&self.creditor_iban) {
            issues.push(format!("IBAN '{}' fails the checksum", self.creditor_iban));
        }

        if !self.creditor_bic.trim().is_empty() && !validate_bic(&self.creditor_bic) {
            issues.push(format!("BIC '{}' is malformed", self.creditor_bic));
        }

        issues
    }
}

/// Heuristic defaults derived from recognized text.
///
/// `None` means the pattern was not found at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSuggestions {
    /// Token following the last `TTC` marker.
    pub amount_due: Option<String>,

    /// Last line mentioning an invoice or reference.
    pub invoice_reference: Option<String>,

    /// Last line mentioning an IBAN.
    pub creditor_iban: Option<String>,
}

impl FieldSuggestions {
    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        [&self.amount_due, &self.invoice_reference, &self.creditor_iban]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }

    /// Build the draft record shown to the operator.
    pub fn into_draft(self, payment_date: NaiveDate) -> InvoiceRecord {
        InvoiceRecord {
            amount_due: self.amount_due.unwrap_or_default(),
            invoice_reference: self.invoice_reference.unwrap_or_default(),
            creditor_iban: self.creditor_iban.unwrap_or_default(),
            ..InvoiceRecord::empty(payment_date)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_into_draft_fills_missing_with_empty() {
        let suggestions = FieldSuggestions {
            amount_due: Some("99.90".to_string()),
            invoice_reference: None,
            creditor_iban: Some("IBAN FR76 1234".to_string()),
        };

        let draft = suggestions.into_draft(date());
        assert_eq!(draft.amount_due, "99.90");
        assert_eq!(draft.invoice_reference, "");
        assert_eq!(draft.creditor_iban, "IBAN FR76 1234");
        assert_eq!(draft.supplier_name, "");
        assert_eq!(draft.creditor_bic, "");
        assert_eq!(draft.payment_date, date());
    }

    #[test]
    fn test_found_count() {
        assert_eq!(FieldSuggestions::default().found_count(), 0);
        let suggestions = FieldSuggestions {
            amount_due: Some("1".to_string()),
            invoice_reference: Some("Facture 1".to_string()),
            creditor_iban: None,
        };
        assert_eq!(suggestions.found_count(), 2);
    }

    #[test]
    fn test_validate_clean_record() {
        let record = InvoiceRecord {
            supplier_name: "ACME".to_string(),
            invoice_reference: "F-001".to_string(),
            amount_due: "120.50".to_string(),
            creditor_iban: "FR7630004006950002160341716".to_string(),
            creditor_bic: "BNPAFRPPXXX".to_string(),
            payment_date: date(),
        };
        assert!(record.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_issues() {
        let record = InvoiceRecord {
            amount_due: "12,50".to_string(),
            creditor_iban: "FR7630004006950002160341717".to_string(),
            creditor_bic: "BNP".to_string(),
            ..InvoiceRecord::empty(date())
        };
        let issues = record.validate();
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().any(|i| i.contains("control sum")));
        assert!(issues.iter().any(|i| i.contains("checksum")));
        assert!(issues.iter().any(|i| i.contains("BIC")));
    }

    #[test]
    fn test_validate_flags_unrepresentable_amount() {
        let record = InvoiceRecord {
            invoice_reference: "F-002".to_string(),
            amount_due: "9".repeat(32),
            creditor_iban: "FR7630004006950002160341716".to_string(),
            ..InvoiceRecord::empty(date())
        };
        let issues = record.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("control sum"));
    }
}
