//! Common patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Literal marker preceding the amount including taxes.
pub const AMOUNT_MARKER: &str = "TTC";

lazy_static! {
    // Lines carrying the creditor account
    pub static ref IBAN_LINE: Regex = Regex::new(r"FR76|IBAN").unwrap();

    // Lines carrying the invoice reference (accented form only)
    pub static ref REFERENCE_LINE: Regex = Regex::new(r"Facture|Réf").unwrap();

    // Plain decimal: ASCII digits with at most one dot
    pub static ref PLAIN_DECIMAL: Regex = Regex::new(
        r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)$"
    ).unwrap();

    // BIC: bank code, country code, location, optional branch
    pub static ref BIC_PATTERN: Regex = Regex::new(
        r"^[A-Z]{6}[A-Z0-9]{2}(?:[A-Z0-9]{3})?$"
    ).unwrap();
}
