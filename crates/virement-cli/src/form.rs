//! Interactive record form on the terminal.

use std::io;

use chrono::NaiveDate;
use console::{style, Term};

use virement_core::{InvoiceRecord, RecordForm, Suggestion};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Answer that empties a pre-filled field.
const CLEAR: &str = "-";

/// Line-based dialogue the form runs over.
pub trait Prompter {
    /// Show `prompt` and read one answer line.
    fn ask_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Show an informational line.
    fn say(&mut self, line: &str) -> io::Result<()>;
}

impl Prompter for Term {
    fn ask_line(&mut self, prompt: &str) -> io::Result<String> {
        self.write_str(prompt)?;
        self.read_line()
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        self.write_line(line)
    }
}

/// Prompts for every record field, pre-filled with the draft values.
///
/// An empty answer keeps the pre-filled value, `-` clears it.
pub struct TerminalForm<P = Term> {
    prompter: P,
    /// Print advisory warnings after each record.
    validate: bool,
}

impl TerminalForm<Term> {
    pub fn new(validate: bool) -> Self {
        Self::with_prompter(Term::stderr(), validate)
    }
}

impl<P: Prompter> TerminalForm<P> {
    pub fn with_prompter(prompter: P, validate: bool) -> Self {
        Self { prompter, validate }
    }

    fn ask(&mut self, label: &str, default: &str) -> io::Result<String> {
        let prompt = if default.is_empty() {
            format!("  {}: ", label)
        } else {
            format!("  {} [{}]: ", label, style(default).dim())
        };
        let answer = self.prompter.ask_line(&prompt)?;

        Ok(match answer.trim() {
            "" => default.to_string(),
            CLEAR => String::new(),
            answer => answer.to_string(),
        })
    }

    fn ask_date(&mut self, label: &str, default: NaiveDate) -> io::Result<NaiveDate> {
        let default_text = default.format(DATE_FORMAT).to_string();
        loop {
            let answer = self.ask(label, &default_text)?;
            match NaiveDate::parse_from_str(&answer, DATE_FORMAT) {
                Ok(date) => return Ok(date),
                Err(_) => self.prompter.say(&format!(
                    "  {} Expected a date like {}",
                    style("✗").red(),
                    default_text
                ))?,
            }
        }
    }
}

impl<P: Prompter> RecordForm for TerminalForm<P> {
    fn review(
        &mut self,
        suggestion: &Suggestion,
        draft: InvoiceRecord,
    ) -> virement_core::Result<InvoiceRecord> {
        self.prompter.say(&format!(
            "\n{} {} ({} of 3 fields found, Enter keeps a value, '{}' clears it)",
            style("▶").cyan(),
            style(&suggestion.document).bold(),
            suggestion.fields.found_count(),
            CLEAR
        ))?;

        let record = InvoiceRecord {
            supplier_name: self.ask("Supplier name", &draft.supplier_name)?,
            invoice_reference: self.ask("Invoice reference", &draft.invoice_reference)?,
            amount_due: self.ask("Amount (EUR)", &draft.amount_due)?,
            creditor_iban: self.ask("IBAN", &draft.creditor_iban)?,
            creditor_bic: self.ask("BIC", &draft.creditor_bic)?,
            payment_date: self.ask_date("Payment date", draft.payment_date)?,
        };

        if self.validate {
            for issue in record.validate() {
                self.prompter
                    .say(&format!("  {} {}", style("⚠").yellow(), issue))?;
            }
        }

        Ok(record)
    }
}
