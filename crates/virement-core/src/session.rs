//! The operator session: confirmed records and the form that produces them.

use chrono::Local;
use tracing::{debug, warn};

use crate::document::UploadedDocument;
use crate::export::{Artifact, SepaSerializer, TabularExporter};
use crate::models::record::InvoiceRecord;
use crate::ocr::TextRecognizer;
use crate::pdf::DocumentRasterizer;
use crate::pipeline::{DocumentPipeline, Suggestion};

/// Collects the operator's corrections for one document.
pub trait RecordForm {
    /// Review a pre-filled draft and return the confirmed record.
    fn review(&mut self, suggestion: &Suggestion, draft: InvoiceRecord) -> crate::Result<InvoiceRecord>;
}

/// Form that confirms every draft unchanged.
#[derive(Debug, Default)]
pub struct AcceptSuggestions;

impl RecordForm for AcceptSuggestions {
    fn review(&mut self, _suggestion: &Suggestion, draft: InvoiceRecord) -> crate::Result<InvoiceRecord> {
        Ok(draft)
    }
}

/// A document that could not be turned into a record.
#[derive(Debug)]
pub struct FailedDocument {
    pub name: String,
    pub error: crate::VirementError,
}

/// Outcome of one ingest pass.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Number of records confirmed in this pass.
    pub confirmed: usize,
    /// Documents that failed, in upload order.
    pub failed: Vec<FailedDocument>,
}

/// Append-only list of confirmed records for one session.
#[derive(Debug, Default)]
pub struct BatchSession {
    records: Vec<InvoiceRecord>,
}

impl BatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a confirmed record.
    pub fn confirm(&mut self, record: InvoiceRecord) {
        debug!("Confirmed record #{}: {}", self.records.len() + 1, record.invoice_reference);
        self.records.push(record);
    }

    /// Confirmed records, in confirmation order.
    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run every document through the pipeline and the form, in upload order.
    ///
    /// A failing document is reported and skipped.
    pub fn ingest<R, T, F>(
        &mut self,
        documents: &[UploadedDocument],
        pipeline: &DocumentPipeline<R, T>,
        form: &mut F,
    ) -> IngestReport
    where
        R: DocumentRasterizer,
        T: TextRecognizer,
        F: RecordForm + ?Sized,
    {
        let mut report = IngestReport::default();

        for document in documents {
            let outcome = pipeline.suggest(document).and_then(|suggestion| {
                let draft = suggestion
                    .fields
                    .clone()
                    .into_draft(Local::now().date_naive());
                form.review(&suggestion, draft)
            });

            match outcome {
                Ok(record) => {
                    self.confirm(record);
                    report.confirmed += 1;
                }
                Err(error) => {
                    warn!("Failed to process {}: {}", document.name, error);
                    report.failed.push(FailedDocument {
                        name: document.name.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Serialize the summary table. Fails on an empty session.
    pub fn export_table(&self, exporter: &TabularExporter) -> crate::export::Result<Artifact> {
        exporter.export(&self.records)
    }

    /// Serialize the SEPA batch. Fails on an empty session.
    pub fn export_sepa(&self, serializer: &SepaSerializer) -> crate::export::Result<Artifact> {
        serializer.export(&self.records)
    }
}
