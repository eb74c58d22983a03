//! Core library turning scanned invoices into SEPA payment batches.
//!
//! This crate provides:
//! - First-page rasterization of PDF and image uploads
//! - OCR through a pluggable recognizer (pure Rust ONNX engine by default)
//! - Heuristic invoice field extraction (amount, reference, IBAN)
//! - An append-only operator session of confirmed records
//! - Tabular (xlsx/CSV) and SEPA pain.001.001.03 XML exports

pub mod document;
pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod session;

pub use document::{DocumentKind, UploadedDocument};
pub use error::{DocumentError, ExportError, OcrError, Result, VirementError};
pub use export::{Artifact, SepaSerializer, TabularExporter, TabularFormat};
pub use invoice::extract_fields;
pub use models::config::VirementConfig;
pub use models::record::{FieldSuggestions, InvoiceRecord};
pub use ocr::TextRecognizer;
#[cfg(feature = "native")]
pub use ocr::{LazyOcrEngine, PureOcrEngine};
pub use pdf::{DocumentRasterizer, FirstPageRasterizer, RasterPage};
pub use pipeline::{DocumentPipeline, Suggestion};
pub use session::{AcceptSuggestions, BatchSession, IngestReport, RecordForm};
