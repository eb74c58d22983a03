//! Error types for the virement-core library.

use thiserror::Error;

/// Main error type for the virement library.
#[derive(Error, Debug)]
pub enum VirementError {
    /// Document loading or rasterization error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Export (spreadsheet or SEPA XML) error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to turning an uploaded document into a single page.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file extension is not one of the accepted document kinds.
    #[error("unsupported document format: {0}")]
    Unsupported(String),

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The first page carries neither an image nor usable text.
    #[error("no image or text found on the first page")]
    NoRasterContent,

    /// The uploaded image could not be decoded.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors related to serializing a confirmed batch.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Nothing has been confirmed yet.
    #[error("no confirmed invoices to export")]
    EmptyBatch,

    /// Spreadsheet or CSV writer failure.
    #[error("failed to write table: {0}")]
    Table(String),

    /// XML writer failure.
    #[error("failed to write XML: {0}")]
    Xml(String),

    /// Writing the artifact to disk failed.
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Table(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Table(err.to_string())
    }
}

/// Result type for the virement library.
pub type Result<T> = std::result::Result<T, VirementError>;
