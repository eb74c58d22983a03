//! Turning uploaded documents into a single page.

mod rasterizer;

pub use rasterizer::FirstPageRasterizer;

use crate::document::UploadedDocument;
use crate::error::DocumentError;
use image::DynamicImage;

/// The one page taken from an uploaded document.
#[derive(Debug, Clone)]
pub enum RasterPage {
    /// A raster image that still needs recognition.
    Image(DynamicImage),
    /// Text that is already usable (embedded PDF text or a transcript).
    Text(String),
}

/// Result type for rasterization.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Trait for document rasterizers.
pub trait DocumentRasterizer {
    /// Produce the first page of a document.
    fn first_page(&self, document: &UploadedDocument) -> Result<RasterPage>;
}
