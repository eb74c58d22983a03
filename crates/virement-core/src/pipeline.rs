//! Rasterize → recognize → extract, one document at a time.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::document::UploadedDocument;
use crate::invoice::extract_fields;
use crate::models::record::FieldSuggestions;
use crate::ocr::TextRecognizer;
use crate::pdf::{DocumentRasterizer, RasterPage};

/// Pre-filled suggestions for one uploaded document.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// Name of the source document.
    pub document: String,
    /// Text the fields were extracted from.
    pub text: String,
    /// Whether the text came from OCR rather than embedded text.
    pub recognized: bool,
    /// Extracted field candidates.
    pub fields: FieldSuggestions,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Document pipeline over a rasterizer and a recognizer.
pub struct DocumentPipeline<R, T> {
    rasterizer: R,
    recognizer: T,
}

impl<R: DocumentRasterizer, T: TextRecognizer> DocumentPipeline<R, T> {
    pub fn new(rasterizer: R, recognizer: T) -> Self {
        Self {
            rasterizer,
            recognizer,
        }
    }

    /// Produce field suggestions for a document.
    pub fn suggest(&self, document: &UploadedDocument) -> crate::Result<Suggestion> {
        let start = Instant::now();

        let (text, recognized) = match self.rasterizer.first_page(document)? {
            RasterPage::Text(text) => (text, false),
            RasterPage::Image(image) => (self.recognizer.recognize(&image)?, true),
        };

        debug!(
            "{}: {} chars of text ({})",
            document.name,
            text.len(),
            if recognized { "OCR" } else { "embedded" }
        );

        let fields = extract_fields(&text);

        Ok(Suggestion {
            document: document.name.clone(),
            text,
            recognized,
            fields,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
