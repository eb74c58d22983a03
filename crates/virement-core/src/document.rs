//! Uploaded documents and their kinds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Kind of an uploaded document, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// PDF, possibly multi-page. Only the first page is used.
    Pdf,
    /// JPEG or PNG raster image.
    Image,
    /// Plain text that has already been recognized.
    Transcript,
}

impl DocumentKind {
    /// Resolve a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" | "png" => Some(Self::Image),
            "txt" => Some(Self::Transcript),
            _ => None,
        }
    }

    /// Resolve the kind of a file name.
    pub fn from_name(name: &str) -> Result<Self, DocumentError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(extension).ok_or_else(|| DocumentError::Unsupported(name.to_string()))
    }
}

/// A document as uploaded by the operator.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// File name shown to the operator.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Document kind.
    pub kind: DocumentKind,
}

impl UploadedDocument {
    /// Wrap in-memory content, deriving the kind from `name`.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        let name = name.into();
        let kind = DocumentKind::from_name(&name)?;
        Ok(Self { name, bytes, kind })
    }

    /// Read a document from disk.
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();
        let kind = DocumentKind::from_name(&name)?;
        let bytes = std::fs::read(path)?;
        Ok(Self { name, bytes, kind })
    }
}
