//! Batch serializers: tabular summary and SEPA pain.001 XML.

pub mod sepa;
pub mod table;

pub use sepa::{control_sum, format_control_sum, SepaSerializer, PAIN_001_NAMESPACE};
pub use table::{table_rows, TabularExporter, TabularFormat, TABLE_HEADERS};

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// A serialized artifact ready to be offered for download.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Suggested file name.
    pub file_name: String,
    /// Serialized content.
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Write into `dir` through a temporary file, so a failure leaves no partial artifact.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(&self.file_name);

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| e.error)?;

        info!("Wrote {} bytes to {}", self.bytes.len(), target.display());
        Ok(target)
    }
}
