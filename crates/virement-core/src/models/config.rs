//! Configuration structures for the payment batch pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the virement pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirementConfig {
    /// Debtor account paying every transfer in the batch.
    pub originator: OriginatorConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Document handling configuration.
    pub document: DocumentConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// The single debtor shared by the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginatorConfig {
    /// Name used for the initiating party and the debtor.
    pub name: String,

    /// Debtor IBAN.
    pub iban: String,

    /// Debtor agent BIC.
    pub bic: String,
}

impl Default for OriginatorConfig {
    fn default() -> Self {
        Self {
            name: "Nom_Emetteur".to_string(),
            iban: "FR7630004006950002160341716".to_string(),
            bic: "BNPAFRPPXXX".to_string(),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` markers in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Document handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Use the first page's embedded text instead of OCR when there is enough of it.
    pub prefer_embedded_text: bool,

    /// Minimum text length to consider a PDF page as text-based.
    pub min_text_length: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Group header message identifier.
    pub message_id: String,

    /// Payment information identifier.
    pub payment_info_id: String,

    /// Currency of every instructed amount.
    pub currency: String,

    /// Spreadsheet file name without extension.
    pub table_file_name: String,

    /// SEPA XML file name.
    pub xml_file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            message_id: "BATCH_PAYMENT".to_string(),
            payment_info_id: "BATCH_001".to_string(),
            currency: "EUR".to_string(),
            table_file_name: "reglements_factures".to_string(),
            xml_file_name: "virements_batch.xml".to_string(),
        }
    }
}

impl VirementConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
