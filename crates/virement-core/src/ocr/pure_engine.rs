//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::cell::OnceCell;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{reading_order_text, TextBox, TextRecognizer};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in `config`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
        })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Recognizing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut text_boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        let text = reading_order_text(&mut text_boxes);

        info!(
            "OCR complete: {} text boxes in {}ms",
            text_boxes.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Engine loaded on first use, so transcripts and text PDFs never need models.
pub struct LazyOcrEngine {
    config: OcrConfig,
    engine: OnceCell<PureOcrEngine>,
}

impl LazyOcrEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self {
            config,
            engine: OnceCell::new(),
        }
    }

    fn engine(&self) -> Result<&PureOcrEngine, OcrError> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine);
        }
        let engine = PureOcrEngine::from_config(&self.config)?;
        Ok(self.engine.get_or_init(|| engine))
    }
}

impl TextRecognizer for LazyOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        self.engine()?.recognize(image)
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_reported_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            model_dir: dir.path().to_path_buf(),
            ..OcrConfig::default()
        };

        // Construction never touches the model directory.
        let engine = LazyOcrEngine::new(config);
        let image = DynamicImage::new_rgba8(4, 4);

        match engine.recognize(&image) {
            Err(OcrError::ModelLoad(msg)) => assert!(msg.contains("det.onnx")),
            other => panic!("expected a model load error, got {:?}", other.map(|_| ())),
        }
    }
}
