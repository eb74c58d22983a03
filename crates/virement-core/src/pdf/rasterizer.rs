//! First-page rasterization using lopdf and the image crate.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{DocumentRasterizer, RasterPage, Result};
use crate::document::{DocumentKind, UploadedDocument};
use crate::error::DocumentError;
use crate::models::config::DocumentConfig;

/// Rasterizer taking page 1 of a PDF, or the whole image for raster uploads.
pub struct FirstPageRasterizer {
    prefer_embedded_text: bool,
    min_text_length: usize,
}

impl FirstPageRasterizer {
    /// Create a rasterizer with default settings.
    pub fn new() -> Self {
        Self::from_config(&DocumentConfig::default())
    }

    /// Create a rasterizer from document configuration.
    pub fn from_config(config: &DocumentConfig) -> Self {
        Self {
            prefer_embedded_text: config.prefer_embedded_text,
            min_text_length: config.min_text_length,
        }
    }

    /// Set whether embedded PDF text may replace OCR.
    pub fn with_embedded_text(mut self, prefer: bool) -> Self {
        self.prefer_embedded_text = prefer;
        self
    }

    fn load_pdf(data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        if doc.get_pages().is_empty() {
            return Err(DocumentError::NoPages);
        }

        Ok(doc)
    }

    /// Embedded text is trusted once it has `min_text_length` characters, whitespace trimmed.
    fn has_enough_text(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.min_text_length
    }

    fn pdf_first_page(&self, data: &[u8]) -> Result<RasterPage> {
        let doc = Self::load_pdf(data)?;
        let pages = doc.get_pages();
        debug!("Loaded PDF with {} pages", pages.len());

        if self.prefer_embedded_text {
            let text = match doc.extract_text(&[1]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Could not extract embedded text from page 1: {}", e);
                    String::new()
                }
            };
            if self.has_enough_text(&text) {
                debug!("Using {} chars of embedded text from page 1", text.chars().count());
                return Ok(RasterPage::Text(text));
            }
        }

        let page_id = *pages.get(&1).ok_or(DocumentError::NoPages)?;
        let mut images = page_images(&doc, page_id);

        // Single-page scans sometimes reference images outside the page resources.
        if images.is_empty() && pages.len() == 1 {
            debug!("No XObject images found on page 1, scanning all objects");
            images = doc
                .objects
                .values()
                .filter_map(|object| try_extract_image_from_object(&doc, object))
                .collect();
        }

        debug!("Found {} images on page 1", images.len());

        images
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .map(RasterPage::Image)
            .ok_or(DocumentError::NoRasterContent)
    }
}

impl Default for FirstPageRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRasterizer for FirstPageRasterizer {
    fn first_page(&self, document: &UploadedDocument) -> Result<RasterPage> {
        match document.kind {
            DocumentKind::Pdf => self.pdf_first_page(&document.bytes),
            DocumentKind::Image => Ok(RasterPage::Image(image::load_from_memory(&document.bytes)?)),
            DocumentKind::Transcript => Ok(RasterPage::Text(
                String::from_utf8_lossy(&document.bytes).into_owned(),
            )),
        }
    }
}

fn page_images(doc: &Document, page_id: ObjectId) -> Vec<DynamicImage> {
    let mut images = Vec::new();

    if let Some(resources) = page_resources(doc, page_id) {
        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                for (_name, obj_ref) in xobj_dict.iter() {
                    if let Ok((_, obj)) = doc.dereference(obj_ref) {
                        if let Some(img) = try_extract_image_from_object(doc, obj) {
                            images.push(img);
                        }
                    }
                }
            }
        }
    }

    images
}

/// Resources dictionary for a node, following `Parent` inheritance.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
    let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn try_extract_image_from_object(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;

    trace!("Found image object: {}x{}", width, height);

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        match filter_name {
            Some(b"DCTDecode") => {
                trace!("Decoding JPEG image");
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                    .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Skipping unsupported image filter");
                return None;
            }
            _ => {}
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    image_from_raw(&data, width, height, color_space)
}

fn image_from_raw(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    let rgb_len = pixels.checked_mul(3)?;

    let rgba: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= rgb_len => data[..rgb_len]
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        b"DeviceGray" | b"G" if data.len() >= pixels => data[..pixels]
            .iter()
            .flat_map(|&gray| [gray, gray, gray, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: colorspace={:?}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}
