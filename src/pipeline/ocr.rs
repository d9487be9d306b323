//! OCR: Tesseract-backed text recognition with legibility preprocessing.
//!
//! The engine sits behind [`OcrEngine`] so a stronger recognizer (a cloud
//! OCR API, a layout-aware model) can be plugged through
//! [`crate::ExtractConfig`] without touching the rest of the pipeline. The
//! default is Tesseract 5.x via leptess, run in page-segmentation mode 6 so
//! a rendered table screenshot is read row by row.
//!
//! Preprocessing is accuracy work, not a semantic transformation: the image
//! is converted to 8-bit grayscale, and upscaled 2× when its shorter
//! dimension is below the legibility threshold — table screenshots pasted
//! into Confluence are often too small for Tesseract to read digits
//! reliably at native resolution.

use crate::error::ImageError;
use image::imageops::FilterType;
use leptess::{LepTess, Variable};
use tracing::debug;

/// A text recognizer: encoded image bytes in, text lines out.
///
/// Lines are in reading order, top to bottom. Engine-missing and per-image
/// failures are both [`ImageError`]s so the caller can fold them into the
/// per-image result.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, bytes: &[u8]) -> Result<Vec<String>, ImageError>;
}

/// Tesseract 5.x engine via leptess.
pub struct TesseractOcr {
    language: String,
    psm: u32,
    min_dimension: u32,
}

impl TesseractOcr {
    pub fn new(language: impl Into<String>, psm: u32, min_dimension: u32) -> Self {
        Self {
            language: language.into(),
            psm,
            min_dimension,
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, bytes: &[u8]) -> Result<Vec<String>, ImageError> {
        let png = preprocess(bytes, self.min_dimension)?;

        // A fresh LepTess per image: the handle is not Sync and holds
        // per-image state anyway.
        let mut lt = LepTess::new(None, &self.language).map_err(|e| {
            ImageError::OcrUnavailable {
                detail: format!(
                    "Failed to initialize Tesseract with language '{}': {e}. \
                     Make sure tesseract and its language data are installed.",
                    self.language
                ),
            }
        })?;

        lt.set_variable(Variable::TesseditPagesegMode, &self.psm.to_string())
            .map_err(|e| ImageError::OcrUnavailable {
                detail: format!("Failed to set PSM: {e}"),
            })?;

        lt.set_image_from_mem(&png)
            .map_err(|e| ImageError::OcrFailed {
                detail: format!("Failed to load image into Tesseract: {e}"),
            })?;

        let text = lt.get_utf8_text().map_err(|e| ImageError::OcrFailed {
            detail: format!("Recognition failed: {e}"),
        })?;

        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        debug!("OCR recognized {} non-empty lines", lines.len());
        Ok(lines)
    }
}

/// Decode, grayscale, conditionally upscale, and re-encode as PNG
/// (leptess expects encoded image data).
pub(crate) fn preprocess(bytes: &[u8], min_dimension: u32) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::OcrFailed {
        detail: format!("Unable to decode image: {e}"),
    })?;

    let mut gray = decoded.to_luma8();
    let (w, h) = gray.dimensions();

    if w.min(h) < min_dimension {
        debug!("Upscaling {w}x{h} image 2x for legibility");
        gray = image::imageops::resize(&gray, w * 2, h * 2, FilterType::Lanczos3);
    }

    let mut png = std::io::Cursor::new(Vec::new());
    gray.write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| ImageError::OcrFailed {
            detail: format!("Failed to re-encode image: {e}"),
        })?;

    Ok(png.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn small_image_is_upscaled_and_grayscaled() {
        let out = preprocess(&png_bytes(100, 40), 600).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 80);
        // Gray output: every pixel has a single-channel value.
        let gray = decoded.to_luma8();
        assert_ne!(gray.get_pixel(0, 0), &Luma([0u8]));
    }

    #[test]
    fn large_image_keeps_its_dimensions() {
        let out = preprocess(&png_bytes(800, 700), 600).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 700));
    }

    #[test]
    fn garbage_bytes_fail_as_ocr_error() {
        let err = preprocess(b"not an image at all", 600).unwrap_err();
        assert!(matches!(err, ImageError::OcrFailed { .. }));
    }

    // Needs a tesseract install with eng data; exercised in environments
    // that have one.
    #[test]
    #[ignore]
    fn tesseract_reads_blank_image_as_no_lines() {
        let engine = TesseractOcr::new("eng", 6, 600);
        let lines = engine.recognize(&png_bytes(800, 700)).unwrap();
        assert!(lines.is_empty());
    }
}
