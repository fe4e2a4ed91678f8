//! Text recognition over rasterized pages.
//!
//! The production engine is bundled Tesseract behind the `ocr` cargo
//! feature; the language is fixed to English. Only the flattened page
//! text crosses this boundary.

use super::types::OcrEngine;
use super::ExtractionError;

/// OCR language. Recognition runs in English only.
pub const OCR_LANGUAGE: &str = "eng";

/// Bundled Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    tessdata_dir: std::path::PathBuf,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    /// Initialize with a tessdata directory containing `eng.traineddata`.
    pub fn new(tessdata_dir: &std::path::Path) -> Result<Self, ExtractionError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(ExtractionError::TessdataNotFound(tessdata_dir.to_path_buf()));
        }
        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractOcr {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let tessdata_str = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?;

        let tess = tesseract::Tesseract::new(Some(tessdata_str), Some(OCR_LANGUAGE))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))
    }
}

/// Mock OCR engine for unit testing without Tesseract.
///
/// `fixed` returns the same text for every page; `pages` returns the
/// configured texts one per call, in order, erroring when exhausted.
pub struct MockOcrEngine {
    fixed: Option<String>,
    queue: std::sync::Mutex<std::collections::VecDeque<String>>,
}

impl MockOcrEngine {
    pub fn fixed(text: &str) -> Self {
        Self {
            fixed: Some(text.to_string()),
            queue: std::sync::Mutex::new(std::collections::VecDeque::new()),
        }
    }

    pub fn pages<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fixed: None,
            queue: std::sync::Mutex::new(texts.into_iter().map(Into::into).collect()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        if let Some(text) = &self.fixed {
            return Ok(text.clone());
        }
        self.queue
            .lock()
            .expect("mock queue lock")
            .pop_front()
            .ok_or_else(|| ExtractionError::OcrProcessing("mock page queue exhausted".into()))
    }
}
