pub mod completion;
pub mod decode;
pub mod ocr;
pub mod orchestrator;
pub mod pdfium;
pub mod prompt;
pub mod staging;
pub mod types;
pub mod validate;

pub use completion::*;
pub use decode::*;
pub use ocr::*;
pub use orchestrator::*;
pub use pdfium::*;
pub use staging::*;
pub use types::*;
pub use validate::*;

use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning an upload into text: decoding, rasterization,
/// or the OCR pass itself.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("PDF is password-protected")]
    PdfEncrypted,

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Tessdata not found at: {0}")]
    TessdataNotFound(PathBuf),

    #[error("Unsupported format for extraction: {0}")]
    UnsupportedFormat(String),
}
