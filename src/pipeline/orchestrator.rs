//! The extraction pipeline: staged upload → pages → text → structured report.
//!
//! One linear, synchronous pass per request. Pages are recognized strictly
//! in order; any stage failure aborts the whole run. Callers on an async
//! runtime move `run` onto the blocking pool.

use thiserror::Error;
use tracing::{debug, info};

use super::completion::CompletionError;
use super::decode::Decoder;
use super::prompt::{build_structuring_prompt, STRUCTURING_SYSTEM_PROMPT};
use super::staging::StagedUpload;
use super::types::{CompletionClient, OcrEngine};
use super::ExtractionError;

/// Separator between per-page texts in the document-level output.
pub const PAGE_SEPARATOR: &str = "\n\n";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Output of a full pipeline run.
///
/// `structured_data` is the completion service's response text, passed
/// through unparsed and unvalidated — consumers must treat it as opaque.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub raw_text: String,
    pub structured_data: String,
}

/// Decoder + OCR engine + structuring requester, wired once at startup
/// and shared across requests.
pub struct ExtractionPipeline {
    decoder: Decoder,
    ocr: Box<dyn OcrEngine>,
    completion: Box<dyn CompletionClient>,
}

impl ExtractionPipeline {
    pub fn new(
        decoder: Decoder,
        ocr: Box<dyn OcrEngine>,
        completion: Box<dyn CompletionClient>,
    ) -> Self {
        Self {
            decoder,
            ocr,
            completion,
        }
    }

    /// Decode and recognize an upload into one document-level text blob:
    /// per-page texts, trimmed, joined in page order with `PAGE_SEPARATOR`.
    pub fn extract_text(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
        let pages = self.decoder.decode(bytes, filename)?;

        let mut texts = Vec::with_capacity(pages.len());
        for (page_number, page) in pages.iter().enumerate() {
            let text = self.ocr.recognize(&page.png_bytes)?;
            debug!(page = page_number, chars = text.len(), "OCR pass complete");
            texts.push(text.trim().to_string());
        }

        Ok(texts.join(PAGE_SEPARATOR))
    }

    /// Run the full pipeline over a staged upload.
    pub fn run(&self, upload: &StagedUpload) -> Result<PipelineOutput, PipelineError> {
        let bytes = std::fs::read(upload.path()).map_err(ExtractionError::from)?;

        let raw_text = self.extract_text(&bytes, upload.original_name())?;
        info!(
            filename = upload.original_name(),
            chars = raw_text.len(),
            "Text extraction complete"
        );

        let prompt = build_structuring_prompt(&raw_text);
        let structured_data = self
            .completion
            .generate(STRUCTURING_SYSTEM_PROMPT, &prompt)?;

        Ok(PipelineOutput {
            raw_text,
            structured_data,
        })
    }
}
