use super::ExtractionError;

/// One rasterized page, PNG-encoded, ready for the OCR pass.
///
/// Single-image uploads produce exactly one; PDFs produce one per page,
/// in page order. Never persisted.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub png_bytes: Vec<u8>,
}

/// PDF page rasterization abstraction (allows mocking for tests).
pub trait PdfPageRenderer: Send + Sync {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError>;

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError>;
}

/// OCR engine abstraction (allows mocking for tests).
///
/// Returns the flattened page text only — no confidence scores or
/// bounding boxes survive this boundary.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Text completion abstraction over the structuring service.
pub trait CompletionClient: Send + Sync {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, super::CompletionError>;
}
