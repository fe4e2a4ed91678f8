//! Upload decoding: raw bytes + filename → ordered page images.
//!
//! Dispatch is by extension only; the validator has already filtered
//! unknown extensions, so anything else arriving here is a programming
//! error surfaced as `UnsupportedFormat`. Content mismatches (a renamed
//! file) fail inside the image decoder or the PDF renderer.

use std::io::Cursor;

use image::ImageOutputFormat;
use tracing::debug;

use super::types::{PageImage, PdfPageRenderer};
use super::validate::{allowed_file, file_extension};
use super::ExtractionError;

/// Decodes an upload into an ordered sequence of rasterized pages.
pub struct Decoder {
    renderer: Box<dyn PdfPageRenderer>,
    render_dpi: u32,
}

impl Decoder {
    pub fn new(renderer: Box<dyn PdfPageRenderer>, render_dpi: u32) -> Self {
        Self {
            renderer,
            render_dpi,
        }
    }

    /// Decode upload bytes into page images: one per PDF page, or exactly
    /// one for single-image input.
    pub fn decode(&self, bytes: &[u8], filename: &str) -> Result<Vec<PageImage>, ExtractionError> {
        if !allowed_file(filename) {
            return Err(ExtractionError::UnsupportedFormat(filename.to_string()));
        }

        let ext = file_extension(filename).unwrap_or_default();
        if ext == "pdf" {
            self.decode_pdf(bytes)
        } else {
            Ok(vec![decode_single_image(bytes)?])
        }
    }

    fn decode_pdf(&self, bytes: &[u8]) -> Result<Vec<PageImage>, ExtractionError> {
        let page_count = self.renderer.page_count(bytes)?;
        debug!(pages = page_count, "Decoding PDF upload");

        let mut pages = Vec::with_capacity(page_count);
        for page_number in 0..page_count {
            let png_bytes = self
                .renderer
                .render_page(bytes, page_number, self.render_dpi)?;
            pages.push(PageImage { png_bytes });
        }
        Ok(pages)
    }
}

/// Decode a single image upload and re-encode it to PNG.
///
/// The decode validates the actual content; re-encoding gives the OCR
/// pass one uniform input format regardless of the upload type.
fn decode_single_image(bytes: &[u8]) -> Result<PageImage, ExtractionError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Failed to decode image: {e}")))?;

    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;

    Ok(PageImage {
        png_bytes: cursor.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::pdfium::{minimal_png, MockPdfPageRenderer};
    use super::*;

    fn mock_decoder(pages: usize) -> Decoder {
        Decoder::new(Box::new(MockPdfPageRenderer::new(pages)), 200)
    }

    #[test]
    fn image_input_yields_exactly_one_page() {
        let decoder = mock_decoder(0);
        let pages = decoder.decode(&minimal_png(), "photo.png").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(&pages[0].png_bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn pdf_input_yields_one_page_per_document_page() {
        let decoder = mock_decoder(4);
        let pages = decoder.decode(b"%PDF-fake", "report.pdf").unwrap();
        assert_eq!(pages.len(), 4);
    }

    #[test]
    fn corrupt_image_bytes_fail_decoding() {
        let decoder = mock_decoder(0);
        let err = decoder.decode(b"not an image", "photo.png").unwrap_err();
        assert!(matches!(err, ExtractionError::ImageProcessing(_)));
    }

    #[test]
    fn renamed_file_fails_on_content() {
        // A text file renamed to .jpg passes validation but not decoding.
        let decoder = mock_decoder(0);
        let err = decoder.decode(b"plain text", "notes.jpg").unwrap_err();
        assert!(matches!(err, ExtractionError::ImageProcessing(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let decoder = mock_decoder(0);
        let err = decoder.decode(b"whatever", "notes.txt").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }
}
