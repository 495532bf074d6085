use log::{debug, info};

use crate::error::ImportError;

/// Extract the plain text content of a PDF.
///
/// Returns `InvalidDocument` only when the bytes are not a parseable PDF.
/// Image-only PDFs parse fine and yield an empty (or sparse) string, which is
/// passed through unchanged; there is no OCR fallback. The extraction model
/// degrades gracefully on sparse input, so the empty string is still a valid
/// extraction input.
pub fn extract_text(bytes: &[u8]) -> Result<String, ImportError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ImportError::InvalidDocument(e.to_string()))?;

    let text = text.trim().to_string();
    if text.is_empty() {
        info!("PDF parsed but contains no extractable text (image-only?)");
    } else {
        debug!("PDF text extracted: {} characters", text.len());
    }

    Ok(text)
}
