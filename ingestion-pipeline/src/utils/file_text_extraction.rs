use common::{error::AppError, storage::types::document::DocumentFormat};

use super::pdf_ingestion::extract_pdf_content;

/// Produces the plain text of an uploaded document.
///
/// Only PDFs have an extraction path. PowerPoint decks pass upload validation but are reported
/// as an unsupported format instead of being dropped silently.
pub async fn extract_text_from_document(
    format: DocumentFormat,
    bytes: Vec<u8>,
) -> Result<String, AppError> {
    match format {
        DocumentFormat::Pdf => extract_pdf_content(bytes).await,
        DocumentFormat::Pptx => Err(AppError::UnsupportedFormat(
            "PowerPoint (.pptx) extraction is not supported yet".into(),
        )),
    }
}
