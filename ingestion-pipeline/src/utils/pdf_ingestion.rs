use lopdf::Document;
use tracing::debug;

use common::error::AppError;

/// Extracts the text layer of a PDF, page by page in page-number order.
///
/// Parsing happens on a blocking thread so large documents do not stall the executor.
pub async fn extract_pdf_content(pdf_bytes: Vec<u8>) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&pdf_bytes)).await?
}

/// Concatenates the text of every page. Pages are appended as-is, with no separator added.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String, AppError> {
    let document = Document::load_mem(pdf_bytes)
        .map_err(|err| AppError::Extraction(format!("Failed to parse PDF: {err}")))?;

    let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();
    if page_numbers.is_empty() {
        return Err(AppError::Extraction("PDF appears to have no pages".into()));
    }

    let mut text = String::new();
    for page in &page_numbers {
        let page_text = document.extract_text(&[*page]).map_err(|err| {
            AppError::Extraction(format!("Failed to read text on page {page}: {err}"))
        })?;
        text.push_str(&page_text);
    }

    if text.trim().is_empty() {
        return Err(AppError::Extraction(
            "PDF has no readable text layer".into(),
        ));
    }

    debug!(
        pages = page_numbers.len(),
        chars = text.chars().count(),
        "Extracted PDF text"
    );

    Ok(text)
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use lopdf::{
        content::{Content, Operation},
        dictionary, Document, Object, Stream,
    };

    /// Builds a minimal PDF with one line of Courier text per page.
    #[allow(clippy::expect_used, clippy::cast_possible_wrap)]
    pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content stream should encode"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .expect("in-memory PDF should serialize");
        bytes
    }
}
