use super::{ExtractionError, PageContent};

/// Extract the text layer of a PDF. Scanned PDFs without one yield a single
/// empty page, which the ingestion path rejects as an empty document.
pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    let pages = split_pages(&text);
    if pages.is_empty() {
        tracing::warn!("PDF has no extractable text layer");
        return Ok(vec![PageContent {
            page_number: 1,
            text: String::new(),
            headings: Vec::new(),
        }]);
    }
    Ok(pages)
}

/// pdf-extract returns one string; form feeds (`\x0C`) separate pages.
/// Blank pages are skipped but keep their page number slot.
fn split_pages(text: &str) -> Vec<PageContent> {
    text.split('\x0C')
        .enumerate()
        .filter(|(_, page_text)| !page_text.trim().is_empty())
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            text: page_text.trim().to_string(),
            headings: Vec::new(),
        })
        .collect()
}
