pub mod chunker;
mod docx;
mod pdf;
mod text;

use std::path::Path;

use kbase_core::document::{extension_of, language_for_extension, DocumentMetadata, FileCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("DOCX extraction failed: {0}")]
    DocxError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page of extracted text with metadata.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number (for PDFs). For text and code files, always 1.
    pub page_number: usize,
    /// The extracted text content.
    pub text: String,
    /// Headings found on this page (for MD files). Collected into
    /// [`DocumentMetadata::headings`].
    pub headings: Vec<String>,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub metadata: DocumentMetadata,
    /// Extracted pages with text and metadata.
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// Get all text concatenated.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Whether `filename` has an extension the extractors understand.
pub fn is_supported(filename: &str) -> bool {
    FileCategory::from_extension(&extension_of(filename)) != FileCategory::Unknown
}

/// Extract text from file bytes based on the filename's extension.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let extension = extension_of(filename);
    let category = FileCategory::from_extension(&extension);

    let pages = match (category, extension.as_str()) {
        (FileCategory::Document, ".pdf") => pdf::extract_pdf(bytes)?,
        (FileCategory::Document, ".docx") => docx::extract_docx(bytes)?,
        (FileCategory::Text, ".md") => text::extract_markdown(bytes)?,
        (FileCategory::Text | FileCategory::Code, _) => text::extract_plain(bytes)?,
        _ => {
            let label = if extension.is_empty() { filename } else { extension.as_str() };
            return Err(ExtractionError::UnsupportedType(label.to_string()));
        }
    };

    let language = match category {
        FileCategory::Code => language_for_extension(&extension).map(str::to_string),
        _ => None,
    };

    let headings = pages.iter().flat_map(|p| p.headings.iter().cloned()).collect();

    let mut doc = ExtractedDocument {
        metadata: DocumentMetadata {
            filename: filename.to_string(),
            extension,
            category,
            language,
            char_count: 0,
            headings,
        },
        pages,
    };
    doc.metadata.char_count = doc.full_text().chars().count();
    Ok(doc)
}

/// Read a file from disk and extract its text, keyed by its file name.
pub fn extract_path(path: &Path) -> Result<ExtractedDocument, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract_text(&bytes, &filename)
}

/// Decode text bytes as UTF-8, falling back to Latin-1 (every byte maps to
/// the code point of the same value).
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
