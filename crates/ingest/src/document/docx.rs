use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::{ExtractionError, PageContent};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract a Word document: body paragraphs first, then one line per table
/// row with its non-empty cells joined by `" | "`. Parts are separated by a
/// blank line.
pub fn extract_docx(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::DocxError(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::DocxError(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)?;

    let (paragraphs, rows) = parse_body(&xml)?;
    let text = paragraphs
        .into_iter()
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(vec![PageContent {
        page_number: 1,
        text: text.trim().to_string(),
        headings: Vec::new(),
    }])
}

/// Walk `document.xml` and return `(paragraphs, table_rows)`.
///
/// Only paragraphs directly in the body count as paragraphs. Cell text is
/// the cell's own paragraphs joined by newlines; nested tables are skipped.
fn parse_body(xml: &str) -> Result<(Vec<String>, Vec<String>), ExtractionError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut rows = Vec::new();

    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut para = String::new();
    let mut cell: Vec<String> = Vec::new();
    let mut row: Vec<String> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractionError::DocxError(e.to_string()))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"tr" if table_depth == 1 => row.clear(),
                b"tc" if table_depth == 1 => cell.clear(),
                b"p" => para.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => para.push('\t'),
                b"br" | b"cr" => para.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::DocxError(e.to_string()))?;
                para.push_str(&text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let text = std::mem::take(&mut para);
                    match table_depth {
                        0 if !text.trim().is_empty() => paragraphs.push(text),
                        1 => cell.push(text),
                        _ => {}
                    }
                }
                b"tc" if table_depth == 1 => row.push(cell.join("\n")),
                b"tr" if table_depth == 1 => {
                    let cells: Vec<&str> = row
                        .iter()
                        .map(|c| c.trim())
                        .filter(|c| !c.is_empty())
                        .collect();
                    if !cells.is_empty() {
                        rows.push(cells.join(" | "));
                    }
                }
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((paragraphs, rows))
}
