use super::{decode_text, ExtractionError, PageContent};

/// Plain text and source code: the whole file is one page.
pub fn extract_plain(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    Ok(vec![PageContent {
        page_number: 1,
        text: decode_text(bytes).trim().to_string(),
        headings: Vec::new(),
    }])
}

/// Markdown keeps its raw text; ATX headings are collected alongside.
pub fn extract_markdown(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let text = decode_text(bytes);

    let headings: Vec<String> = text
        .lines()
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|heading| !heading.is_empty())
        .collect();

    Ok(vec![PageContent {
        page_number: 1,
        text: text.trim().to_string(),
        headings,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_trimmed_page() {
        let pages = extract_plain(b"\n\n  def f():\n    return 1\n\n").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].text, "def f():\n    return 1");
    }

    #[test]
    fn plain_text_keeps_unicode() {
        let pages = extract_plain("naïve façade — ok".as_bytes()).unwrap();
        assert_eq!(pages[0].text, "naïve façade — ok");
    }

    #[test]
    fn empty_file_gives_empty_page() {
        let pages = extract_plain(b"").unwrap();
        assert_eq!(pages[0].text, "");
    }

    #[test]
    fn markdown_headings_at_every_level() {
        let content = b"# Guide\n\nIntro.\n\n## Setup\n\nSteps.\n\n### Notes\n#\n";
        let pages = extract_markdown(content).unwrap();
        assert_eq!(pages[0].headings, vec!["Guide", "Setup", "Notes"]);
        assert!(pages[0].text.starts_with("# Guide"));
        assert!(pages[0].text.contains("Steps."));
    }

    #[test]
    fn markdown_without_headings() {
        let pages = extract_markdown(b"just prose").unwrap();
        assert!(pages[0].headings.is_empty());
    }
}
