//! Chunking entry points: split, merge, overlap, assemble.

use tracing::debug;

use super::helpers::{add_overlap, char_len, head_chars, merge_small_chunks};
use super::splitter::recursive_split;
use super::types::{ChunkingConfig, TextChunk};

/// Number of leading characters used to locate a chunk in the source text.
const LOCATE_PROBE_CHARS: usize = 50;

/// Split `text` into ordered, overlapping chunks ready for embedding.
///
/// Surrounding whitespace is stripped first. Blank input yields no chunks;
/// input that already fits in `chunk_size` yields exactly one chunk.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let text_len = char_len(text);
    if text_len <= config.chunk_size() {
        return vec![TextChunk {
            content: text.to_string(),
            chunk_index: 0,
            total_chunks: 1,
            start_char: 0,
            end_char: text_len,
        }];
    }

    let pieces = recursive_split(text, config.separators(), config.chunk_size());
    let piece_count = pieces.len();
    let merged = merge_small_chunks(pieces, config);
    let merged_count = merged.len();
    let contents = add_overlap(merged, config.chunk_overlap());

    debug!(
        chars = text_len,
        pieces = piece_count,
        merged = merged_count,
        chunk_size = config.chunk_size(),
        overlap = config.chunk_overlap(),
        "chunked text"
    );

    assemble(text, contents, config.chunk_overlap())
}

/// [`chunk_text`] with [`ChunkingConfig::default`].
pub fn chunk_text_with_defaults(text: &str) -> Vec<TextChunk> {
    chunk_text(text, &ChunkingConfig::default())
}

/// Wrap final chunk contents with index metadata and best-effort offsets.
///
/// Offsets come from finding each chunk's opening characters in `source`.
/// When that fails, a cursor that advances by each chunk's length minus the
/// overlap is used instead. Repeated text can match an earlier occurrence, so
/// offsets are diagnostic only.
fn assemble(source: &str, contents: Vec<String>, overlap: usize) -> Vec<TextChunk> {
    let total = contents.len();
    let source_len = char_len(source);
    let mut cursor = 0usize;

    contents
        .into_iter()
        .enumerate()
        .map(|(chunk_index, content)| {
            let content_len = char_len(&content);
            let probe = head_chars(&content, LOCATE_PROBE_CHARS);
            let start_char = source
                .find(probe)
                .map(|byte_idx| char_len(&source[..byte_idx]))
                .unwrap_or(cursor);
            let end_char = (start_char + content_len).min(source_len);
            cursor = (start_char + content_len)
                .saturating_sub(overlap)
                .min(source_len);

            TextChunk {
                content,
                chunk_index,
                total_chunks: total,
                start_char,
                end_char,
            }
        })
        .collect()
}

/// Stateless chunker bound to one configuration. Cheap to clone and safe to
/// share across tasks.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        chunk_text(text, &self.config)
    }
}
