//! Recursive character chunking engine.
//!
//! Splits extracted text into overlapping, size-bounded chunks suitable for
//! embedding. Splitting walks a separator hierarchy (paragraphs, lines,
//! sentences, words) and falls back to fixed-size character slices, so every
//! input terminates.

mod helpers;
mod pipeline;
mod splitter;
mod types;

pub use pipeline::{chunk_text, chunk_text_with_defaults, Chunker};
pub use types::{
    ChunkingConfig, ChunkingError, TextChunk, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    DEFAULT_MIN_CHUNK_SIZE, DEFAULT_SEPARATORS,
};
