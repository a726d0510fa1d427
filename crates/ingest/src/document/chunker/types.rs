//! Chunking configuration, output types, and configuration errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kbase_core::config::ChunkingSettings;

/// Separator hierarchy, coarsest first. The trailing empty string selects
/// fixed-size character slicing.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 100;

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },

    #[error("min_chunk_size ({min_chunk_size}) must be smaller than chunk_size ({chunk_size})")]
    MinSizeTooLarge {
        min_chunk_size: usize,
        chunk_size: usize,
    },

    #[error("separator list must end with the empty fallback separator")]
    MissingFallbackSeparator,
}

// ── Configuration ───────────────────────────────────────────────────────────

/// Validated configuration for the chunker. All sizes are in characters.
///
/// Construct through [`ChunkingConfig::new`] (or [`Default`]); fields are
/// read-only afterwards so an instance is always internally consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkingConfig {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_size: usize,
    separators: Vec<String>,
}

impl ChunkingConfig {
    /// Build a config with an explicit separator list.
    pub fn new<S: Into<String>>(
        chunk_size: usize,
        chunk_overlap: usize,
        min_chunk_size: usize,
        separators: impl IntoIterator<Item = S>,
    ) -> Result<Self, ChunkingError> {
        let separators: Vec<String> = separators.into_iter().map(Into::into).collect();

        if chunk_size == 0 {
            return Err(ChunkingError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: chunk_overlap,
                chunk_size,
            });
        }
        if min_chunk_size >= chunk_size {
            return Err(ChunkingError::MinSizeTooLarge {
                min_chunk_size,
                chunk_size,
            });
        }
        if separators.last().map(String::as_str) != Some("") {
            return Err(ChunkingError::MissingFallbackSeparator);
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            min_chunk_size,
            separators,
        })
    }

    /// Build a config that uses [`DEFAULT_SEPARATORS`].
    pub fn with_sizes(
        chunk_size: usize,
        chunk_overlap: usize,
        min_chunk_size: usize,
    ) -> Result<Self, ChunkingError> {
        Self::new(
            chunk_size,
            chunk_overlap,
            min_chunk_size,
            DEFAULT_SEPARATORS.iter().copied(),
        )
    }

    /// Validate deployment settings.
    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self, ChunkingError> {
        match &settings.separators {
            Some(seps) => Self::new(
                settings.chunk_size,
                settings.chunk_overlap,
                settings.min_chunk_size,
                seps.iter().cloned(),
            ),
            None => Self::with_sizes(
                settings.chunk_size,
                settings.chunk_overlap,
                settings.min_chunk_size,
            ),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn min_chunk_size(&self) -> usize {
        self.min_chunk_size
    }

    pub fn separators(&self) -> &[String] {
        &self.separators
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// A chunk of text with its position among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// The chunk text, including any overlap carried from its predecessor.
    pub content: String,
    /// 0-based index within the document.
    pub chunk_index: usize,
    /// Number of chunks produced for the document.
    pub total_chunks: usize,
    /// Approximate character offset of the chunk start in the source text.
    pub start_char: usize,
    /// Approximate character offset of the chunk end in the source text.
    pub end_char: usize,
}
