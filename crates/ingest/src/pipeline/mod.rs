//! Document ingestion: size gate, extraction, threshold-based chunking,
//! embedding, and hand-off to a knowledge store.

mod ingestor;
mod records;
mod sink;

use thiserror::Error;

use crate::document::chunker::ChunkingError;
use crate::document::ExtractionError;
use crate::embedding::EmbeddingError;

pub use ingestor::{IngestReport, Ingestor};
pub use records::{chunk_display_name, prepare_records, IngestPolicy, KnowledgeRecord};
pub use sink::{KnowledgeSink, MemorySink, StoredRecord};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Document '{0}' contains no extractable text")]
    EmptyDocument(String),

    #[error("File '{filename}' is {size} bytes, exceeding the {limit} byte limit")]
    FileTooLarge {
        filename: String,
        size: usize,
        limit: usize,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Invalid chunking configuration: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Knowledge store error: {0}")]
    Sink(String),
}
