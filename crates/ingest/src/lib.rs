//! Knowledge-base ingestion: text extraction, chunking, embedding, and the
//! upload pipeline that ties them together.

pub mod document;
pub mod embedding;
pub mod pipeline;

pub use document::chunker::{chunk_text, Chunker, ChunkingConfig, TextChunk};
pub use pipeline::{IngestError, IngestPolicy, IngestReport, Ingestor, KnowledgeRecord, KnowledgeSink};
