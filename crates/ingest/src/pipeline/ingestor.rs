use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use kbase_core::document::DocId;
use kbase_core::Config;

use super::records::{prepare_records, IngestPolicy, KnowledgeRecord};
use super::sink::KnowledgeSink;
use super::IngestError;
use crate::document::extract_text;
use crate::embedding::{Embedder, EmbeddingBatcher, EmbeddingCache, EmbeddingError};

const DEFAULT_BATCH_SIZE: usize = 64;
const DEFAULT_CACHE_SIZE: usize = 1024;

/// Outcome of one successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub filename: String,
    pub chunks_created: usize,
    pub metadata: Map<String, Value>,
    pub ingested_at: DateTime<Utc>,
}

impl IngestReport {
    pub fn message(&self) -> String {
        format!(
            "File '{}' uploaded and processed ({} chunk(s))",
            self.filename, self.chunks_created
        )
    }
}

/// Upload-side pipeline: extract, chunk above the threshold, embed, store.
pub struct Ingestor {
    policy: IngestPolicy,
    embedder: Arc<dyn Embedder>,
    sink: Arc<dyn KnowledgeSink>,
    cache: Mutex<EmbeddingCache>,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(
        policy: IngestPolicy,
        embedder: Arc<dyn Embedder>,
        sink: Arc<dyn KnowledgeSink>,
    ) -> Self {
        Self {
            policy,
            embedder,
            sink,
            cache: Mutex::new(EmbeddingCache::new(DEFAULT_CACHE_SIZE)),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn from_config(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        sink: Arc<dyn KnowledgeSink>,
    ) -> Result<Self, IngestError> {
        Ok(Self::new(IngestPolicy::from_config(config)?, embedder, sink)
            .with_batch_size(config.embedding.batch_size as usize)
            .with_cache_capacity(config.embedding.cache_size as usize))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Mutex::new(EmbeddingCache::new(capacity));
        self
    }

    pub fn policy(&self) -> &IngestPolicy {
        &self.policy
    }

    /// `(hits, misses)` of the embedding cache so far.
    pub fn cache_stats(&self) -> (u64, u64) {
        let cache = self.lock_cache();
        (cache.hits(), cache.misses())
    }

    /// Ingest raw file bytes. `extra_metadata` (knowledge base id, uploader,
    /// ...) is merged over the extracted document metadata.
    pub async fn ingest_file(
        &self,
        bytes: &[u8],
        filename: &str,
        extra_metadata: Map<String, Value>,
    ) -> Result<IngestReport, IngestError> {
        if bytes.len() > self.policy.max_file_bytes {
            return Err(IngestError::FileTooLarge {
                filename: filename.to_string(),
                size: bytes.len(),
                limit: self.policy.max_file_bytes,
            });
        }

        let document = extract_text(bytes, filename)?;
        if document.total_chars() == 0 {
            return Err(IngestError::EmptyDocument(filename.to_string()));
        }

        let mut metadata = document.metadata.to_map();
        metadata.extend(extra_metadata);
        self.ingest_text(&document.full_text(), filename, metadata).await
    }

    /// Ingest already-extracted text under `name`.
    pub async fn ingest_text(
        &self,
        text: &str,
        name: &str,
        metadata: Map<String, Value>,
    ) -> Result<IngestReport, IngestError> {
        let records = prepare_records(text, name, &metadata, &self.policy)?;
        let embeddings = self.embed_records(&records).await?;

        for (record, embedding) in records.iter().zip(&embeddings) {
            self.sink.store(record, embedding).await?;
        }

        info!(
            document = name,
            chunks = records.len(),
            provider = self.embedder.name(),
            "ingested document"
        );

        let mut metadata = metadata;
        metadata.insert("chunks_created".into(), json!(records.len()));
        Ok(IngestReport {
            filename: name.to_string(),
            chunks_created: records.len(),
            metadata,
            ingested_at: Utc::now(),
        })
    }

    /// Embed every record, serving repeated content from the cache.
    async fn embed_records(&self, records: &[KnowledgeRecord]) -> Result<Vec<Vec<f32>>, IngestError> {
        let mut vectors: Vec<Option<Vec<f32>>> = {
            let mut cache = self.lock_cache();
            records.iter().map(|r| cache.get(&r.content)).collect()
        };

        let mut positions: HashMap<DocId, usize> = HashMap::new();
        let mut fresh = Vec::new();
        let mut batcher = EmbeddingBatcher::new(self.embedder.clone(), self.batch_size);
        for (i, record) in records.iter().enumerate() {
            if vectors[i].is_some() {
                continue;
            }
            positions.insert(record.id, i);
            if let Some(done) = batcher.add(record.id, record.content.clone()).await? {
                fresh.extend(done);
            }
        }
        fresh.extend(batcher.flush().await?);

        debug!(
            records = records.len(),
            cached = records.len() - positions.len(),
            embedded = fresh.len(),
            "embedded records"
        );

        {
            let mut cache = self.lock_cache();
            for (id, embedding) in fresh {
                if let Some(&i) = positions.get(&id) {
                    cache.put(&records[i].content, embedding.clone());
                    vectors[i] = Some(embedding);
                }
            }
        }

        let received = vectors.iter().filter(|v| v.is_some()).count();
        if received != records.len() {
            return Err(EmbeddingError::CountMismatch {
                sent: records.len(),
                received,
            }
            .into());
        }
        Ok(vectors.into_iter().flatten().collect())
    }

    fn lock_cache(&self) -> MutexGuard<'_, EmbeddingCache> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ExtractionError;
    use crate::document::chunker::ChunkingConfig;
    use crate::pipeline::MemorySink;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeEmbedder {
        calls: AtomicUsize,
        texts: AtomicUsize,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                texts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| vec![t.chars().count() as f32, 1.0, 0.0])
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FailingSink;

    #[async_trait]
    impl KnowledgeSink for FailingSink {
        async fn store(&self, _: &KnowledgeRecord, _: &[f32]) -> Result<(), IngestError> {
            Err(IngestError::Sink("database offline".into()))
        }
    }

    fn policy() -> IngestPolicy {
        IngestPolicy {
            chunk_threshold: 200,
            max_file_bytes: 64 * 1024,
            chunking: ChunkingConfig::with_sizes(100, 20, 10).unwrap(),
        }
    }

    fn long_text() -> String {
        (0..40)
            .map(|i| format!("Paragraph {i} explains one more detail of the upload path."))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn setup(batch_size: usize) -> (Arc<FakeEmbedder>, Arc<MemorySink>, Ingestor) {
        let embedder = Arc::new(FakeEmbedder::new());
        let sink = Arc::new(MemorySink::new());
        let ingestor = Ingestor::new(policy(), embedder.clone(), sink.clone())
            .with_batch_size(batch_size);
        (embedder, sink, ingestor)
    }

    #[tokio::test]
    async fn small_file_is_stored_whole() {
        let (embedder, sink, ingestor) = setup(8);
        let mut extra = Map::new();
        extra.insert("knowledge_base_id".into(), json!("kb-42"));

        let report = ingestor
            .ingest_file(b"A short note about Rust.", "note.txt", extra)
            .await
            .unwrap();

        assert_eq!(report.chunks_created, 1);
        assert_eq!(report.message(), "File 'note.txt' uploaded and processed (1 chunk(s))");
        assert_eq!(report.metadata["chunks_created"], 1);

        let stored = sink.records();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.name, "note.txt");
        assert_eq!(stored[0].record.metadata["knowledge_base_id"], "kb-42");
        assert_eq!(stored[0].record.metadata["category"], "text");
        assert_eq!(stored[0].embedding.len(), 3);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn large_file_is_chunked_and_batched() {
        let (embedder, sink, ingestor) = setup(4);
        let report = ingestor
            .ingest_file(long_text().as_bytes(), "guide.md", Map::new())
            .await
            .unwrap();

        let total = report.chunks_created;
        assert!(total > 4);
        assert_eq!(sink.len(), total);

        let stored = sink.records();
        for (i, entry) in stored.iter().enumerate() {
            assert_eq!(entry.record.name, format!("guide.md [chunk {}/{}]", i + 1, total));
            assert_eq!(entry.record.metadata["parent_filename"], "guide.md");
            assert_eq!(entry.embedding[0], entry.record.content.chars().count() as f32);
        }
        assert_eq!(embedder.texts.load(Ordering::SeqCst), total);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), total.div_ceil(4));
    }

    #[tokio::test]
    async fn markdown_headings_reach_every_chunk() {
        let (_, sink, ingestor) = setup(8);
        let text = format!("# Setup\n\n{}\n\n## Usage\n\n{}", long_text(), long_text());

        let report = ingestor
            .ingest_file(text.as_bytes(), "manual.md", Map::new())
            .await
            .unwrap();

        assert!(report.chunks_created > 1);
        assert_eq!(report.metadata["headings"], json!(["Setup", "Usage"]));
        for entry in sink.records() {
            assert_eq!(entry.record.metadata["headings"], json!(["Setup", "Usage"]));
        }
    }

    #[tokio::test]
    async fn repeated_upload_is_served_from_cache() {
        let (embedder, sink, ingestor) = setup(16);
        let text = long_text();

        let first = ingestor.ingest_text(&text, "a.txt", Map::new()).await.unwrap();
        let calls_after_first = embedder.calls.load(Ordering::SeqCst);
        let second = ingestor.ingest_text(&text, "b.txt", Map::new()).await.unwrap();

        assert_eq!(first.chunks_created, second.chunks_created);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), calls_after_first);
        assert_eq!(sink.len(), first.chunks_created * 2);

        let (hits, _) = ingestor.cache_stats();
        assert_eq!(hits as usize, second.chunks_created);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_extraction() {
        let (embedder, sink, ingestor) = setup(8);
        let bytes = vec![b'a'; 64 * 1024 + 1];
        let err = ingestor.ingest_file(&bytes, "big.txt", Map::new()).await.unwrap_err();

        assert!(matches!(err, IngestError::FileTooLarge { size, .. } if size == 64 * 1024 + 1));
        assert!(sink.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_and_empty_files_are_rejected() {
        let (_, sink, ingestor) = setup(8);

        let err = ingestor.ingest_file(b"\xD0\xCF\x11\xE0", "report.doc", Map::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::Extraction(ExtractionError::UnsupportedType(_))));

        let err = ingestor.ingest_file(b"  \n\n ", "blank.md", Map::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyDocument(_)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn sink_failure_propagates() {
        let ingestor = Ingestor::new(policy(), Arc::new(FakeEmbedder::new()), Arc::new(FailingSink));
        let err = ingestor.ingest_text("content", "x.txt", Map::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::Sink(ref m) if m == "database offline"));
    }
}
