use std::sync::Arc;

use kbase_core::document::DocId;

use super::traits::{Embedder, EmbeddingError};

/// Collects (DocId, text) pairs and flushes when the batch is full.
pub struct EmbeddingBatcher {
    buffer: Vec<(DocId, String)>,
    batch_size: usize,
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingBatcher {
    /// A batch size of zero is treated as one.
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            embedder,
        }
    }

    /// Queue a text. Returns embeddings if the batch is full (auto-flush).
    pub async fn add(
        &mut self,
        id: DocId,
        text: String,
    ) -> Result<Option<Vec<(DocId, Vec<f32>)>>, EmbeddingError> {
        self.buffer.push((id, text));
        if self.buffer.len() >= self.batch_size {
            Ok(Some(self.flush().await?))
        } else {
            Ok(None)
        }
    }

    /// Force-flush remaining items.
    pub async fn flush(&mut self) -> Result<Vec<(DocId, Vec<f32>)>, EmbeddingError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let batch: Vec<(DocId, String)> = std::mem::take(&mut self.buffer);
        let texts: Vec<&str> = batch.iter().map(|(_, t)| t.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                sent: batch.len(),
                received: embeddings.len(),
            });
        }
        tracing::debug!(
            provider = self.embedder.name(),
            texts = batch.len(),
            "embedded batch"
        );

        Ok(batch
            .into_iter()
            .zip(embeddings)
            .map(|((id, _), emb)| (id, emb))
            .collect())
    }

    /// Number of items currently buffered.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
