use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding count mismatch: sent {sent} texts, got {received} vectors")]
    CountMismatch { sent: usize, received: usize },
}

/// Text-to-vector capability used by the ingestion path (Ollama, OpenAI, ...).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Short provider label for logs.
    fn name(&self) -> &str;
}

/// Check that a backend returned exactly one vector of the expected length
/// per input text.
pub(crate) fn validate_embeddings(
    sent: usize,
    dimensions: usize,
    embeddings: &[Vec<f32>],
) -> Result<(), EmbeddingError> {
    if embeddings.len() != sent {
        return Err(EmbeddingError::CountMismatch {
            sent,
            received: embeddings.len(),
        });
    }
    if let Some(bad) = embeddings.iter().find(|v| v.len() != dimensions) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimensions,
            actual: bad.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_batch() {
        assert!(validate_embeddings(2, 3, &[vec![0.0; 3], vec![1.0; 3]]).is_ok());
        assert!(validate_embeddings(0, 3, &[]).is_ok());
    }

    #[test]
    fn rejects_wrong_count() {
        let err = validate_embeddings(3, 2, &[vec![0.0; 2]]).unwrap_err();
        assert!(matches!(err, EmbeddingError::CountMismatch { sent: 3, received: 1 }));
    }

    #[test]
    fn rejects_wrong_dimensions_anywhere_in_batch() {
        let err = validate_embeddings(2, 4, &[vec![0.0; 4], vec![0.0; 5]]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { expected: 4, actual: 5 }
        ));
    }
}
