use std::sync::Mutex;

use async_trait::async_trait;

use super::records::KnowledgeRecord;
use super::IngestError;

/// Destination for embedded records: a vector store, a knowledge-base
/// table, or stdout in the CLI.
#[async_trait]
pub trait KnowledgeSink: Send + Sync {
    async fn store(&self, record: &KnowledgeRecord, embedding: &[f32]) -> Result<(), IngestError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub record: KnowledgeRecord,
    pub embedding: Vec<f32>,
}

/// In-process sink that keeps everything it receives, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<StoredRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KnowledgeSink for MemorySink {
    async fn store(&self, record: &KnowledgeRecord, embedding: &[f32]) -> Result<(), IngestError> {
        self.entries
            .lock()
            .map_err(|e| IngestError::Sink(e.to_string()))?
            .push(StoredRecord {
                record: record.clone(),
                embedding: embedding.to_vec(),
            });
        Ok(())
    }
}
