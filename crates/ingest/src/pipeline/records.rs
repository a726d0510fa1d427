use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use kbase_core::document::{DocId, CODE_EXTENSIONS, DOCUMENT_EXTENSIONS, TEXT_EXTENSIONS};
use kbase_core::Config;

use super::IngestError;
use crate::document::chunker::{chunk_text, ChunkingConfig};

/// One unit handed to the embedding and storage capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub id: DocId,
    /// Display name: the file name, or `"<file> [chunk i/n]"` for chunks.
    pub name: String,
    pub content: String,
    pub metadata: Map<String, Value>,
}

/// Caller-side rules deciding whether and how a document gets chunked.
#[derive(Debug, Clone)]
pub struct IngestPolicy {
    /// Documents with at most this many characters are stored whole.
    pub chunk_threshold: usize,
    pub max_file_bytes: usize,
    pub chunking: ChunkingConfig,
}

impl IngestPolicy {
    pub fn from_config(config: &Config) -> Result<Self, IngestError> {
        Ok(Self {
            chunk_threshold: config.ingest.chunk_threshold,
            max_file_bytes: config.ingest.max_file_bytes(),
            chunking: ChunkingConfig::from_settings(&config.chunking)?,
        })
    }

    /// Accepted extensions grouped by category, plus the upload size limit.
    pub fn supported_formats(&self) -> Value {
        let sorted = |exts: &[&str]| {
            let mut v: Vec<String> = exts.iter().map(|e| e.to_string()).collect();
            v.sort();
            v
        };
        json!({
            "formats": {
                "documents": sorted(DOCUMENT_EXTENSIONS),
                "text": sorted(TEXT_EXTENSIONS),
                "code": sorted(CODE_EXTENSIONS),
            },
            "max_size_mb": self.max_file_bytes / (1024 * 1024),
        })
    }
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            chunk_threshold: 2000,
            max_file_bytes: 200 * 1024 * 1024,
            chunking: ChunkingConfig::default(),
        }
    }
}

pub fn chunk_display_name(name: &str, chunk_index: usize, total_chunks: usize) -> String {
    format!("{name} [chunk {}/{total_chunks}]", chunk_index + 1)
}

/// Turn a document's text into knowledge records.
///
/// Short documents become a single record carrying `metadata` unchanged.
/// Longer ones are chunked; each chunk record gets `chunk_index`,
/// `total_chunks`, and `parent_filename` merged into its metadata.
pub fn prepare_records(
    text: &str,
    name: &str,
    metadata: &Map<String, Value>,
    policy: &IngestPolicy,
) -> Result<Vec<KnowledgeRecord>, IngestError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(IngestError::EmptyDocument(name.to_string()));
    }

    if text.chars().count() <= policy.chunk_threshold {
        return Ok(vec![KnowledgeRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            content: text.to_string(),
            metadata: metadata.clone(),
        }]);
    }

    let records = chunk_text(text, &policy.chunking)
        .into_iter()
        .map(|chunk| {
            let mut meta = metadata.clone();
            meta.insert("chunk_index".into(), json!(chunk.chunk_index));
            meta.insert("total_chunks".into(), json!(chunk.total_chunks));
            meta.insert("parent_filename".into(), json!(name));
            KnowledgeRecord {
                id: Uuid::new_v4(),
                name: chunk_display_name(name, chunk.chunk_index, chunk.total_chunks),
                content: chunk.content,
                metadata: meta,
            }
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(threshold: usize) -> IngestPolicy {
        IngestPolicy {
            chunk_threshold: threshold,
            max_file_bytes: 1024,
            chunking: ChunkingConfig::with_sizes(100, 20, 10).unwrap(),
        }
    }

    fn base_metadata() -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert("knowledge_base_id".into(), json!("kb-1"));
        meta.insert("added_by".into(), json!("user-7"));
        meta
    }

    fn sentences(n: usize) -> String {
        (0..n)
            .map(|i| format!("Sentence number {i} talks about ingestion."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_document_is_one_record() {
        let records = prepare_records("  small note \n", "note.txt", &base_metadata(), &policy(200)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "note.txt");
        assert_eq!(records[0].content, "small note");
        assert_eq!(records[0].metadata, base_metadata());
    }

    #[test]
    fn threshold_is_inclusive() {
        let text = "y".repeat(200);
        let records = prepare_records(&text, "edge.txt", &Map::new(), &policy(200)).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn long_document_is_chunked_with_names_and_metadata() {
        let text = sentences(30);
        let records = prepare_records(&text, "guide.md", &base_metadata(), &policy(200)).unwrap();
        let total = records.len();
        assert!(total > 1);

        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.name, format!("guide.md [chunk {}/{}]", i + 1, total));
            assert_eq!(record.metadata["chunk_index"], json!(i));
            assert_eq!(record.metadata["total_chunks"], json!(total));
            assert_eq!(record.metadata["parent_filename"], "guide.md");
            assert_eq!(record.metadata["knowledge_base_id"], "kb-1");
        }
        let ids: std::collections::HashSet<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn blank_document_is_rejected() {
        let err = prepare_records(" \n ", "blank.txt", &Map::new(), &policy(200)).unwrap_err();
        assert!(matches!(err, IngestError::EmptyDocument(ref n) if n == "blank.txt"));
    }

    #[test]
    fn display_name_is_one_based() {
        assert_eq!(chunk_display_name("a.pdf", 0, 3), "a.pdf [chunk 1/3]");
        assert_eq!(chunk_display_name("a.pdf", 2, 3), "a.pdf [chunk 3/3]");
    }

    #[test]
    fn policy_from_config_validates_chunking() {
        let mut config = Config::for_profile("POLICYTEST");
        config.chunking.chunk_size = 500;
        config.chunking.chunk_overlap = 50;
        config.chunking.min_chunk_size = 20;
        config.ingest.chunk_threshold = 800;
        let policy = IngestPolicy::from_config(&config).unwrap();
        assert_eq!(policy.chunking.chunk_size(), 500);
        assert_eq!(policy.chunk_threshold, 800);

        config.chunking.chunk_overlap = 500;
        assert!(matches!(
            IngestPolicy::from_config(&config),
            Err(IngestError::Chunking(_))
        ));
    }

    #[test]
    fn supported_formats_listing() {
        let formats = IngestPolicy::default().supported_formats();
        assert_eq!(formats["max_size_mb"], 200);
        assert_eq!(formats["formats"]["documents"], json!([".docx", ".pdf"]));
        assert_eq!(formats["formats"]["text"], json!([".md", ".txt"]));
        assert!(formats["formats"]["code"]
            .as_array()
            .unwrap()
            .contains(&json!(".rs")));
    }
}
