pub mod batcher;
pub mod cache;
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use kbase_core::Config;
use tracing::{info, warn};

pub use batcher::EmbeddingBatcher;
pub use cache::EmbeddingCache;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Build an Embedder from config. Returns None if no embedding provider configured.
pub fn build_embedder(config: &Config) -> Option<Arc<dyn Embedder>> {
    let dims = config.embedding.dimensions as usize;

    match config.embedding.provider.as_str() {
        "ollama" => {
            let model = config
                .embedding
                .model
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_OLLAMA_MODEL.to_string());
            info!("Embedding provider ready: ollama (model: {}, dims: {})", model, dims);
            Some(Arc::new(OllamaEmbedder::new(config.ollama.url.clone(), model, dims)))
        }
        "openai" => {
            let Some(api_key) = config.openai.api_key.clone() else {
                warn!("EMBEDDING_PROVIDER=openai but OPENAI_API_KEY is empty, embedding disabled");
                return None;
            };
            let model = config
                .embedding
                .model
                .clone()
                .unwrap_or_else(|| openai::DEFAULT_OPENAI_MODEL.to_string());
            info!("Embedding provider ready: openai (model: {}, dims: {})", model, dims);
            Some(Arc::new(OpenAiEmbedder::new(
                api_key,
                model,
                config.openai.base_url.clone(),
                dims,
            )))
        }
        "none" | "" => None,
        other => {
            warn!("Unknown embedding provider '{}', embedding disabled", other);
            None
        }
    }
}
