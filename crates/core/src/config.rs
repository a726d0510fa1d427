use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunking: ChunkingSettings,
    pub ingest: IngestSettings,
    pub embedding: EmbeddingConfig,
    pub ollama: OllamaConfig,
    pub openai: OpenAiConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `KBASE_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("KBASE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chunking: ChunkingSettings::from_env_profiled(p),
            ingest: IngestSettings::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            openai: OpenAiConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:    size={}, overlap={}, min={}, custom_separators={}",
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
            self.chunking.min_chunk_size,
            self.chunking.separators.is_some()
        );
        tracing::info!(
            "  ingest:      threshold={} chars, max_file={} MB",
            self.ingest.chunk_threshold,
            self.ingest.max_file_size_mb
        );
        tracing::info!(
            "  embedding:   provider={}, dims={}, batch={}",
            self.embedding.provider,
            self.embedding.dimensions,
            self.embedding.batch_size
        );
        tracing::info!("  ollama:      url={}", self.ollama.url);
        tracing::info!(
            "  openai:      base_url={}, key={}",
            self.openai.base_url.as_deref().unwrap_or("(default)"),
            if self.openai.api_key.is_some() { "set" } else { "(none)" }
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "chunking": {
                "chunk_size": self.chunking.chunk_size,
                "chunk_overlap": self.chunking.chunk_overlap,
                "min_chunk_size": self.chunking.min_chunk_size,
                "separators": self.chunking.separators,
            },
            "ingest": {
                "chunk_threshold": self.ingest.chunk_threshold,
                "max_file_size_mb": self.ingest.max_file_size_mb,
            },
            "embedding": {
                "provider": self.embedding.provider,
                "model": self.embedding.model,
                "dimensions": self.embedding.dimensions,
                "configured": self.embedding.is_configured(&self.openai),
            },
            "ollama": { "url": self.ollama.url },
            "openai": {
                "base_url": self.openai.base_url,
                "configured": self.openai.api_key.is_some(),
            },
        })
    }
}

// ── Chunking ──────────────────────────────────────────────────

/// Raw chunking tunables. Validation happens when the ingest crate turns
/// these into a `ChunkingConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_size: usize,
    /// Custom separator priority list; `None` keeps the built-in hierarchy.
    pub separators: Option<Vec<String>>,
}

impl ChunkingSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_size: profiled_env_usize(p, "CHUNK_SIZE", 1000),
            chunk_overlap: profiled_env_usize(p, "CHUNK_OVERLAP", 200),
            min_chunk_size: profiled_env_usize(p, "CHUNK_MIN_SIZE", 100),
            separators: profiled_env_opt(p, "CHUNK_SEPARATORS").map(|raw| parse_separators(&raw)),
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 100,
            separators: None,
        }
    }
}

/// Parse a `|`-separated separator list. `\n`, `\t` and `\\` escapes are
/// expanded, empty entries are skipped, and the empty fallback separator is
/// always appended last.
pub fn parse_separators(raw: &str) -> Vec<String> {
    let mut separators: Vec<String> = raw
        .split('|')
        .map(unescape)
        .filter(|s| !s.is_empty())
        .collect();
    separators.push(String::new());
    separators
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ── Ingest ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Documents at or below this many characters are stored whole.
    pub chunk_threshold: usize,
    pub max_file_size_mb: u32,
}

impl IngestSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_threshold: profiled_env_usize(p, "CHUNK_THRESHOLD", 2000),
            max_file_size_mb: profiled_env_u32(p, "MAX_FILE_SIZE_MB", 200),
        }
    }

    pub fn max_file_bytes(&self) -> usize {
        (self.max_file_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            chunk_threshold: 2000,
            max_file_size_mb: 200,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
        }
    }
}

// ── OpenAI-compatible endpoint ────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl OpenAiConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama", "openai", "none"
    pub provider: String,
    /// Provider default when unset.
    pub model: Option<String>,
    pub dimensions: u32,
    pub batch_size: u32,
    pub cache_size: u32,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", "ollama").to_lowercase(),
            model: profiled_env_opt(p, "EMBEDDING_MODEL"),
            dimensions: profiled_env_u32(p, "EMBEDDING_DIMENSIONS", 768),
            batch_size: profiled_env_u32(p, "EMBEDDING_BATCH_SIZE", 64),
            cache_size: profiled_env_u32(p, "EMBEDDING_CACHE_SIZE", 1024),
        }
    }

    pub fn is_configured(&self, openai: &OpenAiConfig) -> bool {
        match self.provider.as_str() {
            "ollama" => true,
            "openai" => openai.api_key.is_some(),
            _ => false,
        }
    }
}
