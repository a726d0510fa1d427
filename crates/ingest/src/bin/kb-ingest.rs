//! kb-ingest: run a file through the knowledge-base ingestion pipeline.
//!
//! Without `--embed` the prepared records are printed as JSON lines. With
//! `--embed` the configured embedding provider is called and every stored
//! record is printed together with its vector length.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::Parser;
use serde_json::{json, Map};
use tracing::info;

use kbase_core::config::{load_dotenv, Config};
use kbase_ingest::document::extract_path;
use kbase_ingest::embedding::build_embedder;
use kbase_ingest::pipeline::{prepare_records, IngestError, IngestPolicy, Ingestor, KnowledgeRecord, KnowledgeSink};

// ── CLI ─────────────────────────────────────────────────────────────

/// Chunk and optionally embed a document for the knowledge base.
#[derive(Parser, Debug)]
#[command(name = "kb-ingest", version, about)]
struct Cli {
    /// File to ingest (pdf, txt, md, or source code).
    #[arg(required_unless_present = "formats")]
    file: Option<PathBuf>,

    /// Config profile; keys are looked up as `{PROFILE}_{KEY}` first.
    /// Defaults to `KBASE_PROFILE`.
    #[arg(long)]
    profile: Option<String>,

    #[arg(long)]
    chunk_size: Option<usize>,

    #[arg(long)]
    chunk_overlap: Option<usize>,

    #[arg(long)]
    min_chunk_size: Option<usize>,

    /// Documents longer than this many characters are chunked.
    #[arg(long)]
    threshold: Option<usize>,

    /// Embed the records with the configured provider.
    #[arg(long)]
    embed: bool,

    /// Print the supported file formats and exit.
    #[arg(long)]
    formats: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(n) = self.chunk_size {
            config.chunking.chunk_size = n;
        }
        if let Some(n) = self.chunk_overlap {
            config.chunking.chunk_overlap = n;
        }
        if let Some(n) = self.min_chunk_size {
            config.chunking.min_chunk_size = n;
        }
        if let Some(n) = self.threshold {
            config.ingest.chunk_threshold = n;
        }
    }
}

// ── Stdout sink ─────────────────────────────────────────────────────

struct StdoutSink;

#[async_trait]
impl KnowledgeSink for StdoutSink {
    async fn store(&self, record: &KnowledgeRecord, embedding: &[f32]) -> Result<(), IngestError> {
        let line = json!({
            "id": record.id,
            "name": record.name,
            "chars": record.content.chars().count(),
            "metadata": record.metadata,
            "embedding_dims": embedding.len(),
        });
        println!("{line}");
        Ok(())
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Logs go to stderr so stdout stays valid JSON lines.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    cli.apply_overrides(&mut config);
    config.log_summary();

    let policy = IngestPolicy::from_config(&config).context("invalid chunking settings")?;

    if cli.formats {
        println!("{}", serde_json::to_string_pretty(&policy.supported_formats())?);
        return Ok(());
    }

    let Some(path) = cli.file.as_deref() else {
        bail!("no input file given");
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if cli.embed {
        let Some(embedder) = build_embedder(&config) else {
            bail!(
                "no embedding provider available (EMBEDDING_PROVIDER={})",
                config.embedding.provider
            );
        };
        let ingestor = Ingestor::from_config(&config, embedder, Arc::new(StdoutSink))?;
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let report = ingestor.ingest_file(&bytes, &filename, Map::new()).await?;
        info!("{}", report.message());
        return Ok(());
    }

    let size = std::fs::metadata(path)
        .with_context(|| format!("reading {}", path.display()))?
        .len() as usize;
    if size > policy.max_file_bytes {
        bail!(IngestError::FileTooLarge {
            filename,
            size,
            limit: policy.max_file_bytes,
        });
    }

    let document = extract_path(path)?;
    let records = prepare_records(
        &document.full_text(),
        &filename,
        &document.metadata.to_map(),
        &policy,
    )?;
    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    info!(file = %filename, records = records.len(), "prepared records");
    Ok(())
}
