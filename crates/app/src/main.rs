use chrono::Utc;
use clap::{Parser, Subcommand};
use material_search_core::{
    collect_folder_pages, parse_page_batch, CharacterNgramEmbedder, ChunkingConfig, Embedder,
    FsObjectStore, HttpEmbedder, HttpObjectStore, IndexCoordinator, ObjectStore,
    OcrEndpointConfig, DEFAULT_EMBEDDING_DIMENSIONS,
};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "material-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory used as the durable blob store.
    #[arg(long, default_value = ".material-store")]
    store_dir: String,

    /// HTTP blob gateway endpoint; takes precedence over --store-dir.
    #[arg(long)]
    store_url: Option<String>,

    /// Logical prefix for blobs on the HTTP gateway.
    #[arg(long, default_value = "vector_store")]
    store_prefix: String,

    /// Bearer token for the blob gateway.
    #[arg(long, env = "BLOB_STORE_API_KEY")]
    store_api_key: Option<String>,

    /// Remote embedding endpoint; the deterministic hashed-trigram
    /// embedder is used when unset.
    #[arg(long)]
    embed_url: Option<String>,

    /// Bearer token for the embedding endpoint.
    #[arg(long, env = "EMBED_API_KEY")]
    embed_api_key: Option<String>,

    /// Embedding width. Must match the width the store was created with.
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    dimensions: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a folder of PDFs: extract, chunk, embed, persist.
    Ingest {
        /// Folder that contains PDFs recursively.
        #[arg(long)]
        folder: String,
        /// Target chunk width in characters.
        #[arg(long, default_value = "1000")]
        chunk_size: usize,
        /// Characters repeated between neighboring chunks.
        #[arg(long, default_value = "100")]
        overlap: usize,
    },
    /// Ingest a pre-chunked JSON page batch from a file or stdin.
    IngestBatch {
        /// Path to the batch payload, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: String,
    },
    /// Query the store; prints a JSON array of matching chunk texts.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Comma-separated source identifiers to restrict the search to.
        #[arg(long)]
        sources: Option<String>,
        /// Number of results to return.
        #[arg(long, default_value = "10")]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let storage: Box<dyn ObjectStore + Send + Sync> = match &cli.store_url {
        Some(endpoint) => Box::new(HttpObjectStore::new(
            endpoint,
            cli.store_prefix.clone(),
            cli.store_api_key.clone(),
        )?),
        None => Box::new(FsObjectStore::new(cli.store_dir.clone())),
    };

    let embedder: Box<dyn Embedder + Send + Sync> = match &cli.embed_url {
        Some(endpoint) => Box::new(HttpEmbedder::new(
            endpoint.as_str(),
            cli.embed_api_key.clone(),
            cli.dimensions,
        )),
        None => Box::new(CharacterNgramEmbedder {
            dimensions: cli.dimensions,
        }),
    };

    let coordinator = IndexCoordinator::new(storage, embedder);
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "material-search boot"
    );

    match cli.command {
        Command::Ingest {
            folder,
            chunk_size,
            overlap,
        } => {
            let ocr = OcrEndpointConfig::from_env();
            let config = ChunkingConfig {
                chunk_size,
                overlap,
            };
            let report = collect_folder_pages(Path::new(&folder), ocr.as_ref(), config)?;

            if !report.skipped_files.is_empty() {
                warn!(
                    "skipped_files={} for folder={}",
                    report.skipped_files.len(),
                    folder
                );
                for skipped in report.skipped_files {
                    warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
                }
            }

            for document in &report.documents {
                info!(
                    source = %document.source_id,
                    checksum = %document.checksum,
                    "document fingerprinted"
                );
            }

            let outcome = coordinator.ingest(&report.pages).await?;
            println!(
                "{} chunks ingested ({} vectors total) at {}",
                outcome.added,
                outcome.total,
                Utc::now().to_rfc3339()
            );
        }
        Command::IngestBatch { input } => {
            let payload = if input == "-" {
                let mut buffer = Vec::new();
                std::io::stdin().read_to_end(&mut buffer)?;
                buffer
            } else {
                std::fs::read(&input)?
            };

            let pages = parse_page_batch(&payload)?;
            let outcome = coordinator.ingest(&pages).await?;
            println!(
                "{} chunks ingested ({} vectors total) at {}",
                outcome.added,
                outcome.total,
                Utc::now().to_rfc3339()
            );
        }
        Command::Search {
            query,
            sources,
            top_k,
        } => {
            let allowed_sources: Vec<String> = sources
                .map(|list| {
                    list.split(',')
                        .map(|source| source.trim().to_string())
                        .filter(|source| !source.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            let hits = coordinator.search(&query, &allowed_sources, top_k).await?;
            println!("{}", serde_json::to_string(&hits)?);
        }
    }

    Ok(())
}
