use crate::embeddings::Embedder;
use crate::error::{IngestError, SearchError};
use crate::models::{IngestReport, MetadataRecord, PageInput};
use crate::sync::{load_store, persist_store};
use crate::traits::ObjectStore;
use tracing::info;

/// Raw candidates fetched per search, independent of the caller's `top_k`.
/// Post-hoc source filtering can discard most of the raw neighbors, so a
/// naive fetch of exactly `top_k` would starve filtered queries even when
/// qualifying matches exist further down the ranking.
pub const FETCH_K: usize = 50;

pub const DEFAULT_TOP_K: usize = 10;

/// Ingestion and search pipelines over one durable vector store.
///
/// Collaborators are injected once at construction; there is no ambient
/// client or model state. Every call is a self-contained synchronizer
/// cycle: load the blob pair, work in memory, persist if mutating. Callers
/// are responsible for not overlapping ingestion cycles against the same
/// store (last write wins otherwise).
pub struct IndexCoordinator<S, E>
where
    S: ObjectStore,
    E: Embedder,
{
    storage: S,
    embedder: E,
}

impl<S, E> IndexCoordinator<S, E>
where
    S: ObjectStore + Send + Sync,
    E: Embedder + Send + Sync,
{
    pub fn new(storage: S, embedder: E) -> Self {
        Self { storage, embedder }
    }

    /// Flattens the page batch, embeds it in one gateway call and appends
    /// vectors and metadata as one unit inside a single load/persist
    /// cycle. Returns how much was added and the resulting store size.
    pub async fn ingest(&self, pages: &[PageInput]) -> Result<IngestReport, IngestError> {
        let mut texts = Vec::new();
        let mut records = Vec::new();

        for page in pages {
            for (index, chunk) in page.chunks.iter().enumerate() {
                texts.push(chunk.clone());
                records.push(MetadataRecord::new(
                    chunk.clone(),
                    page.page,
                    page.source.as_str(),
                    index,
                ));
            }
        }

        if texts.is_empty() {
            info!("no chunks in batch, skipping ingestion cycle");
            return Ok(IngestReport { added: 0, total: 0 });
        }

        let mut store = load_store(&self.storage, self.embedder.dimensions()).await?;
        let vectors = self.embedder.embed_batch(&texts)?;
        store.append(&vectors, &records)?;
        persist_store(&self.storage, &store).await?;

        let report = IngestReport {
            added: texts.len(),
            total: store.index.len(),
        };
        info!(added = report.added, total = report.total, "ingestion cycle complete");
        Ok(report)
    }

    /// Filtered nearest-neighbor search. Fetches a fixed [`FETCH_K`]-wide
    /// raw window, then walks it in ascending-distance order, dropping
    /// unlabeled ordinals and records outside `allowed_sources` (empty
    /// filter means every source qualifies), until `top_k` texts are
    /// collected. Does not widen the window when the filter starves the
    /// result below `top_k`.
    pub async fn search(
        &self,
        query: &str,
        allowed_sources: &[String],
        top_k: usize,
    ) -> Result<Vec<String>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::Request("query is empty".to_string()));
        }

        let store = load_store(&self.storage, self.embedder.dimensions()).await?;
        if store.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query)?;
        let (_, ordinals) = store.index.search(&query_vector, FETCH_K)?;

        let mut texts = Vec::new();
        for ordinal in ordinals {
            // Negative ordinals are index padding, never real entries.
            if ordinal < 0 {
                continue;
            }
            let Some(record) = store.metadata.get(&ordinal.to_string()) else {
                continue;
            };
            if !allowed_sources.is_empty()
                && !allowed_sources.iter().any(|source| *source == record.source)
            {
                continue;
            }

            texts.push(record.text.clone());
            if texts.len() >= top_k {
                break;
            }
        }

        Ok(texts)
    }
}
