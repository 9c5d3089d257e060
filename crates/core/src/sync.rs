use crate::error::StoreError;
use crate::index::FlatIndex;
use crate::store::{MetadataStore, VectorStore};
use crate::traits::ObjectStore;
use std::fs::File;
use std::io::BufWriter;
use tracing::{debug, warn};

pub const INDEX_BLOB_KEY: &str = "vector_store.index.json";
pub const METADATA_BLOB_KEY: &str = "metadata_store.json";

/// Materializes a [`VectorStore`] from the durable blob pair.
///
/// Each blob is fetched and parsed independently; any retrieval or parse
/// failure falls back to an empty structure (first-run is the common
/// case and never an error). The two fallbacks are deliberately
/// uncoupled, so a half-loaded pair proceeds as-is.
///
/// The one fatal load condition: an index blob that parses fine but was
/// built at a different dimensionality than the configured gateway.
/// Falling back there would silently discard a live index.
pub async fn load_store<S>(storage: &S, dimensions: usize) -> Result<VectorStore, StoreError>
where
    S: ObjectStore + Sync,
{
    let index = match storage.fetch(INDEX_BLOB_KEY).await {
        Ok(bytes) => match serde_json::from_slice::<FlatIndex>(&bytes) {
            Ok(index) => {
                if index.dimensions() != dimensions {
                    return Err(StoreError::DimensionMismatch {
                        expected: dimensions,
                        actual: index.dimensions(),
                    });
                }
                index
            }
            Err(error) => {
                warn!(%error, "index blob unreadable, starting from an empty index");
                FlatIndex::new(dimensions)
            }
        },
        Err(error) => {
            warn!(%error, "index blob unavailable, starting from an empty index");
            FlatIndex::new(dimensions)
        }
    };

    let metadata = match storage.fetch(METADATA_BLOB_KEY).await {
        Ok(bytes) => match serde_json::from_slice::<MetadataStore>(&bytes) {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(%error, "metadata blob unreadable, starting from an empty mapping");
                MetadataStore::new()
            }
        },
        Err(error) => {
            warn!(%error, "metadata blob unavailable, starting from an empty mapping");
            MetadataStore::new()
        }
    };

    let store = VectorStore { index, metadata };
    if !store.is_consistent() {
        warn!(
            vectors = store.index.len(),
            records = store.metadata.len(),
            "loaded store halves disagree; ordinal correlation may be broken"
        );
    }

    debug!(vectors = store.index.len(), "vector store loaded");
    Ok(store)
}

/// Serializes both halves to a scratch directory, then uploads both
/// blobs. Either upload failing fails the whole store-back; durable state
/// stays at its pre-cycle snapshot. The scratch directory is released on
/// every exit path.
///
/// The two uploads are not an atomic commit: a crash between them can
/// leave the durable pair inconsistent. Callers serialize ingestion
/// cycles externally; concurrent writers would race load-modify-store.
pub async fn persist_store<S>(storage: &S, store: &VectorStore) -> Result<(), StoreError>
where
    S: ObjectStore + Sync,
{
    if !store.is_consistent() {
        return Err(StoreError::StoreOutOfSync {
            vectors: store.index.len(),
            records: store.metadata.len(),
        });
    }

    let scratch = tempfile::tempdir()?;
    let index_path = scratch.path().join(INDEX_BLOB_KEY);
    let metadata_path = scratch.path().join(METADATA_BLOB_KEY);

    serde_json::to_writer(BufWriter::new(File::create(&index_path)?), &store.index)?;
    serde_json::to_writer(
        BufWriter::new(File::create(&metadata_path)?),
        &store.metadata,
    )?;

    storage.put(INDEX_BLOB_KEY, &std::fs::read(&index_path)?).await?;
    storage
        .put(METADATA_BLOB_KEY, &std::fs::read(&metadata_path)?)
        .await?;

    debug!(vectors = store.index.len(), "vector store persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_store, persist_store, INDEX_BLOB_KEY, METADATA_BLOB_KEY};
    use crate::models::MetadataRecord;
    use crate::store::VectorStore;
    use crate::stores::FsObjectStore;
    use crate::traits::ObjectStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn fresh_store_loads_empty_without_error() {
        let dir = tempdir().unwrap();
        let storage = FsObjectStore::new(dir.path());

        let store = load_store(&storage, 8).await.unwrap();
        assert!(store.index.is_empty());
        assert!(store.metadata.is_empty());
        assert_eq!(store.index.dimensions(), 8);
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let storage = FsObjectStore::new(dir.path());

        let mut store = VectorStore::empty(2);
        store
            .append(
                &[vec![0.25, 0.75]],
                &[MetadataRecord::new("The cat sat.", 1, "doc1", 0)],
            )
            .unwrap();
        persist_store(&storage, &store).await.unwrap();

        let reloaded = load_store(&storage, 2).await.unwrap();
        assert_eq!(reloaded.index.len(), 1);
        assert_eq!(reloaded.metadata.get("0").unwrap().text, "The cat sat.");
        assert!(reloaded.is_consistent());
    }

    #[tokio::test]
    async fn corrupt_blobs_fall_back_to_empty() {
        let dir = tempdir().unwrap();
        let storage = FsObjectStore::new(dir.path());
        storage.put(INDEX_BLOB_KEY, b"not json").await.unwrap();
        storage.put(METADATA_BLOB_KEY, b"[1, 2").await.unwrap();

        let store = load_store(&storage, 4).await.unwrap();
        assert!(store.index.is_empty());
        assert!(store.metadata.is_empty());
    }

    #[tokio::test]
    async fn blob_halves_fall_back_independently() {
        let dir = tempdir().unwrap();
        let storage = FsObjectStore::new(dir.path());

        let mut store = VectorStore::empty(2);
        store
            .append(
                &[vec![0.0, 1.0]],
                &[MetadataRecord::new("text", 1, "doc1", 0)],
            )
            .unwrap();
        persist_store(&storage, &store).await.unwrap();
        storage.put(METADATA_BLOB_KEY, b"garbage").await.unwrap();

        let reloaded = load_store(&storage, 2).await.unwrap();
        assert_eq!(reloaded.index.len(), 1);
        assert!(reloaded.metadata.is_empty());
    }

    #[tokio::test]
    async fn dimension_drift_on_load_is_fatal() {
        let dir = tempdir().unwrap();
        let storage = FsObjectStore::new(dir.path());

        let store = VectorStore::empty(4);
        persist_store(&storage, &store).await.unwrap();

        assert!(load_store(&storage, 8).await.is_err());
    }

    #[tokio::test]
    async fn inconsistent_halves_are_refused_on_persist() {
        let dir = tempdir().unwrap();
        let storage = FsObjectStore::new(dir.path());

        let mut store = VectorStore::empty(2);
        store.index.add(&[vec![0.0, 0.0]]).unwrap();
        assert!(persist_store(&storage, &store).await.is_err());
    }
}
