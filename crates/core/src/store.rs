use crate::error::StoreError;
use crate::index::FlatIndex;
use crate::models::MetadataRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordinal-keyed provenance side table, persisted as one flat JSON object
/// (`{"0": {...}, "1": {...}}`). Keys are stringified vector ordinals;
/// an absent key is not an error, callers treat it as "skip".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataStore {
    records: BTreeMap<String, MetadataRecord>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataRecord> {
        self.records.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, record: MetadataRecord) {
        self.records.insert(key.into(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The consistency unit the synchronizer loads and persists: a flat vector
/// index plus its metadata side table, correlated only by ordinal.
///
/// There is no long-lived instance of this type; every ingestion or search
/// call materializes one from the durable blobs, works on it in memory and
/// drops it after the cycle.
#[derive(Debug, Clone)]
pub struct VectorStore {
    pub index: FlatIndex,
    pub metadata: MetadataStore,
}

impl VectorStore {
    pub fn empty(dimensions: usize) -> Self {
        Self {
            index: FlatIndex::new(dimensions),
            metadata: MetadataStore::new(),
        }
    }

    /// Appends vectors and their records as one unit, assigning metadata
    /// keys from the pre-append index size. Append-both-or-neither: a
    /// length or width mismatch leaves both halves untouched.
    pub fn append(
        &mut self,
        vectors: &[Vec<f32>],
        records: &[MetadataRecord],
    ) -> Result<(), StoreError> {
        if vectors.len() != records.len() {
            return Err(StoreError::StoreOutOfSync {
                vectors: vectors.len(),
                records: records.len(),
            });
        }

        let start_ordinal = self.index.len();
        self.index.add(vectors)?;

        for (offset, record) in records.iter().enumerate() {
            self.metadata
                .set((start_ordinal + offset).to_string(), record.clone());
        }
        Ok(())
    }

    /// Holds at every synchronizer boundary; a violation means unlabeled
    /// vectors that no search can ever surface.
    pub fn is_consistent(&self) -> bool {
        self.index.len() == self.metadata.len()
    }
}
