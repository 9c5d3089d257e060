use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub source_id: String,
    pub source_path: String,
    pub checksum: String,
    pub ingested_at: DateTime<Utc>,
}

/// One page of extracted text, already chunked, ready for the ingestion
/// pipeline. Pages with no readable text are never emitted upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInput {
    /// 1-based page number within the source document.
    pub page: u32,
    /// Stable document identifier, the key used for search filtering.
    pub source: String,
    pub chunks: Vec<String>,
}

/// Provenance record stored alongside every vector, keyed by the vector's
/// string ordinal in the metadata blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub text: String,
    pub page: u32,
    pub source: String,
    pub chunk_id: String,
}

impl MetadataRecord {
    pub fn new(text: impl Into<String>, page: u32, source: impl Into<String>, index: usize) -> Self {
        let source = source.into();
        let chunk_id = format!("{source}_p{page}_c{index}");
        Self {
            text: text.into(),
            page,
            source,
            chunk_id,
        }
    }
}

/// Outcome of one ingestion cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Vectors appended in this cycle.
    pub added: usize,
    /// Total vectors in the durable store after the cycle.
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::MetadataRecord;

    #[test]
    fn chunk_id_encodes_source_page_and_index() {
        let record = MetadataRecord::new("The cat sat.", 3, "doc1", 2);
        assert_eq!(record.chunk_id, "doc1_p3_c2");
        assert_eq!(record.source, "doc1");
        assert_eq!(record.page, 3);
    }
}
