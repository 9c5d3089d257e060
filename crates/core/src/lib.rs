pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod store;
pub mod stores;
pub mod sync;
pub mod traits;

pub use chunking::{chunk_text, ChunkingConfig};
pub use embeddings::{
    CharacterNgramEmbedder, Embedder, HttpEmbedder, DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{EmbedError, IngestError, SearchError, StoreError};
pub use extractor::{extract_page_texts, OcrEndpointConfig, PageText, PdfExtractor};
pub use index::FlatIndex;
pub use ingest::{
    collect_folder_pages, discover_pdf_files, parse_page_batch, PageReport, SkippedPdf,
};
pub use models::{DocumentFingerprint, IngestReport, MetadataRecord, PageInput};
pub use orchestrator::{IndexCoordinator, DEFAULT_TOP_K, FETCH_K};
pub use store::{MetadataStore, VectorStore};
pub use stores::{FsObjectStore, HttpObjectStore};
pub use sync::{load_store, persist_store, INDEX_BLOB_KEY, METADATA_BLOB_KEY};
pub use traits::ObjectStore;
