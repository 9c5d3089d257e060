use crate::chunking::{chunk_text, ChunkingConfig};
use crate::error::IngestError;
use crate::extractor::{extract_page_texts, OcrEndpointConfig};
use crate::models::{DocumentFingerprint, PageInput};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

/// Page batch assembled from a folder of PDFs, plus the files that could
/// not be read.
pub struct PageReport {
    pub pages: Vec<PageInput>,
    pub documents: Vec<DocumentFingerprint>,
    pub skipped_files: Vec<SkippedPdf>,
}

/// Walks a folder, extracts page texts (OCR fallback when configured),
/// chunks them and assembles the ingestion batch. Best-effort per file:
/// unreadable PDFs are reported, not fatal. Pages with no chunks are
/// omitted from the batch entirely.
pub fn collect_folder_pages(
    folder: &Path,
    ocr: Option<&OcrEndpointConfig>,
    config: ChunkingConfig,
) -> Result<PageReport, IngestError> {
    let files = discover_pdf_files(folder);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no pdf files found in {}",
            folder.display()
        )));
    }

    let mut pages = Vec::new();
    let mut documents = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let build_result = (|| {
            let fingerprint = build_document_fingerprint(&path)?;
            let extracted = extract_page_texts(&path, ocr)?;
            let mut file_pages = Vec::new();

            for page in extracted {
                let chunks = chunk_text(&page.text, config);
                if chunks.is_empty() {
                    continue;
                }
                file_pages.push(PageInput {
                    page: page.number,
                    source: fingerprint.source_id.clone(),
                    chunks,
                });
            }

            Ok::<_, IngestError>((fingerprint, file_pages))
        })();

        match build_result {
            Ok((fingerprint, file_pages)) => {
                documents.push(fingerprint);
                pages.extend(file_pages);
            }
            Err(error) => skipped_files.push(SkippedPdf {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(PageReport {
        pages,
        documents,
        skipped_files,
    })
}

/// Parses a JSON page batch (the piped-ingestion surface). Rejected before
/// any store mutation when malformed.
pub fn parse_page_batch(bytes: &[u8]) -> Result<Vec<PageInput>, IngestError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn build_document_fingerprint(path: &Path) -> Result<DocumentFingerprint, IngestError> {
    let checksum = digest_file(path)?;
    let source_id = path
        .file_stem()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })?;

    Ok(DocumentFingerprint {
        source_id: source_id.to_string(),
        source_path: path.to_string_lossy().to_string(),
        checksum,
        ingested_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::{collect_folder_pages, digest_file, discover_pdf_files, parse_page_batch};
    use crate::chunking::ChunkingConfig;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("b.pdf"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn checksum_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("a.pdf");
        fs::write(&file_path, b"abc")?;

        let first = digest_file(&file_path)?;
        let second = digest_file(&file_path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn collection_fails_without_pdfs() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = collect_folder_pages(dir.path(), None, ChunkingConfig::default());
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn unreadable_pdfs_are_skipped_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("unreadable.pdf"), b"%PDF-1.4\n%broken")?;

        let report = collect_folder_pages(dir.path(), None, ChunkingConfig::default())?;

        assert!(report.pages.is_empty());
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(
            report.skipped_files[0]
                .path
                .file_name()
                .and_then(|name| name.to_str()),
            Some("unreadable.pdf")
        );
        Ok(())
    }

    #[test]
    fn page_batch_parses_the_wire_shape() {
        let payload = br#"[{"page": 1, "source": "doc1", "chunks": ["The cat sat."]}]"#;
        let pages = parse_page_batch(payload).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].source, "doc1");
        assert_eq!(pages[0].chunks, vec!["The cat sat.".to_string()]);
    }

    #[test]
    fn malformed_page_batch_is_rejected() {
        assert!(parse_page_batch(b"{not json").is_err());
        assert!(parse_page_batch(b"[{\"page\": \"one\"}]").is_err());
    }
}
