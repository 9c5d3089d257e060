use crate::error::IngestError;
use base64::{engine::general_purpose::STANDARD, Engine};
use lopdf::Document;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
struct OcrRequest {
    pdf_base64: String,
    source_path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OcrResponse {
    pages: Option<Vec<OcrPage>>,
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OcrPage {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    text: Option<String>,
}

/// Multimodal OCR endpoint used when native PDF text extraction comes up
/// empty (scanned documents). Constructed by the caller and passed in; the
/// core never reads ambient configuration.
#[derive(Debug, Clone)]
pub struct OcrEndpointConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl OcrEndpointConfig {
    /// Reads `LLM_OCR_ENDPOINT` / `LLM_OCR_API_KEY`; `None` when no
    /// endpoint is configured.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("LLM_OCR_ENDPOINT").ok()?;
        let endpoint = endpoint.trim().to_string();
        if endpoint.is_empty() {
            return None;
        }

        let api_key = std::env::var("LLM_OCR_API_KEY").ok().and_then(|value| {
            let key = value.trim().to_string();
            if key.is_empty() {
                None
            } else {
                Some(key)
            }
        });

        Some(Self { endpoint, api_key })
    }
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(PageText {
                    number: page_no,
                    text,
                });
            }
        }

        if pages.is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(pages)
    }
}

/// Extracts page texts natively, falling back to the OCR endpoint (when
/// one is configured) for PDFs lopdf cannot read.
pub fn extract_page_texts(
    path: &Path,
    ocr: Option<&OcrEndpointConfig>,
) -> Result<Vec<PageText>, IngestError> {
    let extracted = LopdfExtractor.extract_pages(path);

    match extracted {
        Ok(pages) => Ok(pages),
        Err(IngestError::PdfParse(parse_error)) => match extract_with_ocr(path, ocr) {
            Ok(Some(pages)) => Ok(pages),
            Ok(None) => Err(IngestError::PdfParse(parse_error)),
            Err(ocr_error) => Err(IngestError::PdfParse(format!(
                "{parse_error}; multimodal OCR fallback failed: {ocr_error}"
            ))),
        },
        Err(error) => Err(error),
    }
}

fn extract_with_ocr(
    path: &Path,
    ocr: Option<&OcrEndpointConfig>,
) -> Result<Option<Vec<PageText>>, IngestError> {
    let Some(cfg) = ocr else {
        return Ok(None);
    };
    tokio::task::block_in_place(|| request_ocr_pages(path, cfg))
}

fn request_ocr_pages(
    path: &Path,
    cfg: &OcrEndpointConfig,
) -> Result<Option<Vec<PageText>>, IngestError> {
    let pdf = std::fs::read(path).map_err(IngestError::Io)?;
    let payload = OcrRequest {
        pdf_base64: STANDARD.encode(pdf),
        source_path: path.to_string_lossy().to_string(),
    };

    let mut request = Client::new()
        .post(&cfg.endpoint)
        .header("content-type", "application/json")
        .json(&payload);

    if let Some(api_key) = &cfg.api_key {
        request = request.bearer_auth(api_key);
    }

    let response = request.send()?;

    if !response.status().is_success() {
        return Err(IngestError::OcrFailed(format!(
            "multimodal OCR request to {} returned {}",
            cfg.endpoint,
            response.status()
        )));
    }

    let payload: OcrResponse = response.json()?;
    let pages = payload_to_pages(&payload, path)?;

    if pages.is_empty() {
        return Err(IngestError::OcrFailed(format!(
            "multimodal OCR response has no readable text: {}",
            path.display()
        )));
    }

    Ok(Some(pages))
}

fn payload_to_pages(payload: &OcrResponse, path: &Path) -> Result<Vec<PageText>, IngestError> {
    if let Some(listed) = &payload.pages {
        let listed = listed
            .iter()
            .filter_map(|page| {
                let text = page.text.as_ref().map(|value| value.trim().to_string());
                text.and_then(|normalized| {
                    if normalized.is_empty() {
                        None
                    } else {
                        Some(PageText {
                            number: page.page.unwrap_or(1),
                            text: normalized,
                        })
                    }
                })
            })
            .collect::<Vec<_>>();

        if !listed.is_empty() {
            return Ok(listed);
        }
    }

    if let Some(raw_text) = &payload.text {
        // Single-blob responses separate pages with form feeds.
        let pages = raw_text
            .split('\u{000c}')
            .enumerate()
            .filter_map(|(index, chunk)| {
                let normalized = chunk.trim().to_string();
                if normalized.is_empty() {
                    None
                } else {
                    Some(PageText {
                        number: (index + 1) as u32,
                        text: normalized,
                    })
                }
            })
            .collect::<Vec<_>>();

        if !pages.is_empty() {
            return Ok(pages);
        }
    }

    Err(IngestError::OcrFailed(format!(
        "multimodal OCR response was empty for {}",
        path.display()
    )))
}
