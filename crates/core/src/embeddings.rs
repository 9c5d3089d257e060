use crate::error::EmbedError;
use serde::{Deserialize, Serialize};

const DEFAULT: usize = 384;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

/// Opaque text-to-vector gateway. The output width is fixed for the
/// lifetime of an index; every store operation must go through a gateway
/// of the same width.
pub trait Embedder {
    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embeds a whole batch in one gateway round trip. The ingestion
    /// pipeline treats this as all-or-nothing.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        (**self).embed_batch(texts)
    }
}

/// Deterministic hashed-trigram embedder. Offline stand-in for the remote
/// model with the same output contract (fixed width, L2-normalized).
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return Ok(vector);
        }

        if chars.len() < 3 {
            let token = chars.iter().collect::<String>();
            let bucket = (fnv1a(token.as_bytes()) % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let bucket = (fnv1a(token.as_bytes()) % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 1469598103934665603u64;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Remote embedding gateway speaking a plain JSON batch protocol:
/// POST `{ "texts": [...] }`, response `{ "embeddings": [[f32; D]] }`.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    endpoint: String,
    api_key: Option<String>,
    dimensions: usize,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, dimensions: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            dimensions,
        }
    }

    fn request_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut request = reqwest::blocking::Client::new()
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&EmbedRequest { texts });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(EmbedError::Backend {
                status: response.status().to_string(),
            });
        }

        let payload: EmbedResponse = response.json()?;
        if payload.embeddings.len() != texts.len() {
            return Err(EmbedError::Shape(format!(
                "requested {} embeddings, endpoint returned {}",
                texts.len(),
                payload.embeddings.len()
            )));
        }
        for row in &payload.embeddings {
            if row.len() != self.dimensions {
                return Err(EmbedError::Shape(format!(
                    "expected width {}, endpoint returned {}",
                    self.dimensions,
                    row.len()
                )));
            }
        }

        Ok(payload.embeddings)
    }
}

impl Embedder for HttpEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut rows = self.embed_batch(&[text.to_string()])?;
        rows.pop()
            .ok_or_else(|| EmbedError::Shape("endpoint returned no embeddings".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        tokio::task::block_in_place(|| self.request_batch(texts))
    }
}

#[cfg(test)]
mod tests {
    use super::{CharacterNgramEmbedder, Embedder};

    #[test]
    fn embedder_is_deterministic() {
        let embedder = CharacterNgramEmbedder::default();
        let first = embedder.embed("Photosynthesis in green plants").unwrap();
        let second = embedder.embed("Photosynthesis in green plants").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn embedder_outputs_expected_length() {
        let embedder = CharacterNgramEmbedder { dimensions: 32 };
        let vector = embedder.embed("abc").unwrap();
        assert_eq!(vector.len(), 32);
    }

    #[test]
    fn batch_matches_single_embeddings() {
        let embedder = CharacterNgramEmbedder { dimensions: 64 };
        let texts = vec!["the cat sat".to_string(), "the dog ran".to_string()];
        let batch = embedder.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed("the cat sat").unwrap());
        assert_eq!(batch[1], embedder.embed("the dog ran").unwrap());
    }

    #[test]
    fn similar_texts_are_closer_than_unrelated_ones() {
        let embedder = CharacterNgramEmbedder::default();
        let query = embedder.embed("feline behaviour cat").unwrap();
        let near = embedder.embed("the cat sat on the mat").unwrap();
        let far = embedder.embed("quarterly revenue projections").unwrap();

        let distance = |left: &[f32], right: &[f32]| -> f32 {
            left.iter()
                .zip(right)
                .map(|(a, b)| (a - b) * (a - b))
                .sum()
        };
        assert!(distance(&query, &near) < distance(&query, &far));
    }
}
