//! Embedding clients for generating vector representations
//!
//! The embedder is always injected into the pipeline; nothing here keeps a
//! process-wide model instance. `HashEmbedder` is a deterministic local
//! stand-in, `OllamaEmbedder` talks to an Ollama server.
//!
//! Author: hephaex@gmail.com

use fye_core::{EmbeddingConfig, EmbeddingProvider, FyeError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Embedding Trait
// ============================================================================

/// Trait for embedding generation
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Get embedding dimension
    fn dimension(&self) -> usize;

    /// Model identifier, recorded alongside cached embeddings
    fn model_name(&self) -> &str;
}

// ============================================================================
// Hash Embedding
// ============================================================================

/// Deterministic feature-hashing embedder
///
/// Lowercased word unigrams and bigrams are hashed into `dimension` buckets
/// with a hash-derived sign, then L2-normalized. Identical text always maps
/// to the identical vector; text without any words maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    model: String,
}

impl HashEmbedder {
    /// Create a new hash embedder
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            model: format!("hash-{}", dimension.max(1)),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let hash = u64::from_le_bytes(bytes);

        let index = (hash % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let tokens = Self::tokens(text);

        for token in &tokens {
            let (index, sign) = self.bucket(token);
            vector[index] += sign;
        }
        for pair in tokens.windows(2) {
            let (index, sign) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            vector[index] += 0.5 * sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Ollama Embedding Client
// ============================================================================

/// Ollama embedding API client
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedding client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let dimension = match model.as_str() {
            "nomic-embed-text" => 768,
            "mxbai-embed-large" => 1024,
            "all-minilm" => 384,
            _ => 384, // all-MiniLM-L6-v2 sized default
        };

        Self::with_client(base_url, model, dimension, Duration::from_secs(60))
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        Self::with_client(
            config.ollama_url.clone(),
            config.model.clone(),
            config.dimension,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn with_client(
        base_url: impl Into<String>,
        model: String,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FyeError::EmbeddingError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model,
            dimension,
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .map_err(|e| {
                FyeError::EmbeddingError(format!("Ollama embedding request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(FyeError::EmbeddingError(format!(
                "Ollama embedding error: {error_text}"
            )));
        }

        let result: OllamaEmbeddingResponse = response.json().map_err(|e| {
            FyeError::EmbeddingError(format!("Failed to parse embedding response: {e}"))
        })?;

        if result.embedding.len() != self.dimension {
            return Err(FyeError::DimensionMismatch {
                expected: self.dimension,
                actual: result.embedding.len(),
            });
        }

        Ok(result.embedding)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // Ollama doesn't have native batch embedding, so we process sequentially
        let mut results = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            results.push(self.embed(text)?);
            if (i + 1) % 25 == 0 {
                tracing::debug!("Embedded {}/{} texts", i + 1, texts.len());
            }
        }
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an embedder from config
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbedder::new(config.dimension))),
        EmbeddingProvider::Ollama => Ok(Arc::new(OllamaEmbedder::from_config(config)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::cosine_similarity;

    #[test]
    fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("Python developer with Django").unwrap();
        let b = embedder.embed("Python developer with Django").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_embedder_is_normalized() {
        let embedder = HashEmbedder::new(128);
        let v = embedder.embed("Kubernetes and AWS").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hash_embedder_empty_text_is_zero() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed("  ,; ").unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_hash_embedder_case_insensitive() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(
            embedder.embed("Machine Learning").unwrap(),
            embedder.embed("machine learning").unwrap()
        );
    }

    #[test]
    fn test_hash_embedder_overlap_scores_higher() {
        let embedder = HashEmbedder::new(384);
        let query = embedder.embed("python machine learning engineer").unwrap();
        let close = embedder
            .embed("machine learning engineer skilled in python and pytorch")
            .unwrap();
        let far = embedder
            .embed("network administrator with cisco routers")
            .unwrap();

        assert!(
            cosine_similarity(&query, &close).unwrap() > cosine_similarity(&query, &far).unwrap()
        );
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = HashEmbedder::new(32);
        let texts = vec!["React".to_string(), "Go and Redis".to_string()];
        let batch = embedder.embed_batch(&texts).unwrap();
        assert_eq!(batch[1], embedder.embed("Go and Redis").unwrap());
    }

    #[test]
    fn test_ollama_dimension() {
        let client = OllamaEmbedder::new("http://localhost:11434", "nomic-embed-text").unwrap();
        assert_eq!(client.dimension(), 768);

        let client = OllamaEmbedder::new("http://localhost:11434", "mxbai-embed-large").unwrap();
        assert_eq!(client.dimension(), 1024);
    }

    #[test]
    fn test_factory_uses_config() {
        let config = EmbeddingConfig {
            dimension: 48,
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.dimension(), 48);
        assert_eq!(embedder.model_name(), "hash-48");
    }
}
