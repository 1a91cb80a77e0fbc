//! On-disk embedding cache
//!
//! Stores resumes together with their embeddings and the model that
//! produced them, so a restart can skip re-embedding the dataset.

use fye_core::{FyeError, Result, Resume};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Serialized form of an embedded corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingCache {
    /// Model that produced the embeddings
    pub model: String,

    /// Embedding dimension
    pub dimension: usize,

    pub resumes: Vec<Resume>,

    /// One embedding per resume, same order
    pub embeddings: Vec<Vec<f32>>,
}

impl EmbeddingCache {
    /// Create a cache entry
    pub fn new(
        model: impl Into<String>,
        dimension: usize,
        resumes: Vec<Resume>,
        embeddings: Vec<Vec<f32>>,
    ) -> Self {
        Self {
            model: model.into(),
            dimension,
            resumes,
            embeddings,
        }
    }

    /// Write the cache as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                FyeError::StorageError(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let file = File::create(path).map_err(|e| {
            FyeError::StorageError(format!("Failed to create {}: {e}", path.display()))
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|e| {
            FyeError::StorageError(format!("Failed to write {}: {e}", path.display()))
        })?;
        writer.flush().map_err(|e| {
            FyeError::StorageError(format!("Failed to flush {}: {e}", path.display()))
        })?;

        tracing::info!(
            "Saved embeddings for {} resumes to {}",
            self.resumes.len(),
            path.display()
        );
        Ok(())
    }

    /// Read and validate a cache file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            FyeError::StorageError(format!("Failed to open {}: {e}", path.display()))
        })?;
        let cache: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            FyeError::StorageError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        cache.validate()?;
        tracing::info!(
            "Loaded embeddings for {} resumes from {}",
            cache.resumes.len(),
            path.display()
        );
        Ok(cache)
    }

    /// Whether this cache was produced by the given model and dimension
    pub fn matches(&self, model: &str, dimension: usize) -> bool {
        self.model == model && self.dimension == dimension
    }

    /// Split into records and vectors, ready for `VectorStore::load`
    pub fn into_parts(self) -> (Vec<Resume>, Vec<Vec<f32>>) {
        (self.resumes, self.embeddings)
    }

    fn validate(&self) -> Result<()> {
        if self.resumes.len() != self.embeddings.len() {
            return Err(FyeError::DimensionMismatch {
                expected: self.resumes.len(),
                actual: self.embeddings.len(),
            });
        }
        if let Some(bad) = self.embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(FyeError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        Ok(())
    }
}
