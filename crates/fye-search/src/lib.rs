//! FYE Search - Semantic resume search pipeline
//!
//! This crate wires the pieces of a search request together:
//! - embed the query with the injected embedder
//! - rank the corpus by cosine similarity
//! - project corpus and query jointly into 2D
//! - assemble a renderable result set for the presentation layer
//!
//! The corpus is loaded once and only read afterwards, so one engine can
//! serve concurrent searches through a shared reference.
//!
//! Author: hephaex@gmail.com

use fye_core::{AppConfig, FyeError, Result, Resume, SearchConfig};
use fye_vector::{fit_2d, fit_2d_with_query, rank, score_all};
use fye_vector::{Embedder, EmbeddingCache, Projection2D, RankedResult, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

pub mod assembler;
pub mod dataset;
pub mod distribution;

pub use assembler::{
    mean_similarity, AxisInfo, HoverInfo, MarkerStyle, QueryPoint, RenderPoint,
    RenderableResultSet, ResultAssembler,
};
pub use dataset::{generate_dataset, load_dataset, save_dataset, DatasetGenerator};
pub use distribution::{HistogramBin, ScoreDistribution, DEFAULT_BINS};

// ============================================================================
// Responses
// ============================================================================

/// Ranked answer to a text query
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse<'a> {
    /// Original query text
    pub query: String,

    /// Top matches, best first
    pub results: Vec<RankedResult<'a>>,

    /// Mean similarity of `results`
    pub mean_similarity: Option<f32>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

// ============================================================================
// Search Engine
// ============================================================================

/// Semantic search engine over an in-memory resume corpus
pub struct SearchEngine {
    /// Loaded corpus
    store: VectorStore,

    /// Query and corpus embedder
    embedder: Arc<dyn Embedder>,

    /// Search defaults
    config: SearchConfig,
}

impl SearchEngine {
    /// Create an engine with an empty store
    pub fn new(embedder: Arc<dyn Embedder>, config: SearchConfig) -> Self {
        Self {
            store: VectorStore::new(),
            embedder,
            config,
        }
    }

    /// Load the cached corpus, regenerating whatever is missing
    ///
    /// A cache produced by a different model or dimension counts as missing.
    /// Without a cache, resumes come from `resumes_path` (generated and saved
    /// first when that file is absent), get embedded, and the cache is
    /// written back.
    pub fn prepare(config: &AppConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let mut engine = Self::new(embedder, config.search.clone());
        let data = &config.data;

        if data.embeddings_path.exists() {
            let cache = EmbeddingCache::load(&data.embeddings_path)?;
            if cache.matches(engine.embedder.model_name(), engine.embedder.dimension()) {
                tracing::info!("Embeddings already exist, loading cache");
                let (resumes, embeddings) = cache.into_parts();
                engine.store.load(resumes, embeddings)?;
                return Ok(engine);
            }
            tracing::warn!(
                "Cached embeddings come from {} ({} dims), regenerating",
                cache.model,
                cache.dimension
            );
        }

        let resumes = if data.resumes_path.exists() {
            load_dataset(&data.resumes_path)?
        } else {
            tracing::info!("Generating {} synthetic resumes", data.dataset_size);
            let resumes = generate_dataset(data.dataset_size, data.seed);
            save_dataset(&resumes, &data.resumes_path)?;
            resumes
        };

        let embeddings = engine.index(resumes)?;
        let cache = EmbeddingCache::new(
            engine.embedder.model_name(),
            engine.embedder.dimension(),
            engine.records().to_vec(),
            embeddings,
        );
        cache.save(&data.embeddings_path)?;

        Ok(engine)
    }

    /// Embed resumes and load them as the corpus
    ///
    /// Returns the embeddings so callers can persist them.
    pub fn index(&mut self, resumes: Vec<Resume>) -> Result<Vec<Vec<f32>>> {
        tracing::info!("Generating embeddings for {} resumes", resumes.len());
        let texts: Vec<String> = resumes
            .iter()
            .map(|r| r.searchable_text().to_string())
            .collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        self.store.load(resumes, embeddings.clone())?;
        Ok(embeddings)
    }

    /// Load precomputed records and vectors
    pub fn load(&mut self, resumes: Vec<Resume>, embeddings: Vec<Vec<f32>>) -> Result<()> {
        let expected = self.embedder.dimension();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(FyeError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }
        self.store.load(resumes, embeddings)?;
        Ok(())
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Records of the loaded corpus (empty when unloaded)
    pub fn records(&self) -> &[Resume] {
        self.store.corpus().map(|c| c.records()).unwrap_or(&[])
    }

    /// Clamp a requested result count into `1..=max_top_k`
    pub fn effective_top_k(&self, top_k: Option<usize>) -> usize {
        top_k
            .unwrap_or(self.config.default_top_k)
            .clamp(1, self.config.max_top_k.max(1))
    }

    /// Rank the corpus against a text query
    pub fn search(&self, query: &str, top_k: Option<usize>) -> Result<SearchResponse<'_>> {
        let start_time = Instant::now();
        tracing::info!("Search started");

        let corpus = self.store.corpus()?;
        let query_vector = self.embedder.embed(query)?;
        let results = rank(corpus, &query_vector, self.effective_top_k(top_k))?;
        tracing::debug!("Ranking returned {} results", results.len());

        Ok(SearchResponse {
            query: query.to_string(),
            mean_similarity: mean_similarity(&results),
            results,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Rank, then project corpus and query jointly and assemble the plot data
    pub fn visualize(&self, query: &str, top_k: Option<usize>) -> Result<RenderableResultSet> {
        let corpus = self.store.corpus()?;
        let query_vector = self.embedder.embed(query)?;
        let ranking = rank(corpus, &query_vector, self.effective_top_k(top_k))?;

        let (projection, _) = fit_2d_with_query(corpus.embeddings(), &query_vector)?;
        let top_indices: Vec<usize> = ranking.iter().map(|r| r.index).collect();

        ResultAssembler::new()
            .with_query_label(query)
            .assemble(corpus, &ranking, &projection, &top_indices)
    }

    /// Project the corpus on its own, without a query
    pub fn visualize_corpus(&self) -> Result<RenderableResultSet> {
        let corpus = self.store.corpus()?;
        let projection = self.project_corpus()?;
        ResultAssembler::new().assemble(corpus, &[], &projection, &[])
    }

    /// Corpus-only projection
    pub fn project_corpus(&self) -> Result<Projection2D> {
        fit_2d(self.store.corpus()?.embeddings())
    }

    /// Similarity of every resume to the query, with a histogram
    pub fn similarity_distribution(&self, query: &str) -> Result<ScoreDistribution> {
        let corpus = self.store.corpus()?;
        let query_vector = self.embedder.embed(query)?;
        let scores = score_all(corpus, &query_vector)?;
        ScoreDistribution::from_scores(scores, self.config.histogram_bins)
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("store", &self.store)
            .field("embedder", &self.embedder.model_name())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
