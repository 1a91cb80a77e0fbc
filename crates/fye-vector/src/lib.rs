//! FYE Vector - In-memory vector search and projection
//!
//! Holds the embedded resume corpus, ranks it by cosine similarity
//! against a query vector, and fits 2D projections for visualization.

pub mod cache;
pub mod embedding;
pub mod projection;
pub mod similarity;
pub mod store;

pub use cache::EmbeddingCache;
pub use embedding::{create_embedder, Embedder, HashEmbedder, OllamaEmbedder};
pub use projection::{fit_2d, fit_2d_with_query, Projection2D};
pub use similarity::{cosine_similarity, rank, score_all, RankedResult};
pub use store::{Corpus, VectorStore};
