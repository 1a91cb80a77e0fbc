//! In-memory vector store
//!
//! Holds the corpus embedding matrix alongside the parallel resume records.
//! The corpus is immutable once loaded, so a loaded store can be shared
//! read-only between concurrent searches.
//!
//! Author: hephaex@gmail.com

use fye_core::{FyeError, Result, Resume};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Resumes with their embeddings, indexed in insertion order
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<Resume>,
    embeddings: Array2<f32>,
}

impl Corpus {
    /// Build a corpus, validating count and dimensionality
    pub fn new(records: Vec<Resume>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if records.len() != vectors.len() {
            return Err(FyeError::DimensionMismatch {
                expected: records.len(),
                actual: vectors.len(),
            });
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(FyeError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let flat: Vec<f32> = vectors.into_iter().flatten().collect();
        let embeddings = Array2::from_shape_vec((records.len(), dimension), flat)
            .map_err(|e| FyeError::Other(e.into()))?;

        Ok(Self {
            records,
            embeddings,
        })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embedding dimensionality (0 for an empty corpus)
    pub fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }

    pub fn records(&self) -> &[Resume] {
        &self.records
    }

    /// The `N x D` embedding matrix
    pub fn embeddings(&self) -> ArrayView2<'_, f32> {
        self.embeddings.view()
    }

    /// Record and embedding at `index`
    pub fn get(&self, index: usize) -> Result<(&Resume, ArrayView1<'_, f32>)> {
        let record = self.records.get(index).ok_or(FyeError::IndexOutOfRange {
            index,
            size: self.len(),
        })?;
        Ok((record, self.embeddings.row(index)))
    }
}

/// Owner of the loaded corpus
#[derive(Debug, Default)]
pub struct VectorStore {
    corpus: Option<Corpus>,
}

impl VectorStore {
    /// Create an empty, unloaded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records and their vectors, replacing any previous corpus
    ///
    /// On error the previously loaded corpus (if any) is left untouched.
    pub fn load(&mut self, records: Vec<Resume>, vectors: Vec<Vec<f32>>) -> Result<&Corpus> {
        let corpus = Corpus::new(records, vectors)?;
        tracing::info!(
            "Loaded corpus with {} records (dimension {})",
            corpus.len(),
            corpus.dimension()
        );
        Ok(self.corpus.insert(corpus))
    }

    pub fn is_loaded(&self) -> bool {
        self.corpus.is_some()
    }

    /// Number of records held, 0 when unloaded
    pub fn size(&self) -> usize {
        self.corpus.as_ref().map_or(0, Corpus::len)
    }

    /// Embedding dimensionality, `None` when unloaded
    pub fn dimension(&self) -> Option<usize> {
        self.corpus.as_ref().map(Corpus::dimension)
    }

    /// Record and embedding at `index`
    pub fn get(&self, index: usize) -> Result<(&Resume, ArrayView1<'_, f32>)> {
        match &self.corpus {
            Some(corpus) => corpus.get(index),
            None => Err(FyeError::IndexOutOfRange { index, size: 0 }),
        }
    }

    /// The loaded corpus
    pub fn corpus(&self) -> Result<&Corpus> {
        self.corpus.as_ref().ok_or(FyeError::EmptyCorpus)
    }

    /// Drop the loaded corpus
    pub fn unload(&mut self) {
        self.corpus = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resumes(n: u32) -> Vec<Resume> {
        (1..=n)
            .map(|i| Resume::new(i, format!("Candidate {i}"), format!("text {i}")))
            .collect()
    }

    #[test]
    fn test_unloaded_store() {
        let store = VectorStore::new();
        assert!(!store.is_loaded());
        assert_eq!(store.size(), 0);
        assert_eq!(store.dimension(), None);
        assert!(matches!(
            store.get(0),
            Err(FyeError::IndexOutOfRange { index: 0, size: 0 })
        ));
        assert!(matches!(store.corpus(), Err(FyeError::EmptyCorpus)));
    }

    #[test]
    fn test_load_and_get() {
        let mut store = VectorStore::new();
        let corpus = store
            .load(resumes(3), vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]])
            .unwrap();
        assert_eq!(corpus.len(), 3);

        assert!(store.is_loaded());
        assert_eq!(store.size(), 3);
        assert_eq!(store.dimension(), Some(2));

        let (record, vector) = store.get(2).unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(vector.to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut store = VectorStore::new();
        store.load(resumes(2), vec![vec![1.0], vec![2.0]]).unwrap();

        assert!(matches!(
            store.get(2),
            Err(FyeError::IndexOutOfRange { index: 2, size: 2 })
        ));
    }

    #[test]
    fn test_load_rejects_ragged_vectors() {
        let mut store = VectorStore::new();
        let err = store
            .load(resumes(3), vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0], vec![1.0, 1.0]])
            .unwrap_err();

        assert!(matches!(
            err,
            FyeError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_load_rejects_count_mismatch() {
        let mut store = VectorStore::new();
        let err = store.load(resumes(2), vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, FyeError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_failed_load_keeps_previous_corpus() {
        let mut store = VectorStore::new();
        store.load(resumes(2), vec![vec![1.0], vec![2.0]]).unwrap();

        assert!(store.load(resumes(1), vec![]).is_err());
        assert_eq!(store.size(), 2);
        assert_eq!(store.get(1).unwrap().0.id, 2);
    }

    #[test]
    fn test_unload() {
        let mut store = VectorStore::new();
        store.load(resumes(1), vec![vec![0.5]]).unwrap();
        store.unload();
        assert!(!store.is_loaded());
        assert_eq!(store.size(), 0);
    }
}
