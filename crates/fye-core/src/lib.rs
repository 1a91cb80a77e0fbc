//! FYE Core - Domain models, errors, and shared configuration
//!
//! This crate defines the core abstractions used throughout the fye system:
//! - Resume records searched by the pipeline
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, DataConfig, EmbeddingConfig, EmbeddingProvider, LoggingConfig,
    SearchConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for fye operations
#[derive(Error, Debug)]
pub enum FyeError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Corpus is empty")]
    EmptyCorpus,

    #[error("Index {index} out of range for corpus of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FyeError>;

// ============================================================================
// Resume Records
// ============================================================================

/// A single (synthetic) resume
///
/// Records are immutable once created. Within a corpus a resume is identified
/// by its position plus the externally assigned `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    /// Externally assigned identifier
    pub id: u32,

    /// Candidate display name
    pub name: String,

    /// Current job title
    pub job_title: String,

    /// Years of professional experience
    pub years_experience: u32,

    /// Skills, most relevant first
    pub skills: Vec<String>,

    /// Experience bullet points
    pub experience: Vec<String>,

    /// Highest education
    pub education: String,

    /// Free text that gets embedded and searched
    pub resume_text: String,
}

impl Resume {
    /// Create a resume with only the required identity fields
    pub fn new(id: u32, name: impl Into<String>, resume_text: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            job_title: String::new(),
            years_experience: 0,
            skills: Vec::new(),
            experience: Vec::new(),
            education: String::new(),
            resume_text: resume_text.into(),
        }
    }

    /// Set job title
    pub fn with_job_title(mut self, job_title: impl Into<String>) -> Self {
        self.job_title = job_title.into();
        self
    }

    /// Set years of experience
    pub fn with_years_experience(mut self, years: u32) -> Self {
        self.years_experience = years;
        self
    }

    /// Set skills
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Text used for embedding
    pub fn searchable_text(&self) -> &str {
        &self.resume_text
    }

    /// The first `n` skills
    pub fn top_skills(&self, n: usize) -> &[String] {
        &self.skills[..n.min(self.skills.len())]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_builder() {
        let resume = Resume::new(7, "Candidate 7", "Rust engineer")
            .with_job_title("Backend Developer")
            .with_years_experience(4)
            .with_skills(["Rust", "Go", "PostgreSQL", "Docker"]);

        assert_eq!(resume.id, 7);
        assert_eq!(resume.job_title, "Backend Developer");
        assert_eq!(resume.searchable_text(), "Rust engineer");
        assert_eq!(resume.top_skills(3), &["Rust", "Go", "PostgreSQL"]);
    }

    #[test]
    fn test_top_skills_shorter_than_requested() {
        let resume = Resume::new(1, "Candidate 1", "").with_skills(["Python"]);
        assert_eq!(resume.top_skills(3).len(), 1);
    }

    #[test]
    fn test_resume_json_field_names() {
        let json = serde_json::json!({
            "id": 3,
            "name": "Candidate 3",
            "job_title": "Data Scientist",
            "years_experience": 9,
            "skills": ["Python", "PyTorch"],
            "experience": ["Implemented machine learning models for predictive analytics"],
            "education": "PhD in Machine Learning",
            "resume_text": "Name: Candidate 3"
        });

        let resume: Resume = serde_json::from_value(json).unwrap();
        assert_eq!(resume.years_experience, 9);
        assert_eq!(resume.skills[1], "PyTorch");
    }

    #[test]
    fn test_error_display() {
        let err = FyeError::DimensionMismatch {
            expected: 384,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 3");

        let err = FyeError::IndexOutOfRange { index: 5, size: 2 };
        assert_eq!(err.to_string(), "Index 5 out of range for corpus of size 2");
    }
}
