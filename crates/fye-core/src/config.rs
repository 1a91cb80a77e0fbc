//! FYE Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for local demos.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset and cache locations
    pub data: DataConfig,

    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,

    /// Search defaults
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Data
        if let Ok(path) = std::env::var("FYE_RESUMES_PATH") {
            config.data.resumes_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("FYE_EMBEDDINGS_PATH") {
            config.data.embeddings_path = PathBuf::from(path);
        }
        if let Ok(size) = std::env::var("FYE_DATASET_SIZE") {
            config.data.dataset_size = parse_var("FYE_DATASET_SIZE", size)?;
        }
        if let Ok(seed) = std::env::var("FYE_SEED") {
            config.data.seed = parse_var("FYE_SEED", seed)?;
        }

        // Embedding
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider.parse()?;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(dimension) = std::env::var("EMBEDDING_DIMENSION") {
            config.embedding.dimension = parse_var("EMBEDDING_DIMENSION", dimension)?;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.embedding.ollama_url = url;
        }

        // Search
        if let Ok(top_k) = std::env::var("FYE_TOP_K") {
            config.search.default_top_k = parse_var("FYE_TOP_K", top_k)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.data.resumes_path != defaults.data.resumes_path {
            self.data.resumes_path = env_config.data.resumes_path;
        }
        if env_config.data.embeddings_path != defaults.data.embeddings_path {
            self.data.embeddings_path = env_config.data.embeddings_path;
        }
        if env_config.data.dataset_size != defaults.data.dataset_size {
            self.data.dataset_size = env_config.data.dataset_size;
        }
        if env_config.data.seed != defaults.data.seed {
            self.data.seed = env_config.data.seed;
        }
        if env_config.embedding.provider != defaults.embedding.provider {
            self.embedding.provider = env_config.embedding.provider;
        }
        if env_config.embedding.model != defaults.embedding.model {
            self.embedding.model = env_config.embedding.model;
        }
        if env_config.embedding.dimension != defaults.embedding.dimension {
            self.embedding.dimension = env_config.embedding.dimension;
        }
        if env_config.embedding.ollama_url != defaults.embedding.ollama_url {
            self.embedding.ollama_url = env_config.embedding.ollama_url;
        }
        if env_config.search.default_top_k != defaults.search.default_top_k {
            self.search.default_top_k = env_config.search.default_top_k;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }

        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Dataset and cache file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Synthetic resume dataset (JSON array)
    pub resumes_path: PathBuf,

    /// Cached embeddings for the dataset
    pub embeddings_path: PathBuf,

    /// Number of resumes to generate when the dataset is missing
    pub dataset_size: usize,

    /// RNG seed for dataset generation
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            resumes_path: PathBuf::from("resumes.json"),
            embeddings_path: PathBuf::from("embeddings.json"),
            dataset_size: 100,
            seed: 42,
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider to use
    pub provider: EmbeddingProvider,

    /// Embedding model name
    pub model: String,

    /// Vector dimension (must match the model)
    pub dimension: usize,

    /// Ollama server URL
    pub ollama_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            model: "all-minilm".to_string(),
            dimension: 384,
            ollama_url: "http://localhost:11434".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic local feature hashing
    Hash,
    Ollama,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "EMBEDDING_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of results when the caller does not specify one
    pub default_top_k: usize,

    /// Upper bound on requested results
    pub max_top_k: usize,

    /// Bin count for the similarity histogram
    pub histogram_bins: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_top_k: 20,
            histogram_bins: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for crate::FyeError {
    fn from(err: ConfigError) -> Self {
        crate::FyeError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.search.default_top_k, 5);
        assert_eq!(config.search.max_top_k, 20);
        assert_eq!(config.embedding.dimension, 384);
        assert_eq!(config.data.resumes_path, PathBuf::from("resumes.json"));
    }

    #[test]
    fn test_embedding_provider_parse() {
        assert_eq!(
            "hash".parse::<EmbeddingProvider>().unwrap(),
            EmbeddingProvider::Hash
        );
        assert_eq!(
            "Ollama".parse::<EmbeddingProvider>().unwrap(),
            EmbeddingProvider::Ollama
        );
        assert!("openai".parse::<EmbeddingProvider>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[embedding]\nprovider = \"ollama\"\ndimension = 768\n\n[search]\ndefault_top_k = 10"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.embedding.provider, EmbeddingProvider::Ollama);
        assert_eq!(config.embedding.dimension, 768);
        assert_eq!(config.embedding.model, "all-minilm");
        assert_eq!(config.search.default_top_k, 10);
        assert_eq!(config.search.histogram_bins, 30);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AppConfig::from_file("/nonexistent/fye.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\ndefault_top_k = \"five\"").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
