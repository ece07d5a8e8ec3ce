// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the document Q&A node
//!
//! All settings are environment-driven with sensible defaults so the node
//! can start with nothing but an LLM endpoint configured.

use std::env;

/// Top-level configuration for the RAG pipeline
#[derive(Debug, Clone)]
pub struct RagNodeConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Default number of chunks retrieved per query
    pub top_k: usize,
    /// Total retrieved-context length (chars) at or above which the
    /// answer prompt switches from hybrid to strict mode
    pub strict_context_threshold: usize,
    /// Minimum similarity for a chunk to be cited (0.0 keeps everything)
    pub min_similarity: f32,
    /// Provider-specific configuration
    pub providers: ProviderConfig,
    /// Request timeout for all external provider calls in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum retries for transient provider failures
    pub max_retries: u32,
    /// HTTP API listen port
    pub api_port: u16,
}

/// External provider endpoints and model identifiers
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Embedding model identifier
    pub embedding_model: String,
    /// Embedding vector dimension
    pub embedding_dimension: usize,
    /// OpenAI-compatible embeddings endpoint (None = deterministic local embedder)
    pub embedding_api_url: Option<String>,
    /// API key for the embedding endpoint
    pub embedding_api_key: Option<String>,
    /// LLM model identifier
    pub llm_model: String,
    /// OpenAI-compatible chat completions endpoint
    pub llm_api_url: Option<String>,
    /// API key for the LLM endpoint
    pub llm_api_key: Option<String>,
    /// External vector database endpoint (None = in-memory store)
    pub vector_db_url: Option<String>,
}

impl RagNodeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            chunk_size: env::var("CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            chunk_overlap: env::var("CHUNK_OVERLAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            top_k: env::var("TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            strict_context_threshold: env::var("STRICT_CONTEXT_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            min_similarity: env::var("MIN_SIMILARITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            providers: ProviderConfig {
                embedding_model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "all-MiniLM-L6-v2".to_string()),
                embedding_dimension: env::var("EMBEDDING_DIMENSION")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(384),
                embedding_api_url: env::var("EMBEDDING_API_URL").ok().filter(|v| !v.is_empty()),
                embedding_api_key: env::var("EMBEDDING_API_KEY").ok().filter(|v| !v.is_empty()),
                llm_model: env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "tiny-vicuna-1b".to_string()),
                llm_api_url: env::var("LLM_API_URL").ok().filter(|v| !v.is_empty()),
                llm_api_key: env::var("LLM_API_KEY").ok().filter(|v| !v.is_empty()),
                vector_db_url: env::var("VECTOR_DB_URL").ok().filter(|v| !v.is_empty()),
            },
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
            max_retries: env::var("PROVIDER_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Validate the configuration before startup
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("Chunk size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if self.top_k == 0 {
            return Err("Top-k must be greater than 0".to_string());
        }
        if self.providers.embedding_dimension == 0 {
            return Err("Embedding dimension must be greater than 0".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err("Minimum similarity must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}

impl Default for RagNodeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            strict_context_threshold: 500,
            min_similarity: 0.0,
            providers: ProviderConfig {
                embedding_model: "all-MiniLM-L6-v2".to_string(),
                embedding_dimension: 384,
                embedding_api_url: None,
                embedding_api_key: None,
                llm_model: "tiny-vicuna-1b".to_string(),
                llm_api_url: None,
                llm_api_key: None,
                vector_db_url: None,
            },
            request_timeout_ms: 30_000,
            max_retries: 2,
            api_port: 8080,
        }
    }
}
