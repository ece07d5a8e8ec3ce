// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the retrieval pipeline
//!
//! Validation failures are distinguished from provider outages so callers
//! can tell "bad input" from "could not search", and the retry policy never
//! touches validation errors.

use thiserror::Error;

use crate::chunker::ChunkError;
use crate::embeddings::EmbedError;
use crate::generation::GenerateError;
use crate::store::StoreError;

/// Errors surfaced by the retrieval engine
#[derive(Debug, Error)]
pub enum RagError {
    /// Document contained no text
    #[error("Document '{0}' is empty")]
    EmptyDocument(String),

    /// Chunk size / overlap configuration is inconsistent
    #[error("Invalid chunk config: size={chunk_size}, overlap={overlap}")]
    InvalidChunkConfig { chunk_size: usize, overlap: usize },

    /// Query failed validation before any external call
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Embedding provider call failed
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbedError),

    /// Vector store call failed
    #[error("Vector store unavailable: {0}")]
    VectorStoreUnavailable(#[from] StoreError),

    /// LLM call failed
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(#[from] GenerateError),
}

impl From<ChunkError> for RagError {
    fn from(err: ChunkError) -> Self {
        match err {
            ChunkError::EmptyDocument(id) => RagError::EmptyDocument(id),
            ChunkError::InvalidChunkConfig {
                chunk_size,
                overlap,
            } => RagError::InvalidChunkConfig {
                chunk_size,
                overlap,
            },
        }
    }
}

impl RagError {
    /// Stable code for logging and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            RagError::EmptyDocument(_) => "EMPTY_DOCUMENT",
            RagError::InvalidChunkConfig { .. } => "INVALID_CHUNK_CONFIG",
            RagError::InvalidQuery(_) => "INVALID_QUERY",
            RagError::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
            RagError::VectorStoreUnavailable(_) => "VECTOR_STORE_UNAVAILABLE",
            RagError::GenerationUnavailable(_) => "GENERATION_UNAVAILABLE",
        }
    }

    /// Input or configuration problem, rejected before any external call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RagError::EmptyDocument(_)
                | RagError::InvalidChunkConfig { .. }
                | RagError::InvalidQuery(_)
        )
    }
}
