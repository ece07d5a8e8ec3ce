// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector storage
//!
//! The [`VectorStore`] trait wraps whatever holds `(chunk, vector)` pairs:
//! the in-memory store for single-node deployments and tests, or an
//! external vector database over HTTP. Upserts are atomic per document so
//! a failed upload never leaves a partial chunk set queryable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunker::Chunk;

pub mod http;
pub mod memory;

pub use http::HttpVectorStore;
pub use memory::MemoryVectorStore;

/// A chunk together with its embedding vector, as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A retrieval hit: chunk plus similarity score in [0.0, 1.0]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Errors from vector store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Vector dimensions or values are unusable
    #[error("Invalid vector for chunk {chunk_id}: {reason}")]
    InvalidVector { chunk_id: String, reason: String },

    /// HTTP error from an external vector database
    #[error("Vector store API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Request timed out
    #[error("Vector store timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Store unreachable or misconfigured
    #[error("Vector store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Transient failures worth a bounded retry
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Timeout { .. } | StoreError::Unavailable(_) => true,
            StoreError::ApiError { status, .. } => *status >= 500 || *status == 429,
            StoreError::InvalidVector { .. } => false,
        }
    }
}

/// Capability contract for vector storage and nearest-neighbor search
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replace the stored chunk set for a document in one atomic operation
    ///
    /// Either every record becomes queryable or none do. Re-upserting the
    /// same document id replaces its previous chunk set wholesale.
    async fn upsert_document(
        &self,
        document_id: &str,
        records: Vec<ChunkRecord>,
    ) -> Result<(), StoreError>;

    /// Return the `top_k` most similar chunks, sorted by descending score;
    /// ties keep ascending `(document_id, index)` order
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Remove every chunk belonging to a document
    async fn remove_document(&self, document_id: &str) -> Result<(), StoreError>;

    /// Total number of stored chunks
    async fn chunk_count(&self) -> Result<usize, StoreError>;
}

/// Order results by descending score, breaking ties on ascending
/// `(document_id, index)` so equal-similarity output is deterministic
pub fn sort_results(results: &mut [ScoredChunk]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk.document_id.cmp(&b.chunk.document_id))
            .then_with(|| a.chunk.index.cmp(&b.chunk.index))
    });
}
