// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding generation
//!
//! The [`EmbeddingProvider`] trait is the seam between the retrieval engine
//! and whatever produces vectors: an OpenAI-compatible HTTP endpoint in
//! production, or the deterministic hashed embedder for offline use and
//! tests. Providers are swappable without touching the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod hashed;
pub mod http;

pub use hashed::HashedEmbeddingProvider;
pub use http::HttpEmbeddingProvider;

/// A fixed-dimension vector representing the semantic content of a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    data: Vec<f32>,
}

impl Embedding {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn magnitude(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Cosine similarity against another embedding
    ///
    /// Mismatched dimensions and zero vectors score 0.0 rather than
    /// erroring, so a single bad vector cannot poison a whole search.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.dimension() != other.dimension() {
            return 0.0;
        }

        let dot_product: f32 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum();

        let magnitude_self = self.magnitude();
        let magnitude_other = other.magnitude();

        if magnitude_self == 0.0 || magnitude_other == 0.0 {
            0.0
        } else {
            dot_product / (magnitude_self * magnitude_other)
        }
    }

    /// Scale to unit length in place
    pub fn normalize(&mut self) {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            for value in &mut self.data {
                *value /= magnitude;
            }
        }
    }

    /// True if every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

/// Errors from embedding providers
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Provider rejected the input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP error from the embedding API
    #[error("Embedding API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Request timed out
    #[error("Embedding request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Provider unreachable or misconfigured
    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),
}

impl EmbedError {
    /// Transient failures worth a bounded retry
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbedError::Timeout { .. } | EmbedError::Unavailable(_) => true,
            EmbedError::ApiError { status, .. } => *status >= 500 || *status == 429,
            EmbedError::InvalidInput(_) => false,
        }
    }
}

/// Capability contract for embedding generation
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError>;

    /// Embed a batch of texts, preserving order
    ///
    /// The default implementation loops over [`embed`](Self::embed);
    /// providers with a batch wire format override this for write-path
    /// throughput.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Vector dimension this provider produces
    fn dimension(&self) -> usize;

    /// Model identifier for logging and responses
    fn model_id(&self) -> &str;
}
