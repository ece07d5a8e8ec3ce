// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic hash-seeded embeddings
//!
//! No model, no network: the vector is derived from a SHA-256 of the input
//! text. Identical text always embeds identically, which is exactly what
//! idempotent re-upload and the test suite need. Not semantically
//! meaningful; used for offline operation and deterministic tests.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{EmbedError, Embedding, EmbeddingProvider};

pub struct HashedEmbeddingProvider {
    model: String,
    dimension: usize,
}

impl HashedEmbeddingProvider {
    pub fn new(model: String, dimension: usize) -> Self {
        Self { model, dimension }
    }

    fn generate(&self, text: &str) -> Embedding {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        // Expand the 32-byte digest across the configured dimension,
        // mixing in the position so long vectors are not periodic
        let mut data = Vec::with_capacity(self.dimension);
        let mut seed = u64::from_le_bytes(hash[..8].try_into().unwrap());
        for i in 0..self.dimension {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407)
                ^ (hash[i % hash.len()] as u64);
            let value = (seed as f64 / u64::MAX as f64) * 2.0 - 1.0;
            data.push(value as f32);
        }

        let mut embedding = Embedding::new(data);
        embedding.normalize();
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        if text.is_empty() {
            return Err(EmbedError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }
        Ok(self.generate(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
