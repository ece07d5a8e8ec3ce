// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// In-memory vector store with brute-force cosine search.
// Suitable for single-node deployments and tests; an external vector
// database takes over via HttpVectorStore when configured.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::embeddings::Embedding;

use super::{sort_results, ChunkRecord, ScoredChunk, StoreError, VectorStore};

pub struct MemoryVectorStore {
    dimension: usize,
    // document id -> that document's chunk records, in sequence order
    documents: RwLock<HashMap<String, Vec<ChunkRecord>>>,
}

impl MemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            documents: RwLock::new(HashMap::new()),
        }
    }

    fn validate(&self, records: &[ChunkRecord]) -> Result<(), StoreError> {
        for record in records {
            if record.vector.len() != self.dimension {
                return Err(StoreError::InvalidVector {
                    chunk_id: record.chunk.id.clone(),
                    reason: format!(
                        "expected {} dimensions, got {}",
                        self.dimension,
                        record.vector.len()
                    ),
                });
            }
            if record.vector.iter().any(|v| !v.is_finite()) {
                return Err(StoreError::InvalidVector {
                    chunk_id: record.chunk.id.clone(),
                    reason: "contains NaN or Infinity".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_document(
        &self,
        document_id: &str,
        records: Vec<ChunkRecord>,
    ) -> Result<(), StoreError> {
        // Validate the whole batch before touching state so a bad record
        // can never leave a partial chunk set behind
        self.validate(&records)?;

        let count = records.len();
        let mut documents = self.documents.write().await;
        documents.insert(document_id.to_string(), records);
        info!("Stored {} chunks for document {}", count, document_id);
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        if query.len() != self.dimension {
            return Err(StoreError::InvalidVector {
                chunk_id: "query".to_string(),
                reason: format!(
                    "expected {} dimensions, got {}",
                    self.dimension,
                    query.len()
                ),
            });
        }

        let query_embedding = Embedding::new(query.to_vec());
        let documents = self.documents.read().await;

        let mut results: Vec<ScoredChunk> = documents
            .values()
            .flatten()
            .map(|record| {
                let score = query_embedding
                    .cosine_similarity(&Embedding::new(record.vector.clone()))
                    .clamp(0.0, 1.0);
                ScoredChunk {
                    chunk: record.chunk.clone(),
                    score,
                }
            })
            .collect();

        sort_results(&mut results);
        results.truncate(top_k);

        debug!("Search returned {} of max {} chunks", results.len(), top_k);
        Ok(results)
    }

    async fn remove_document(&self, document_id: &str) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        if documents.remove(document_id).is_some() {
            info!("Removed document {}", document_id);
        }
        Ok(())
    }

    async fn chunk_count(&self) -> Result<usize, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.values().map(|records| records.len()).sum())
    }
}
