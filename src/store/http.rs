// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! External vector database adapter
//!
//! JSON-over-HTTP client for a vector database exposing batch upsert,
//! search and delete. Chunk records travel as vector metadata so search
//! results come back self-describing; the database owns persistence and
//! index internals.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::chunker::Chunk;

use super::{sort_results, ChunkRecord, ScoredChunk, StoreError, VectorStore};

pub struct HttpVectorStore {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpsertRequest<'a> {
    document_id: &'a str,
    vectors: Vec<VectorPayload>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorPayload {
    id: String,
    vector: Vec<f32>,
    metadata: Chunk,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    vector: &'a [f32],
    k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    score: f32,
    metadata: Chunk,
}

impl HttpVectorStore {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, StoreError> {
        url::Url::parse(base_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid vector DB URL: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn upsert_document(
        &self,
        document_id: &str,
        records: Vec<ChunkRecord>,
    ) -> Result<(), StoreError> {
        // Single batch request per document keeps the write atomic on the
        // database side: it either commits the whole set or rejects it
        let payload = BatchUpsertRequest {
            document_id,
            vectors: records
                .into_iter()
                .map(|record| VectorPayload {
                    id: record.chunk.id.clone(),
                    vector: record.vector,
                    metadata: record.chunk,
                })
                .collect(),
        };

        let url = format!("{}/api/v1/vectors/batch", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.check_status(response).await?;

        debug!("Upserted document {} to vector DB", document_id);
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let url = format!("{}/api/v1/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SearchRequest {
                vector: query,
                k: top_k,
            })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = self.check_status(response).await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Malformed response: {}", e)))?;

        let mut results: Vec<ScoredChunk> = parsed
            .results
            .into_iter()
            .map(|hit| ScoredChunk {
                chunk: hit.metadata,
                score: hit.score.clamp(0.0, 1.0),
            })
            .collect();

        // Re-sort locally so the deterministic tie-break holds regardless
        // of the database's internal ordering
        sort_results(&mut results);
        results.truncate(top_k);
        Ok(results)
    }

    async fn remove_document(&self, document_id: &str) -> Result<(), StoreError> {
        let url = format!("{}/api/v1/documents/{}", self.base_url, document_id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn chunk_count(&self) -> Result<usize, StoreError> {
        #[derive(Deserialize)]
        struct CountResponse {
            count: usize,
        }

        let url = format!("{}/api/v1/vectors/count", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = self.check_status(response).await?;

        let parsed: CountResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Malformed response: {}", e)))?;
        Ok(parsed.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            HttpVectorStore::new("://nope", 1000),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_base_url_normalized() {
        let store = HttpVectorStore::new("http://localhost:7700/", 1000).unwrap();
        assert_eq!(store.base_url, "http://localhost:7700");
    }
}
