// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible embedding API adapter
//!
//! Wraps a remote `/embeddings` endpoint. Any provider speaking the OpenAI
//! wire shape works; only the base URL, API key and model id differ.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{EmbedError, Embedding, EmbeddingProvider};

pub struct HttpEmbeddingProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    timeout_ms: u64,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// OpenAI-style endpoints wrap errors as {"error": {"message": ...}};
// fall back to the raw body for anything else
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string())
}

impl HttpEmbeddingProvider {
    /// Create a provider against an OpenAI-compatible base URL
    /// (e.g. `https://api.openai.com/v1`)
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        dimension: usize,
        timeout_ms: u64,
    ) -> Result<Self, EmbedError> {
        url::Url::parse(base_url)
            .map_err(|e| EmbedError::Unavailable(format!("Invalid embedding API URL: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| EmbedError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            dimension,
            timeout_ms,
        })
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            input,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EmbedError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                EmbedError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EmbedError::ApiError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Unavailable(format!("Malformed response: {}", e)))?;

        if parsed.data.len() != input.len() {
            return Err(EmbedError::Unavailable(format!(
                "Expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }

        // The API may return items out of order; restore input order by index
        let mut items = parsed.data;
        items.sort_by_key(|item| item.index);

        let mut embeddings = Vec::with_capacity(items.len());
        for item in items {
            if item.embedding.len() != self.dimension {
                return Err(EmbedError::Unavailable(format!(
                    "Dimension mismatch: expected {}, got {}",
                    self.dimension,
                    item.embedding.len()
                )));
            }
            embeddings.push(Embedding::new(item.embedding));
        }

        debug!("Embedded {} texts via {}", embeddings.len(), self.model);
        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        if text.is_empty() {
            return Err(EmbedError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }
        let mut result = self.request(&[text.to_string()]).await?;
        Ok(result.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbedError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }
        self.request(texts).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
