// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Answer generation
//!
//! The [`AnswerProvider`] trait wraps the LLM behind the same kind of seam
//! as embeddings and storage. The engine builds a [`Prompt`] from retrieved
//! context and the selected [`AnswerMode`]; the provider only turns a
//! prompt into text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod openai;
pub mod prompt;

pub use openai::OpenAiChatProvider;
pub use prompt::build_prompt;

/// How the model is allowed to use the retrieved context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerMode {
    /// Answer only from the supplied context; say so when it is not there
    Strict,
    /// Context is thin; the model may supplement with general knowledge
    Hybrid,
    /// Retrieval found nothing; generation is skipped entirely
    NoContext,
}

impl AnswerMode {
    /// Mode policy: pure function of total retrieved-context length
    ///
    /// Below the threshold the context is considered too thin to answer
    /// from alone (hybrid); at or above it the model is pinned to the
    /// documents (strict).
    pub fn for_context_length(context_chars: usize, strict_threshold: usize) -> Self {
        if context_chars < strict_threshold {
            AnswerMode::Hybrid
        } else {
            AnswerMode::Strict
        }
    }
}

/// An assembled prompt ready for the LLM
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub mode: AnswerMode,
}

/// Errors from answer generation
#[derive(Debug, Error)]
pub enum GenerateError {
    /// HTTP error from the LLM API
    #[error("LLM API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Request timed out
    #[error("Generation timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Provider unreachable or misconfigured
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),
}

impl GenerateError {
    /// Transient failures worth a bounded retry
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerateError::Timeout { .. } | GenerateError::Unavailable(_) => true,
            GenerateError::ApiError { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

/// Capability contract for answer generation
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Generate an answer for the assembled prompt
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError>;

    /// Model identifier for logging and responses
    fn model_id(&self) -> &str;
}
