// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval orchestration
//!
//! `RagEngine` owns the write path (chunk, embed, store) and the read path
//! (embed query, search, assemble context, generate). It holds no
//! cross-request state beyond the shared providers, so concurrent uploads
//! and queries are independent.
//!
//! The write path is atomic per document: every chunk is embedded before
//! anything is handed to the store, and the store commits a document's
//! chunk set in a single upsert. A provider failure mid-upload leaves
//! nothing queryable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::chunker::{chunk_document, chunk_text, renumber, Chunk, ChunkerConfig, Document};
use crate::config::RagNodeConfig;
use crate::embeddings::EmbeddingProvider;
use crate::generation::{build_prompt, prompt::context_length, AnswerMode, AnswerProvider};
use crate::store::{ChunkRecord, ScoredChunk, VectorStore};

use super::errors::RagError;

/// Fixed response when retrieval finds nothing; generation is skipped
pub const NO_CONTENT_ANSWER: &str =
    "I couldn't find relevant information in the uploaded documents to answer your question.";

const MIN_QUERY_CHARS: usize = 3;
const MAX_QUERY_CHARS: usize = 500;
const MAX_TOP_K: usize = 10;
const SNIPPET_CHARS: usize = 200;
const RETRY_BASE_DELAY_MS: u64 = 100;

/// Result of ingesting a document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    pub document_id: String,
    pub filename: String,
    pub chunk_count: usize,
    pub size_bytes: usize,
    pub upload_time: DateTime<Utc>,
}

/// One page of extracted text for paged formats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// A cited source in a query answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub chunk_id: String,
    pub document_id: String,
    /// Similarity score in [0.0, 1.0]
    pub similarity: f32,
    /// Chunk text truncated to 200 characters
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// Result of answering a query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub answer: String,
    pub mode: AnswerMode,
    /// Sources in descending-similarity order
    pub sources: Vec<SourceRef>,
    pub query_time_ms: u64,
    pub model_used: String,
}

/// The retrieval orchestrator
pub struct RagEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn AnswerProvider>,
    config: RagNodeConfig,
}

impl RagEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn AnswerProvider>,
        config: RagNodeConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            config,
        }
    }

    fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig {
            chunk_size: self.config.chunk_size,
            overlap: self.config.chunk_overlap,
        }
    }

    /// Ingest a document: chunk, embed, and atomically store
    pub async fn ingest(&self, document: &Document) -> Result<IngestReceipt, RagError> {
        let chunks = chunk_document(document, &self.chunker_config())?;
        self.commit(document, chunks).await
    }

    /// Ingest a paged document, carrying page numbers into chunk metadata
    ///
    /// Pages with no extracted text are skipped, matching how empty PDF
    /// pages are dropped at parse time. A document whose pages are all
    /// empty is rejected as empty.
    pub async fn ingest_pages(
        &self,
        document_id: &str,
        filename: &str,
        pages: &[PageText],
    ) -> Result<IngestReceipt, RagError> {
        let config = self.chunker_config();
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut size_bytes = 0usize;

        for page in pages {
            if page.text.is_empty() {
                continue;
            }
            size_bytes += page.text.len();
            chunks.extend(chunk_text(
                document_id,
                &page.text,
                Some(page.page_number),
                &config,
            )?);
        }

        if chunks.is_empty() {
            return Err(RagError::EmptyDocument(document_id.to_string()));
        }
        renumber(document_id, &mut chunks);

        let document = Document {
            id: document_id.to_string(),
            filename: filename.to_string(),
            text: String::new(),
            uploaded_at: Utc::now(),
            size_bytes,
        };
        self.commit(&document, chunks).await
    }

    async fn commit(
        &self,
        document: &Document,
        chunks: Vec<Chunk>,
    ) -> Result<IngestReceipt, RagError> {
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();

        // Embed every chunk before the store sees any of them
        let embeddings = with_retry(
            self.config.max_retries,
            "embed_batch",
            |e: &crate::embeddings::EmbedError| e.is_retryable(),
            || self.embedder.embed_batch(&texts),
        )
        .await?;

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkRecord {
                chunk,
                vector: embedding.into_vec(),
            })
            .collect();
        let chunk_count = records.len();

        with_retry(
            self.config.max_retries,
            "upsert_document",
            |e: &crate::store::StoreError| e.is_retryable(),
            || self.store.upsert_document(&document.id, records.clone()),
        )
        .await?;

        info!(
            "Ingested document {} ({}): {} chunks, {} bytes",
            document.id, document.filename, chunk_count, document.size_bytes
        );

        Ok(IngestReceipt {
            document_id: document.id.clone(),
            filename: document.filename.clone(),
            chunk_count,
            size_bytes: document.size_bytes,
            upload_time: document.uploaded_at,
        })
    }

    /// Answer a query from the stored documents
    pub async fn answer(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<QueryOutcome, RagError> {
        let start = Instant::now();
        let query = validate_query(query)?;
        let top_k = validate_top_k(top_k.unwrap_or(self.config.top_k))?;

        let query_embedding = with_retry(
            self.config.max_retries,
            "embed_query",
            |e: &crate::embeddings::EmbedError| e.is_retryable(),
            || self.embedder.embed(query),
        )
        .await?;

        let mut hits = with_retry(
            self.config.max_retries,
            "search",
            |e: &crate::store::StoreError| e.is_retryable(),
            || self.store.search(query_embedding.data(), top_k),
        )
        .await?;
        hits.retain(|hit| hit.score >= self.config.min_similarity);

        if hits.is_empty() {
            // Defined empty outcome, never a generator call
            return Ok(QueryOutcome {
                answer: NO_CONTENT_ANSWER.to_string(),
                mode: AnswerMode::NoContext,
                sources: Vec::new(),
                query_time_ms: start.elapsed().as_millis() as u64,
                model_used: "N/A".to_string(),
            });
        }

        let mode = AnswerMode::for_context_length(
            context_length(&hits),
            self.config.strict_context_threshold,
        );
        let prompt = build_prompt(query, &hits, mode);

        let answer = with_retry(
            self.config.max_retries,
            "generate",
            |e: &crate::generation::GenerateError| e.is_retryable(),
            || self.generator.generate(&prompt),
        )
        .await?;

        let sources = hits.iter().map(source_ref).collect();
        let query_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Answered query in {}ms with {} sources ({:?} mode)",
            query_time_ms,
            hits.len(),
            mode
        );

        Ok(QueryOutcome {
            answer,
            mode,
            sources,
            query_time_ms,
            model_used: self.generator.model_id().to_string(),
        })
    }

    /// Remove a document and its vectors
    pub async fn remove_document(&self, document_id: &str) -> Result<(), RagError> {
        self.store.remove_document(document_id).await?;
        Ok(())
    }

    /// Total chunks currently queryable
    pub async fn chunk_count(&self) -> Result<usize, RagError> {
        Ok(self.store.chunk_count().await?)
    }
}

fn validate_query(query: &str) -> Result<&str, RagError> {
    let trimmed = query.trim();
    let chars = trimmed.chars().count();
    if chars < MIN_QUERY_CHARS {
        return Err(RagError::InvalidQuery(format!(
            "Query must be at least {} characters",
            MIN_QUERY_CHARS
        )));
    }
    if chars > MAX_QUERY_CHARS {
        return Err(RagError::InvalidQuery(format!(
            "Query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }
    Ok(trimmed)
}

fn validate_top_k(top_k: usize) -> Result<usize, RagError> {
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(RagError::InvalidQuery(format!(
            "top_k must be between 1 and {}",
            MAX_TOP_K
        )));
    }
    Ok(top_k)
}

fn source_ref(hit: &ScoredChunk) -> SourceRef {
    SourceRef {
        chunk_id: hit.chunk.id.clone(),
        document_id: hit.chunk.document_id.clone(),
        similarity: hit.score,
        snippet: snippet(&hit.chunk.text),
        page_number: hit.chunk.page_number,
    }
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_CHARS {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", truncated)
    }
}

/// Bounded retry with exponential backoff for transient provider errors
///
/// Validation errors never reach this path; `retryable` gates which
/// failures are worth repeating so persistent outages surface unchanged.
async fn with_retry<T, E, F, Fut>(
    max_retries: u32,
    label: &str,
    retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries && retryable(&err) => {
                attempt += 1;
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1));
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    label, attempt, max_retries, err, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
