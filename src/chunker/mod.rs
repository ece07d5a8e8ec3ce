// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document chunking
//!
//! Splits extracted document text into overlapping fixed-size segments that
//! become the unit of embedding and retrieval. Boundaries are chosen at
//! character granularity so multi-byte characters are never split, and the
//! output is deterministic so re-uploading a document yields identical
//! chunk ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An uploaded document after external text extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Opaque document identifier
    pub id: String,
    /// Original filename
    pub filename: String,
    /// Raw extracted text
    pub text: String,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
    /// Size of the extracted text in bytes
    pub size_bytes: usize,
}

impl Document {
    /// Create a document from already-extracted text
    pub fn new(id: String, filename: String, text: String) -> Self {
        let size_bytes = text.len();
        Self {
            id,
            filename,
            text,
            uploaded_at: Utc::now(),
            size_bytes,
        }
    }
}

/// A bounded contiguous slice of a document's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Chunk identifier: `{document_id}_chunk_{index}`
    pub id: String,
    /// Owning document id
    pub document_id: String,
    /// Sequence index within the document (dense, ascending)
    pub index: usize,
    /// Chunk text content
    pub text: String,
    /// Character offset of the first character within the source document
    pub start: usize,
    /// Character offset one past the last character
    pub end: usize,
    /// Page number if the source format had pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// Chunking parameters, both measured in characters
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Errors produced by chunking
#[derive(Debug, Error, PartialEq)]
pub enum ChunkError {
    /// Document contained no text after extraction
    #[error("Document '{0}' is empty")]
    EmptyDocument(String),

    /// Chunk size and overlap are inconsistent
    #[error("Invalid chunk config: size={chunk_size}, overlap={overlap} (sizes must be positive, overlap < size)")]
    InvalidChunkConfig { chunk_size: usize, overlap: usize },
}

/// Split a document's text into overlapping chunks
///
/// Every character of the input appears in exactly one chunk, except
/// characters inside an overlap region which appear in two consecutive
/// chunks. An input no longer than `chunk_size` produces a single chunk.
///
/// # Errors
/// * `ChunkError::EmptyDocument` if the text is empty
/// * `ChunkError::InvalidChunkConfig` if `chunk_size == 0` or `overlap >= chunk_size`
pub fn chunk_document(document: &Document, config: &ChunkerConfig) -> Result<Vec<Chunk>, ChunkError> {
    chunk_text(&document.id, &document.text, None, config)
}

/// Chunk a single span of text belonging to `document_id`
///
/// `page_number` is carried into every produced chunk; callers that ingest
/// page-by-page pass the page and re-number indices themselves via
/// [`renumber`].
pub fn chunk_text(
    document_id: &str,
    text: &str,
    page_number: Option<u32>,
    config: &ChunkerConfig,
) -> Result<Vec<Chunk>, ChunkError> {
    if config.chunk_size == 0 || config.overlap >= config.chunk_size {
        return Err(ChunkError::InvalidChunkConfig {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        });
    }
    if text.is_empty() {
        return Err(ChunkError::EmptyDocument(document_id.to_string()));
    }

    // Byte offset of every character boundary, so chunk edges always land
    // between characters regardless of UTF-8 width
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(byte_idx, _)| byte_idx)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let stride = config.chunk_size - config.overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = usize::min(start + config.chunk_size, char_len);
        let index = chunks.len();
        chunks.push(Chunk {
            id: chunk_id(document_id, index),
            document_id: document_id.to_string(),
            index,
            text: text[boundaries[start]..boundaries[end]].to_string(),
            start,
            end,
            page_number,
        });
        if end == char_len {
            break;
        }
        start += stride;
    }

    Ok(chunks)
}

/// Re-assign dense ascending indices (and matching ids) across chunks
/// gathered from multiple pages of the same document
pub fn renumber(document_id: &str, chunks: &mut [Chunk]) {
    for (index, chunk) in chunks.iter_mut().enumerate() {
        chunk.index = index;
        chunk.id = chunk_id(document_id, index);
    }
}

fn chunk_id(document_id: &str, index: usize) -> String {
    format!("{}_chunk_{}", document_id, index)
}
