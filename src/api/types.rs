// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request and response shapes for the HTTP API

use serde::{Deserialize, Serialize};

use crate::rag::PageText;

/// Upload body: raw extracted text, or per-page text for paged formats
///
/// Document format parsing happens upstream; this service only ever sees
/// extracted text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Caller-supplied id; generated when absent
    pub document_id: Option<String>,
    pub filename: String,
    /// Whole-document text (mutually exclusive with `pages`)
    pub text: Option<String>,
    /// Per-page text with page numbers
    pub pages: Option<Vec<PageText>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub chunks_stored: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
}
