// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// RAG (Retrieval-Augmented Generation) orchestration
// Write path: chunk -> embed -> atomic store. Read path: embed -> search ->
// context assembly -> strict/hybrid generation.

pub mod engine;
pub mod errors;

pub use engine::{
    IngestReceipt, PageText, QueryOutcome, RagEngine, SourceRef, NO_CONTENT_ANSWER,
};
pub use errors::RagError;
