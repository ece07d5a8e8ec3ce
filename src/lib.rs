// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod generation;
pub mod rag;
pub mod store;

// Re-export main types
pub use chunker::{Chunk, ChunkerConfig, Document};
pub use config::RagNodeConfig;
pub use embeddings::{Embedding, EmbeddingProvider, HashedEmbeddingProvider, HttpEmbeddingProvider};
pub use generation::{AnswerMode, AnswerProvider, OpenAiChatProvider, Prompt};
pub use rag::{IngestReceipt, QueryOutcome, RagEngine, RagError, SourceRef};
pub use store::{ChunkRecord, HttpVectorStore, MemoryVectorStore, ScoredChunk, VectorStore};
