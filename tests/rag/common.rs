// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic fakes shared by the RAG integration tests
//!
//! No network: embeddings come from the hashed provider, and generation is
//! a recording stub so tests can assert whether and how the LLM was called.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fabstir_doc_qa::config::RagNodeConfig;
use fabstir_doc_qa::embeddings::{
    EmbedError, Embedding, EmbeddingProvider, HashedEmbeddingProvider,
};
use fabstir_doc_qa::generation::{AnswerMode, AnswerProvider, GenerateError, Prompt};
use fabstir_doc_qa::rag::RagEngine;
use fabstir_doc_qa::store::{MemoryVectorStore, VectorStore};

pub const DIMENSION: usize = 32;

/// Hashed embedder with a failure switch to simulate provider outages
pub struct FlakyEmbedder {
    inner: HashedEmbeddingProvider,
    failing: AtomicBool,
}

impl FlakyEmbedder {
    pub fn new() -> Self {
        Self {
            inner: HashedEmbeddingProvider::new("hashed-test".to_string(), DIMENSION),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbedError::Unavailable(
                "simulated embedding outage".to_string(),
            ));
        }
        self.inner.embed(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

/// Generator stub that records calls and the mode of the last prompt
pub struct RecordingGenerator {
    pub calls: AtomicUsize,
    pub last_mode: Mutex<Option<AnswerMode>>,
    reply: String,
}

impl RecordingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_mode: Mutex::new(None),
            reply: reply.to_string(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerProvider for RecordingGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mode.lock().unwrap() = Some(prompt.mode);
        Ok(self.reply.clone())
    }

    fn model_id(&self) -> &str {
        "recording-stub"
    }
}

/// Config tuned for tests: small chunks, no retries (so failure tests
/// return immediately), defaults otherwise
pub fn test_config() -> RagNodeConfig {
    let mut config = RagNodeConfig::default();
    config.chunk_size = 500;
    config.chunk_overlap = 100;
    config.providers.embedding_dimension = DIMENSION;
    config.max_retries = 0;
    config
}

pub struct TestNode {
    pub engine: RagEngine,
    pub embedder: Arc<FlakyEmbedder>,
    pub generator: Arc<RecordingGenerator>,
    pub store: Arc<MemoryVectorStore>,
}

/// Engine wired to the in-memory store and deterministic fakes
pub fn test_node(config: RagNodeConfig) -> TestNode {
    let embedder = Arc::new(FlakyEmbedder::new());
    let generator = Arc::new(RecordingGenerator::new("a grounded answer"));
    let store = Arc::new(MemoryVectorStore::new(
        config.providers.embedding_dimension,
    ));
    let engine = RagEngine::new(
        embedder.clone(),
        store.clone() as Arc<dyn VectorStore>,
        generator.clone(),
        config,
    );
    TestNode {
        engine,
        embedder,
        generator,
        store,
    }
}
