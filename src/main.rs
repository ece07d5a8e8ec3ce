// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use fabstir_doc_qa::{
    api::start_server,
    config::RagNodeConfig,
    embeddings::{EmbeddingProvider, HashedEmbeddingProvider, HttpEmbeddingProvider},
    generation::{AnswerProvider, OpenAiChatProvider},
    rag::RagEngine,
    store::{HttpVectorStore, MemoryVectorStore, VectorStore},
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = RagNodeConfig::from_env();
    config.validate().map_err(|e| anyhow!(e))?;

    let embedder: Arc<dyn EmbeddingProvider> = match config.providers.embedding_api_url {
        Some(ref url) => {
            info!("Using remote embedding provider at {}", url);
            Arc::new(HttpEmbeddingProvider::new(
                url,
                config.providers.embedding_api_key.clone(),
                config.providers.embedding_model.clone(),
                config.providers.embedding_dimension,
                config.request_timeout_ms,
            )?)
        }
        None => {
            info!("No EMBEDDING_API_URL set, using deterministic local embedder");
            Arc::new(HashedEmbeddingProvider::new(
                config.providers.embedding_model.clone(),
                config.providers.embedding_dimension,
            ))
        }
    };

    let store: Arc<dyn VectorStore> = match config.providers.vector_db_url {
        Some(ref url) => {
            info!("Using external vector database at {}", url);
            Arc::new(HttpVectorStore::new(url, config.request_timeout_ms)?)
        }
        None => {
            info!("No VECTOR_DB_URL set, using in-memory vector store");
            Arc::new(MemoryVectorStore::new(
                config.providers.embedding_dimension,
            ))
        }
    };

    let llm_url = config
        .providers
        .llm_api_url
        .clone()
        .ok_or_else(|| anyhow!("LLM_API_URL must be set"))?;
    let generator: Arc<dyn AnswerProvider> = Arc::new(OpenAiChatProvider::new(
        &llm_url,
        config.providers.llm_api_key.clone(),
        config.providers.llm_model.clone(),
        config.request_timeout_ms,
    )?);

    let port = config.api_port;
    info!(
        "Starting document Q&A node (chunk_size={}, overlap={}, top_k={})",
        config.chunk_size, config.chunk_overlap, config.top_k
    );

    let engine = Arc::new(RagEngine::new(embedder, store, generator, config));
    start_server(engine, port)
        .await
        .map_err(|e| anyhow!("Server error: {}", e))?;

    Ok(())
}
