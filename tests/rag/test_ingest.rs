// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Write-path behavior: per-document atomicity, idempotent re-upload,
//! paged ingest, and deletion

use fabstir_doc_qa::chunker::Document;
use fabstir_doc_qa::rag::{PageText, RagError, NO_CONTENT_ANSWER};
use fabstir_doc_qa::VectorStore;

use super::common::{test_config, test_node};

fn document(id: &str, text: String) -> Document {
    Document::new(id.to_string(), format!("{}.txt", id), text)
}

#[tokio::test]
async fn test_embedding_failure_leaves_nothing_queryable() {
    let node = test_node(test_config());

    node.embedder.set_failing(true);
    let err = node
        .engine
        .ingest(&document("doc", "content that will never be embedded ".repeat(30)))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::EmbeddingUnavailable(_)));
    assert_eq!(node.engine.chunk_count().await.unwrap(), 0);

    // Recover the provider; the failed document must still be absent
    node.embedder.set_failing(false);
    let outcome = node
        .engine
        .answer("what was in that document?", None)
        .await
        .unwrap();
    assert_eq!(outcome.answer, NO_CONTENT_ANSWER);
    assert!(outcome.sources.is_empty());
}

#[tokio::test]
async fn test_store_rejection_is_atomic() {
    // Store expects a different dimension than the embedder produces, so
    // the upsert is rejected as a whole
    let mut config = test_config();
    config.providers.embedding_dimension = 16;
    let node = test_node(config);

    let err = node
        .engine
        .ingest(&document("doc", "mismatched dimensions ".repeat(40)))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::VectorStoreUnavailable(_)));
    assert_eq!(node.store.chunk_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reupload_is_idempotent() {
    let node = test_node(test_config());
    let text: String = (0..1200).map(|i| ((i % 26) as u8 + b'a') as char).collect();

    let first = node.engine.ingest(&document("doc", text.clone())).await.unwrap();
    let second = node.engine.ingest(&document("doc", text)).await.unwrap();

    assert_eq!(first.chunk_count, second.chunk_count);
    assert_eq!(node.engine.chunk_count().await.unwrap(), first.chunk_count);
}

#[tokio::test]
async fn test_empty_document_rejected_without_provider_calls() {
    let node = test_node(test_config());
    // Even with the embedder down, validation fires first
    node.embedder.set_failing(true);

    let err = node
        .engine
        .ingest(&document("doc", String::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::EmptyDocument(_)));
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_paged_ingest_carries_page_numbers() {
    let node = test_node(test_config());
    let pages = vec![
        PageText {
            page_number: 1,
            text: "the first page describes the refund policy in detail ".repeat(5),
        },
        PageText {
            page_number: 2,
            text: String::new(), // empty pages are skipped
        },
        PageText {
            page_number: 3,
            text: "the third page covers shipping timelines ".repeat(5),
        },
    ];

    let receipt = node
        .engine
        .ingest_pages("manual", "manual.pdf", &pages)
        .await
        .unwrap();
    assert!(receipt.chunk_count >= 2);

    let outcome = node
        .engine
        .answer("what is the refund policy?", Some(5))
        .await
        .unwrap();
    assert!(outcome
        .sources
        .iter()
        .all(|source| matches!(source.page_number, Some(1) | Some(3))));
}

#[tokio::test]
async fn test_all_pages_empty_rejected() {
    let node = test_node(test_config());
    let pages = vec![PageText {
        page_number: 1,
        text: String::new(),
    }];
    let err = node
        .engine
        .ingest_pages("manual", "manual.pdf", &pages)
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::EmptyDocument(_)));
}

#[tokio::test]
async fn test_delete_removes_document_from_retrieval() {
    let node = test_node(test_config());
    node.engine
        .ingest(&document("doc", "deletable content ".repeat(30)))
        .await
        .unwrap();
    assert!(node.engine.chunk_count().await.unwrap() > 0);

    node.engine.remove_document("doc").await.unwrap();
    assert_eq!(node.engine.chunk_count().await.unwrap(), 0);

    let outcome = node.engine.answer("what content?", None).await.unwrap();
    assert_eq!(outcome.answer, NO_CONTENT_ANSWER);
}

#[tokio::test]
async fn test_concurrent_ingests_are_independent() {
    let node = std::sync::Arc::new(test_node(test_config()));

    let mut handles = Vec::new();
    for i in 0..6 {
        let node = node.clone();
        handles.push(tokio::spawn(async move {
            let text: String = format!("document {} body ", i).repeat(60);
            node.engine
                .ingest(&Document::new(
                    format!("doc-{}", i),
                    format!("doc-{}.txt", i),
                    text,
                ))
                .await
                .unwrap()
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap().chunk_count;
    }
    assert_eq!(node.engine.chunk_count().await.unwrap(), total);
}
