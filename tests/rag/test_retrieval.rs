// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Read-path behavior: retrieval ordering, the no-content outcome, and the
//! end-to-end upload/query scenario

use fabstir_doc_qa::chunker::Document;
use fabstir_doc_qa::generation::AnswerMode;
use fabstir_doc_qa::rag::{RagError, NO_CONTENT_ANSWER};

use super::common::{test_config, test_node};

fn document(id: &str, text: String) -> Document {
    Document::new(id.to_string(), format!("{}.txt", id), text)
}

#[tokio::test]
async fn test_zero_hits_skips_generation() {
    let node = test_node(test_config());

    let outcome = node
        .engine
        .answer("what does the handbook say about travel?", None)
        .await
        .unwrap();

    assert_eq!(outcome.answer, NO_CONTENT_ANSWER);
    assert_eq!(outcome.mode, AnswerMode::NoContext);
    assert!(outcome.sources.is_empty());
    assert_eq!(outcome.model_used, "N/A");
    assert_eq!(node.generator.call_count(), 0);
}

#[tokio::test]
async fn test_end_to_end_upload_and_query() {
    // 1200 chars with chunk_size=500, overlap=100 -> 3 chunks
    let node = test_node(test_config());
    let text: String = (0..1200).map(|i| ((i % 26) as u8 + b'a') as char).collect();

    let receipt = node
        .engine
        .ingest(&document("handbook", text))
        .await
        .unwrap();
    assert_eq!(receipt.chunk_count, 3);
    assert_eq!(receipt.size_bytes, 1200);
    assert_eq!(node.engine.chunk_count().await.unwrap(), 3);

    let outcome = node
        .engine
        .answer("what is in the handbook?", Some(2))
        .await
        .unwrap();

    assert!(outcome.sources.len() <= 2);
    assert!(!outcome.sources.is_empty());
    for pair in outcome.sources.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    for source in &outcome.sources {
        assert!(source.chunk_id.starts_with("handbook_chunk_"));
        assert!((0.0..=1.0).contains(&source.similarity));
    }
    assert_eq!(node.generator.call_count(), 1);
    assert_eq!(outcome.model_used, "recording-stub");
}

#[tokio::test]
async fn test_sources_sorted_across_documents() {
    let node = test_node(test_config());
    for i in 0..4 {
        let text: String = format!("document number {} talks about topic {}. ", i, i).repeat(20);
        node.engine
            .ingest(&document(&format!("doc-{}", i), text))
            .await
            .unwrap();
    }

    let outcome = node
        .engine
        .answer("which document talks about topic 2?", Some(5))
        .await
        .unwrap();

    for pair in outcome.sources.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[tokio::test]
async fn test_query_validation_rejected_before_providers() {
    let node = test_node(test_config());

    let err = node.engine.answer("hi", None).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidQuery(_)));

    let long: String = std::iter::repeat('q').take(501).collect();
    let err = node.engine.answer(&long, None).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidQuery(_)));

    let err = node
        .engine
        .answer("a valid question?", Some(0))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::InvalidQuery(_)));

    let err = node
        .engine
        .answer("a valid question?", Some(11))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::InvalidQuery(_)));

    assert_eq!(node.generator.call_count(), 0);
}

#[tokio::test]
async fn test_embedding_outage_propagates_on_query() {
    let node = test_node(test_config());
    node.engine
        .ingest(&document("doc", "retrievable content ".repeat(30)))
        .await
        .unwrap();

    node.embedder.set_failing(true);
    let err = node
        .engine
        .answer("anything at all?", None)
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::EmbeddingUnavailable(_)));
    assert_eq!(node.generator.call_count(), 0);
}

#[tokio::test]
async fn test_snippet_bounded_to_200_chars() {
    let node = test_node(test_config());
    let text: String = "long chunk content ".repeat(40);
    node.engine.ingest(&document("doc", text)).await.unwrap();

    let outcome = node
        .engine
        .answer("what is the content?", Some(1))
        .await
        .unwrap();
    for source in &outcome.sources {
        assert!(source.snippet.chars().count() <= 203);
    }
}
