// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Strict/hybrid mode selection pinned at the context-length threshold:
//! total retrieved context below the threshold is hybrid, at or above it
//! is strict

use fabstir_doc_qa::chunker::Document;
use fabstir_doc_qa::generation::AnswerMode;

use super::common::{test_config, test_node, TestNode};

const THRESHOLD: usize = 500;

/// Ingest a single document whose sole retrieved chunk has exactly
/// `context_chars` characters, then query and return the selected mode
async fn mode_for_context(context_chars: usize) -> AnswerMode {
    let mut config = test_config();
    config.strict_context_threshold = THRESHOLD;
    // One chunk holds the whole document, so retrieved context length
    // equals the document length exactly
    config.chunk_size = 1000;
    config.chunk_overlap = 200;

    let node: TestNode = test_node(config);
    let text: String = (0..context_chars)
        .map(|i| ((i % 26) as u8 + b'a') as char)
        .collect();
    node.engine
        .ingest(&Document::new(
            "doc".to_string(),
            "doc.txt".to_string(),
            text,
        ))
        .await
        .unwrap();

    let outcome = node.engine.answer("what is in the text?", None).await.unwrap();
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(node.generator.call_count(), 1);

    // The mode in the outcome must match the prompt the generator saw
    let prompt_mode = node.generator.last_mode.lock().unwrap().unwrap();
    assert_eq!(outcome.mode, prompt_mode);
    outcome.mode
}

#[tokio::test]
async fn test_below_threshold_is_hybrid() {
    assert_eq!(mode_for_context(THRESHOLD - 1).await, AnswerMode::Hybrid);
}

#[tokio::test]
async fn test_at_threshold_is_strict() {
    assert_eq!(mode_for_context(THRESHOLD).await, AnswerMode::Strict);
}

#[tokio::test]
async fn test_above_threshold_is_strict() {
    assert_eq!(mode_for_context(THRESHOLD + 1).await, AnswerMode::Strict);
}

#[tokio::test]
async fn test_threshold_is_configurable() {
    let mut config = test_config();
    config.strict_context_threshold = 40;
    config.chunk_size = 1000;
    config.chunk_overlap = 200;

    let node = test_node(config);
    let text: String = (0..60).map(|i| ((i % 26) as u8 + b'a') as char).collect();
    node.engine
        .ingest(&Document::new(
            "doc".to_string(),
            "doc.txt".to_string(),
            text,
        ))
        .await
        .unwrap();

    let outcome = node.engine.answer("what is in the text?", None).await.unwrap();
    assert_eq!(outcome.mode, AnswerMode::Strict);
}
