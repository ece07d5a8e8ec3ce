// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt assembly
//!
//! Turns retrieved chunks plus the user question into the prompt handed to
//! the answer provider. The context block annotates each chunk with its
//! source number, page and relevance so the model can cite sources.

use crate::store::ScoredChunk;

use super::{AnswerMode, Prompt};

const SYSTEM_INSTRUCTION: &str =
    "You are a document assistant that provides accurate answers grounded in the supplied context.";

/// Build the generation prompt for the given mode
///
/// Chunks must already be in descending-score order; their order is
/// preserved in the context block.
pub fn build_prompt(query: &str, chunks: &[ScoredChunk], mode: AnswerMode) -> Prompt {
    let context = context_block(chunks);

    let instructions = match mode {
        AnswerMode::Strict => {
            "1. Answer the question using ONLY information from the context above\n\
             2. If the context does not contain the answer, state explicitly that the answer is not in the provided documents\n\
             3. Cite sources by referencing [Source N] numbers\n\
             4. Include page numbers when mentioning specific information\n\
             5. Be concise and accurate"
        }
        AnswerMode::Hybrid | AnswerMode::NoContext => {
            "1. Prefer information from the context above and cite it by [Source N] number\n\
             2. The context is limited; you may supplement with your own general knowledge\n\
             3. Make clear which parts of the answer come from the documents and which do not\n\
             4. Be concise and accurate"
        }
    };

    let user = format!(
        "CONTEXT FROM DOCUMENTS:\n{}\n\nUSER QUESTION:\n{}\n\nINSTRUCTIONS:\n{}\n\nANSWER:",
        context, query, instructions
    );

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
        mode,
    }
}

/// Total length in characters of the retrieved chunk texts
///
/// This is the quantity the strict/hybrid threshold is compared against;
/// source annotations are not counted.
pub fn context_length(chunks: &[ScoredChunk]) -> usize {
    chunks
        .iter()
        .map(|scored| scored.chunk.text.chars().count())
        .sum()
}

fn context_block(chunks: &[ScoredChunk]) -> String {
    let parts: Vec<String> = chunks
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let page = scored
                .chunk
                .page_number
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "[Source {}, Page {}, Relevance: {:.2}]\n{}",
                i + 1,
                page,
                scored.score,
                scored.chunk.text
            )
        })
        .collect();
    parts.join("\n\n")
}
