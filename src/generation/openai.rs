// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible chat completion adapter
//!
//! Works against any endpoint speaking the `/chat/completions` wire shape;
//! providers differ only by base URL, API key and model id.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{AnswerProvider, GenerateError, Prompt};

pub struct OpenAiChatProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    timeout_ms: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// Surface the message from an OpenAI-style {"error": {"message": ...}}
// body; anything else passes through verbatim
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string())
}

impl OpenAiChatProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        timeout_ms: u64,
    ) -> Result<Self, GenerateError> {
        url::Url::parse(base_url)
            .map_err(|e| GenerateError::Unavailable(format!("Invalid LLM API URL: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| GenerateError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature: 0.1,
            timeout_ms,
        })
    }
}

#[async_trait]
impl AnswerProvider for OpenAiChatProvider {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerateError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                GenerateError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerateError::ApiError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Unavailable(format!("Malformed response: {}", e)))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerateError::Unavailable("Response contained no choices".to_string()))?;

        debug!("Generated {} chars via {}", answer.len(), self.model);
        Ok(answer)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
