// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP surface for the document Q&A node

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;
use uuid::Uuid;

use crate::chunker::Document;
use crate::rag::{RagEngine, RagError};

use super::types::{
    DeleteResponse, ErrorResponse, HealthResponse, QueryRequest, UploadRequest,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RagEngine>,
}

/// Build the router; split out from [`start_server`] so tests can drive
/// handlers without binding a socket
pub fn router(engine: Arc<RagEngine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/documents", post(upload_handler))
        .route("/v1/documents/:id", delete(delete_handler))
        .route("/v1/query", post(query_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(
    engine: Arc<RagEngine>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Response {
    match state.engine.chunk_count().await {
        Ok(chunks_stored) => Json(HealthResponse {
            status: "healthy".to_string(),
            chunks_stored,
        })
        .into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    chunks_stored: 0,
                }),
            )
                .into_response()
        }
    }
}

async fn upload_handler(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Response {
    let document_id = request
        .document_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let result = match (request.text, request.pages) {
        (Some(text), None) => {
            let document = Document::new(document_id, request.filename, text);
            state.engine.ingest(&document).await
        }
        (None, Some(pages)) => {
            state
                .engine
                .ingest_pages(&document_id, &request.filename, &pages)
                .await
        }
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "Provide exactly one of 'text' or 'pages'",
            );
        }
    };

    match result {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(e) => rag_error_response(e),
    }
}

async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    match state.engine.answer(&request.query, request.top_k).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => rag_error_response(e),
    }
}

async fn delete_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.engine.remove_document(&id).await {
        Ok(()) => Json(DeleteResponse {
            message: format!("Document {} deleted", id),
        })
        .into_response(),
        Err(e) => rag_error_response(e),
    }
}

fn rag_error_response(err: RagError) -> Response {
    let status = match &err {
        RagError::EmptyDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RagError::InvalidChunkConfig { .. } | RagError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        RagError::EmbeddingUnavailable(_)
        | RagError::VectorStoreUnavailable(_)
        | RagError::GenerationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    if status.is_server_error() {
        error!("Request failed: {} ({})", err, err.error_code());
    }
    error_response(status, err.error_code(), &err.to_string())
}

fn error_response(status: StatusCode, error_type: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error_type: error_type.to_lowercase(),
            message: message.to_string(),
        }),
    )
        .into_response()
}
