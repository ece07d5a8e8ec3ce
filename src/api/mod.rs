// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod http_server;
pub mod types;

pub use http_server::{router, start_server, AppState};
pub use types::{
    DeleteResponse, ErrorResponse, HealthResponse, QueryRequest, UploadRequest,
};
