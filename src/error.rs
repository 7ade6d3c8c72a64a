// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Why a paginated fetch was abandoned. `page` is the zero-based request index.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request for page {page} failed: {source}")]
    Upstream {
        page: u32,
        #[source]
        source: UpstreamError,
    },

    #[error("Rate limit exceeded (status {status} on page {page})")]
    RateLimited { status: u16, page: u32 },
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Snapshot unavailable: {0:#}")]
    Snapshot(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
