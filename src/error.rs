//! Catalog error types.

use crate::storage::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "catalog request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(crate::transport::http::types::ApiResponse::failure(format!(
                "Error: {}",
                self
            ))),
        )
            .into_response()
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
