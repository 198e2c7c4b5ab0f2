// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of domain errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storebot_core::StorebotError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// A [`StorebotError`] returned from a handler.
#[derive(Debug)]
pub struct ApiError(pub StorebotError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            StorebotError::NotFound { .. } => StatusCode::NOT_FOUND,
            StorebotError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorebotError> for ApiError {
    fn from(err: StorebotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
