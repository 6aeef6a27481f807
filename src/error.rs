// src/error.rs
use crate::completion::CompletionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures that happen before a response body starts streaming.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    BadRequest(#[from] serde_json::Error),
    #[error("Completion provider is not configured (set OPENAI_API_KEY)")]
    ProviderNotConfigured,
    #[error("{0}")]
    Completion(#[from] CompletionError),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request setup failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
