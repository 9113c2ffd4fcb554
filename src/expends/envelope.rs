//! Uniform response envelopes.
//!
//! Success bodies are `{status, data, message}`; failures are
//! `{status, message, errors}`. Every endpoint goes through one of the two.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Success envelope wrapping the payload of an endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            data,
            message: message.into(),
        }
    }
}

/// Build a `(status, body)` reply in one call.
pub fn reply<T: Serialize>(
    status: StatusCode,
    data: T,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    (status, Json(ApiResponse::new(status, data, message)))
}

/// Failure envelope produced by [`crate::expends::error::Error`].
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub errors: Vec<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            status: status.as_u16(),
            errors: vec![message.clone()],
            message,
        }
    }
}
