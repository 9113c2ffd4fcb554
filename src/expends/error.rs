//! Typed API errors and their HTTP rendering.
//!
//! Every fallible handler returns [`Error`]; the `IntoResponse` impl converts
//! it into the uniform failure envelope so nothing escapes as a bare status
//! or crashes the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use super::envelope::ErrorBody;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input, invalid enum value. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, expired, or stale credential; wrong password. HTTP 401.
    #[error("{0}")]
    Auth(String),

    /// No matching user or statement. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate username or email. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected store failure or post-write verification failure. HTTP 500.
    /// The detail is logged; clients only see a generic message.
    #[error("something went wrong")]
    Internal(#[source] anyhow::Error),
}

impl Error {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(field) => {
                Self::Conflict(format!("User with that {field} already exists."))
            }
            StoreError::UnknownUser => Self::NotFound("User does not exist.".to_string()),
            StoreError::Unavailable(_) => Self::internal(err),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            error!("internal error: {source:#}");
        }
        let status = self.status();
        let body = ErrorBody::new(status, self.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UniqueField;

    #[test]
    fn kinds_map_to_the_documented_status_codes() {
        assert_eq!(
            Error::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::Auth("no".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_user_conflict_is_409_not_408() {
        let err = Error::from(StoreError::Conflict(UniqueField::Username));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(
            err.to_string(),
            "User with that username already exists."
        );
    }

    #[test]
    fn internal_errors_hide_their_detail() {
        let err = Error::internal(anyhow::anyhow!("pool exhausted"));
        assert_eq!(err.to_string(), "something went wrong");
    }
}
