//! Error taxonomy for the auth service boundary.
//!
//! Every variant is converted to a structured JSON response; no internal
//! error detail crosses the boundary. `NotFound` and `Authentication` share
//! a status code on the wire so a caller cannot tell which half of an
//! email/password pair was wrong beyond the original messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use super::storage::StoreError;

#[derive(Debug, Error)]
pub(crate) enum AuthError {
    /// Missing or malformed input, caller's fault.
    #[error("{0}")]
    Validation(String),
    /// Uniqueness violation on registration.
    #[error("{0}")]
    Conflict(String),
    /// No matching credential or challenge.
    #[error("{0}")]
    NotFound(String),
    /// Password mismatch.
    #[error("{0}")]
    Authentication(String),
    /// Store or delivery collaborator unreachable.
    #[error("Server error")]
    Dependency(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Conflict("User already exists".to_string()),
            StoreError::Unavailable(source) => Self::Dependency(source),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Observed wire behavior maps conflicts to 400 and both credential
        // failures to 404.
        let status = match &self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::Authentication(_) => StatusCode::NOT_FOUND,
            Self::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let Self::Dependency(source) = &self {
            error!("dependency failure: {source:?}");
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
