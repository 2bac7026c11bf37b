//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure renders as `{"success": false, "errors": [{field, message}]}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use elective_core::selection::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed with {} error(s)", .0.len())]
  Validation(Vec<ValidationError>),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<elective_core::Error> for ApiError {
  fn from(err: elective_core::Error) -> Self {
    match err {
      elective_core::Error::Validation(errors) => Self::Validation(errors),
      e if e.is_not_found() => Self::NotFound(e.to_string()),
      e if e.is_conflict() => Self::Conflict(e.to_string()),
      e => Self::Internal(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, errors) = match self {
      ApiError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, vec![ValidationError::general(m)]),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, vec![ValidationError::general(m)]),
      ApiError::Internal(e) => {
        error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          vec![ValidationError::general(e.to_string())],
        )
      }
    };
    (status, Json(json!({ "success": false, "errors": errors }))).into_response()
  }
}
