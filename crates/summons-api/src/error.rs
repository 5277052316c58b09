//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use summons_core::Error as CoreError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The JSON body is missing, has the wrong content type, or does not
  /// deserialise into the expected payload.
  #[error("invalid payload: {0}")]
  Payload(#[from] JsonRejection),

  #[error("invalid query: {0}")]
  Query(#[from] QueryRejection),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  fn status_and_kind(&self) -> (StatusCode, &'static str) {
    match self {
      ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
      ApiError::Payload(_) | ApiError::Query(_) => (StatusCode::BAD_REQUEST, "validation"),
      ApiError::Core(e) => match e {
        CoreError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
        CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        CoreError::InvalidState { .. } => (StatusCode::CONFLICT, "invalid_state"),
        CoreError::ConcurrentModification(_) => {
          (StatusCode::CONFLICT, "concurrent_modification")
        }
        CoreError::UnknownDiscriminant { .. } | CoreError::Store(_) => {
          (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = self.status_and_kind();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string(), "kind": kind }))).into_response()
  }
}
