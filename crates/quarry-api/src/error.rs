//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("storage unavailable: {0}")]
  Unavailable(String),
}

impl From<quarry_core::Error> for ApiError {
  fn from(e: quarry_core::Error) -> Self {
    use quarry_core::Error as E;
    match &e {
      E::InvalidIdentifier(_) | E::Validation(_) => {
        Self::BadRequest(e.to_string())
      }
      E::DatasetNotFound(_) => Self::NotFound(e.to_string()),
      E::DuplicateDataset { .. } => Self::Conflict(e.to_string()),
      E::Storage(_) => Self::Unavailable(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
