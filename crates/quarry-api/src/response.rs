//! Success envelope shared by all handlers.
//!
//! Every success body is `{"data": ..., "message": ...}`; identifiers
//! serialise as their 32-char hex encoding and timestamps as RFC 3339,
//! recursively through nested structures.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub data:    T,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

/// `200 OK` with a bare data payload.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
  Json(Envelope { data, message: None })
}

/// `200 OK` with a confirmation message.
pub fn ok_with<T: Serialize>(data: T, message: &str) -> Json<Envelope<T>> {
  Json(Envelope { data, message: Some(message.to_owned()) })
}

/// `201 Created` with a confirmation message.
pub fn created<T: Serialize>(data: T, message: &str) -> impl IntoResponse {
  (
    StatusCode::CREATED,
    Json(Envelope { data, message: Some(message.to_owned()) }),
  )
}
