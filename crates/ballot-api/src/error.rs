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
  #[error("not found: {0}")]
  NotFound(String),

  /// The category has been soft-deleted.
  #[error("gone: {0}")]
  Gone(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ballot_core::Error> for ApiError {
  fn from(e: ballot_core::Error) -> Self {
    use ballot_core::Error as E;
    match e {
      E::CategoryNotFound(name) => Self::NotFound(format!("category {name} not found")),
      E::CategoryInactive(name) => Self::Gone(format!("category {name} has been deleted")),
      E::ItemNotFound(id) => Self::NotFound(format!("item {id} not found")),
      E::InvalidInput(reason) => Self::BadRequest(reason),
      E::StoreUnavailable(source) => Self::Store(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Gone(m) => (StatusCode::GONE, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
