//! Error types for `ballot-core`.

use thiserror::Error;

use crate::item::ItemId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("category not found: {0}")]
  CategoryNotFound(String),

  /// The category exists but has been soft-deleted.
  #[error("category {0} is no longer active")]
  CategoryInactive(String),

  #[error("item not found: {0}")]
  ItemNotFound(ItemId),

  /// Rejected before reaching the store.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// The backing store query failed. Never retried, never masked.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::StoreUnavailable`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
