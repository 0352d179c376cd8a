//! JSON API for Ballot.
//!
//! Exposes an axum [`Router`] backed by a [`Ballot`] over any
//! [`BallotStore`]. TLS and transport concerns are the caller's
//! responsibility. Serve it with
//! `into_make_service_with_connect_info::<SocketAddr>()` so voters can be
//! identified by peer address.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ballot_api::api_router(state))
//! ```

pub mod categories;
pub mod error;
pub mod items;
pub mod voter;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use ballot_core::{
  Ballot,
  category::{Category, CategoryName},
  rating::RatingRange,
  store::BallotStore,
};
use serde::Deserialize;

pub use error::ApiError;

// ─── State ────────────────────────────────────────────────────────────────────

/// Request-independent knobs for the API.
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
  /// Read the voter from `X-Forwarded-For` instead of the peer address.
  pub trust_proxy:   bool,
  /// Applied when a request leaves `min` or `max` out.
  pub default_range: RatingRange,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self { trust_proxy: false, default_range: RatingRange::FULL }
  }
}

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub ballot:   Arc<Ballot<S>>,
  pub settings: ApiSettings,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { ballot: Arc::clone(&self.ballot), settings: self.settings }
  }
}

// ─── Shared extractors and helpers ────────────────────────────────────────────

/// `?min=..&max=..` rating bounds; either may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
  pub min: Option<f64>,
  pub max: Option<f64>,
}

impl RangeParams {
  pub fn resolve(&self, defaults: RatingRange) -> Result<RatingRange, ApiError> {
    Ok(RatingRange::with_defaults(self.min, self.max, defaults)?)
  }
}

/// Slugify `raw`, resolve it, and insist the category is live.
async fn active_category<S>(state: &ApiState<S>, raw: &str) -> Result<Category, ApiError>
where
  S: BallotStore + 'static,
{
  let name = CategoryName::parse(raw)?;
  let category = state
    .ballot
    .resolve_category(name.as_str())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("category {name} not found")))?;
  if !category.active {
    return Err(ApiError::Gone(format!("category {name} has been deleted")));
  }
  Ok(category)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: BallotStore + 'static,
{
  Router::new()
    // Categories
    .route("/categories", get(categories::list::<S>))
    .route("/categories/{name}", get(categories::get_one::<S>))
    .route("/categories/{name}/random", get(categories::random::<S>))
    // Items
    .route("/categories/{name}/items", get(items::list::<S>).post(items::create::<S>))
    .route("/categories/{name}/items/{id}", get(items::get_one::<S>))
    .route("/categories/{name}/items/{id}/vote", post(items::vote::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
