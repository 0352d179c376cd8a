//! Handlers for `/categories` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/categories` | Active categories, most items first |
//! | `GET`  | `/categories/{name}` | 404 if unknown; the record may be cached |
//! | `GET`  | `/categories/{name}/random` | `?min&max`; `null` when nothing qualifies |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use ballot_core::{
  category::{Category, CategoryName, CategorySummary},
  item::RatedItem,
  store::BallotStore,
};

use crate::{ApiState, RangeParams, active_category, error::ApiError, voter::Voter};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /categories`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<CategorySummary>>, ApiError>
where
  S: BallotStore + 'static,
{
  let categories = state.ballot.list_categories().await?;
  Ok(Json(Vec::clone(&categories)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /categories/{name}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<Category>, ApiError>
where
  S: BallotStore + 'static,
{
  let name = CategoryName::parse(&name)?;
  let category = state
    .ballot
    .resolve_category(name.as_str())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("category {name} not found")))?;
  Ok(Json(category))
}

// ─── Random ───────────────────────────────────────────────────────────────────

/// `GET /categories/{name}/random[?min=..][&max=..]`
pub async fn random<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  Voter(voter_ip): Voter,
  Query(params): Query<RangeParams>,
) -> Result<Json<Option<RatedItem>>, ApiError>
where
  S: BallotStore + 'static,
{
  let category = active_category(&state, &name).await?;
  let range = params.resolve(state.settings.default_range)?;
  let item = state.ballot.pick_random(category.id, voter_ip, range).await?;
  Ok(Json(item))
}
