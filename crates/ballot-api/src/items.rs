//! Handlers for `/categories/{name}/items` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/categories/{name}/items` | `?min&max`; best rated first |
//! | `POST` | `/categories/{name}/items` | Body: `{"content":"..."}`; 201 + `{"id":..}` |
//! | `GET`  | `/categories/{name}/items/{id}` | Counts as a view |
//! | `POST` | `/categories/{name}/items/{id}/vote` | Body: `{"vote":true}`; returns `1` or `0` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use ballot_core::{
  category::CategoryName,
  item::{ItemId, RatedItem},
  store::BallotStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiState, RangeParams, active_category, error::ApiError, voter::Voter};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /categories/{name}/items[?min=..][&max=..]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  Voter(voter_ip): Voter,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<RatedItem>>, ApiError>
where
  S: BallotStore + 'static,
{
  let name = CategoryName::parse(&name)?;
  let range = params.resolve(state.settings.default_range)?;
  let items = state.ballot.list_items(name.as_str(), voter_ip, range).await?;
  Ok(Json(items))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content: String,
}

/// `POST /categories/{name}/items` — creates the category on first use.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BallotStore + 'static,
{
  let id = state.ballot.create_item(&name, &body.content).await?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /categories/{name}/items/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path((name, id)): Path<(String, i64)>,
  Voter(voter_ip): Voter,
) -> Result<Json<RatedItem>, ApiError>
where
  S: BallotStore + 'static,
{
  let category = active_category(&state, &name).await?;
  let item = state
    .ballot
    .view_item(category.id, ItemId(id), voter_ip)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;
  Ok(Json(item))
}

// ─── Vote ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  /// `true` for up, `false` for down.
  pub vote: bool,
}

/// `POST /categories/{name}/items/{id}/vote`
pub async fn vote<S>(
  State(state): State<ApiState<S>>,
  Path((name, id)): Path<(String, i64)>,
  Voter(voter_ip): Voter,
  Json(body): Json<VoteBody>,
) -> Result<Json<u8>, ApiError>
where
  S: BallotStore + 'static,
{
  let category = active_category(&state, &name).await?;
  let item_id = ItemId(id);
  let filed_here = state
    .ballot
    .get_item(item_id, voter_ip)
    .await?
    .is_some_and(|item| item.category_id == category.id);
  if !filed_here {
    return Err(ApiError::NotFound(format!("item {id} not found")));
  }

  let outcome = state.ballot.cast_vote(item_id, voter_ip, body.vote).await?;
  Ok(Json(outcome.code()))
}
