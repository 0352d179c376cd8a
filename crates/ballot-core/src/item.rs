//! Items — single submitted content units, each owned by one category.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{category::CategoryId, rating::rating};

/// Store-assigned item identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// An item row joined with its vote tallies, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCounts {
  pub id:          ItemId,
  pub category_id: CategoryId,
  pub content:     String,
  pub active:      bool,
  pub slug:        Option<String>,
  pub up:          u64,
  pub down:        u64,
  /// The requesting voter's own vote on this item, if any.
  pub voter_vote:  Option<bool>,
}

/// The read model handed to callers: an item with its computed rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedItem {
  pub id:          ItemId,
  pub category_id: CategoryId,
  pub content:     String,
  pub active:      bool,
  pub slug:        Option<String>,
  pub up:          u64,
  pub down:        u64,
  pub rating:      f64,
  pub voter_vote:  Option<bool>,
}

impl From<ItemCounts> for RatedItem {
  fn from(row: ItemCounts) -> Self {
    Self {
      rating:      rating(row.up, row.down),
      id:          row.id,
      category_id: row.category_id,
      content:     row.content,
      active:      row.active,
      slug:        row.slug,
      up:          row.up,
      down:        row.down,
      voter_vote:  row.voter_vote,
    }
  }
}

/// Input to [`crate::store::BallotStore::insert_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
  pub category_id: CategoryId,
  /// Already trimmed and non-empty.
  pub content:     String,
  pub slug:        Option<String>,
}
