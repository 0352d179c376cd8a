//! The `BallotStore` trait — the query contracts the core consumes.
//!
//! The trait is implemented by storage backends (e.g. `ballot-store-sqlite`).
//! Each method is a single parameterised query; the core never sees SQL.
//! `None`/`false` results mean genuine absence, never a swallowed failure.

use std::{future::Future, net::IpAddr};

use chrono::NaiveDate;

use crate::{
  category::{Category, CategoryId, CategorySummary},
  item::{ItemCounts, ItemId, NewItem},
  vote::{VoteOutcome, VoteTransition},
};

/// Abstraction over the persistent store backing a [`crate::Ballot`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BallotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Categories ────────────────────────────────────────────────────────

  /// Point lookup by (already slugified) name.
  fn find_category_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + 'a;

  /// Create the category if absent; a no-op if it already exists.
  fn upsert_category<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Every active category with its count of active items, zero included.
  /// Order is unspecified; the category index sorts.
  fn list_active_categories_with_item_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<CategorySummary>, Self::Error>> + Send + '_;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Insert an item and return its new id.
  fn insert_item(
    &self,
    item: NewItem,
  ) -> impl Future<Output = Result<ItemId, Self::Error>> + Send + '_;

  /// Active items of a category with their up/down counts and `voter_ip`'s
  /// own vote, in a single query.
  fn list_active_items_with_counts(
    &self,
    category_id: CategoryId,
    voter_ip: IpAddr,
  ) -> impl Future<Output = Result<Vec<ItemCounts>, Self::Error>> + Send + '_;

  /// A single active item with counts. Returns `None` if the item is missing
  /// or soft-deleted.
  fn get_item_with_counts(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
  ) -> impl Future<Output = Result<Option<ItemCounts>, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  fn find_vote(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
  ) -> impl Future<Output = Result<Option<bool>, Self::Error>> + Send + '_;

  /// Insert a vote row. Returns `false` when no active item `item_id` exists.
  fn insert_vote(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
    vote: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn delete_vote(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply the vote toggle for `(item_id, voter_ip)` and report the outcome.
  /// Returns `None` when the item does not exist.
  ///
  /// The default composes [`find_vote`](Self::find_vote),
  /// [`delete_vote`](Self::delete_vote) and
  /// [`insert_vote`](Self::insert_vote) as separate queries, so two
  /// concurrent toggles by the same voter can interleave. Backends that can
  /// run the sequence atomically should override it.
  fn toggle_vote(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
    vote: bool,
  ) -> impl Future<Output = Result<Option<VoteOutcome>, Self::Error>> + Send + '_
  {
    async move {
      let current = self.find_vote(item_id, voter_ip).await?;
      let transition = VoteTransition::from_state(current, vote);
      match transition {
        VoteTransition::Insert => {
          if !self.insert_vote(item_id, voter_ip, vote).await? {
            return Ok(None);
          }
        }
        VoteTransition::Retract => self.delete_vote(item_id, voter_ip).await?,
        VoteTransition::Switch => {
          self.delete_vote(item_id, voter_ip).await?;
          if !self.insert_vote(item_id, voter_ip, vote).await? {
            return Ok(None);
          }
        }
      }
      Ok(Some(transition.outcome()))
    }
  }

  // ── Views ─────────────────────────────────────────────────────────────

  /// Record that `voter_ip` was shown `item_id` on `date`. A no-op when the
  /// row already exists.
  fn insert_view_if_absent(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
    date: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
