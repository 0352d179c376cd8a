//! [`Ballot`] — the service façade the route layer talks to.
//!
//! Owns the store handle, the clock, and both category caches. Every
//! operation returns a value, `None` for genuine absence, or an [`Error`];
//! nothing here knows about HTTP.

use std::{net::IpAddr, sync::Arc};

use chrono::TimeDelta;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  cache::{CategoryIndex, CategoryResolver},
  category::{Category, CategoryId, CategoryName, CategorySummary, slugify},
  clock::{Clock, SystemClock},
  item::{ItemId, NewItem, RatedItem},
  rating::{RatingRange, by_rating_desc},
  selection,
  store::BallotStore,
  vote::VoteOutcome,
};

/// Cache lifetimes for a [`Ballot`].
#[derive(Debug, Clone, Copy)]
pub struct BallotOptions {
  /// How long a resolved category is trusted. `None` keeps it for the life
  /// of the service.
  pub category_cache_ttl: Option<TimeDelta>,
  /// How long a category index snapshot is served before a refresh.
  pub category_list_ttl:  TimeDelta,
}

impl Default for BallotOptions {
  fn default() -> Self {
    Self {
      category_cache_ttl: None,
      category_list_ttl:  TimeDelta::seconds(CategoryIndex::DEFAULT_TTL_SECS),
    }
  }
}

fn store_failure<E>(op: &'static str, err: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  warn!(op, error = %err, "store query failed");
  Error::store(err)
}

pub struct Ballot<S, C = SystemClock> {
  store:      Arc<S>,
  clock:      C,
  categories: CategoryResolver,
  index:      CategoryIndex,
}

impl<S: BallotStore> Ballot<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_options(store, BallotOptions::default()) }

  pub fn with_options(store: Arc<S>, options: BallotOptions) -> Self {
    Self::with_clock(store, options, SystemClock)
  }
}

impl<S: BallotStore, C: Clock> Ballot<S, C> {
  pub fn with_clock(store: Arc<S>, options: BallotOptions, clock: C) -> Self {
    Self {
      store,
      clock,
      categories: CategoryResolver::new(options.category_cache_ttl),
      index: CategoryIndex::new(options.category_list_ttl),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  // ── Categories ────────────────────────────────────────────────────────

  /// Resolve an already-slugified category name through the cache.
  pub async fn resolve_category(&self, name: &str) -> Result<Option<Category>> {
    self
      .categories
      .resolve(self.store.as_ref(), self.clock.now(), name)
      .await
  }

  /// Forget the cached record for `name`, e.g. after toggling `active`.
  pub fn invalidate_category(&self, name: &str) {
    self.categories.invalidate(name);
    self.index.invalidate();
  }

  pub async fn list_categories(&self) -> Result<Arc<Vec<CategorySummary>>> {
    self.index.list(self.store.as_ref(), self.clock.now()).await
  }

  async fn active_category(&self, name: &str) -> Result<Category> {
    let category = self
      .resolve_category(name)
      .await?
      .ok_or_else(|| Error::CategoryNotFound(name.to_owned()))?;
    if !category.active {
      return Err(Error::CategoryInactive(category.name));
    }
    Ok(category)
  }

  // ── Items ─────────────────────────────────────────────────────────────

  /// Active items of `category` within `range`, best rated first; ties go to
  /// the older (lower id) item.
  pub async fn list_items(
    &self,
    category: &str,
    voter_ip: IpAddr,
    range: RatingRange,
  ) -> Result<Vec<RatedItem>> {
    let category = self.active_category(category).await?;
    let rows = self
      .store
      .list_active_items_with_counts(category.id, voter_ip)
      .await
      .map_err(|e| store_failure("list_active_items_with_counts", e))?;
    let mut items = selection::rated_in_range(rows, range);
    items.sort_by(by_rating_desc);
    Ok(items)
  }

  pub async fn get_item(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
  ) -> Result<Option<RatedItem>> {
    let row = self
      .store
      .get_item_with_counts(item_id, voter_ip)
      .await
      .map_err(|e| store_failure("get_item_with_counts", e))?;
    Ok(row.map(RatedItem::from))
  }

  /// [`get_item`](Self::get_item) scoped to `category_id`, recording a view
  /// for today when found. An item filed under another category is `None`.
  pub async fn view_item(
    &self,
    category_id: CategoryId,
    item_id: ItemId,
    voter_ip: IpAddr,
  ) -> Result<Option<RatedItem>> {
    let item = self.get_item(item_id, voter_ip).await?;
    let Some(item) = item.filter(|i| i.category_id == category_id) else {
      return Ok(None);
    };
    self.record_view(item.id, voter_ip).await?;
    Ok(Some(item))
  }

  /// Submit `content` under `category`, creating the category on first use.
  pub async fn create_item(&self, category: &str, content: &str) -> Result<ItemId> {
    let content = content.trim();
    if content.is_empty() {
      return Err(Error::InvalidInput("content must not be empty".into()));
    }
    let name = CategoryName::parse(category)?;

    self
      .store
      .upsert_category(name.as_str())
      .await
      .map_err(|e| store_failure("upsert_category", e))?;

    // The upsert succeeded, so a miss here is a store fault rather than
    // an absent category.
    let category = self.resolve_category(name.as_str()).await?.ok_or_else(|| {
      warn!(category = %name, "category missing immediately after upsert");
      Error::StoreUnavailable(
        format!("category {name} vanished after upsert").into(),
      )
    })?;
    if !category.active {
      return Err(Error::CategoryInactive(category.name));
    }

    let slug = Some(slugify(content)).filter(|s| !s.is_empty());
    let id = self
      .store
      .insert_item(NewItem {
        category_id: category.id,
        content: content.to_owned(),
        slug,
      })
      .await
      .map_err(|e| store_failure("insert_item", e))?;

    info!(item = %id, category = %category.name, "item created");
    Ok(id)
  }

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Toggle `voter_ip`'s vote on `item_id` towards `vote` (`true` = up).
  pub async fn cast_vote(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
    vote: bool,
  ) -> Result<VoteOutcome> {
    let outcome = self
      .store
      .toggle_vote(item_id, voter_ip, vote)
      .await
      .map_err(|e| store_failure("toggle_vote", e))?
      .ok_or(Error::ItemNotFound(item_id))?;
    debug!(item = %item_id, %voter_ip, vote, ?outcome, "vote cast");
    Ok(outcome)
  }

  // ── Selection ─────────────────────────────────────────────────────────

  /// Draw one active item of `category_id` uniformly from those rated within
  /// `range`, and record that `voter_ip` viewed it today. `None` when no item
  /// qualifies; no view is recorded then.
  pub async fn pick_random(
    &self,
    category_id: CategoryId,
    voter_ip: IpAddr,
    range: RatingRange,
  ) -> Result<Option<RatedItem>> {
    let rows = self
      .store
      .list_active_items_with_counts(category_id, voter_ip)
      .await
      .map_err(|e| store_failure("list_active_items_with_counts", e))?;
    let candidates = selection::rated_in_range(rows, range);
    let picked = {
      let mut rng = rand::thread_rng();
      selection::draw(&candidates, &mut rng)
    };

    let Some(item) = picked else {
      debug!(category = %category_id, "no candidates in range");
      return Ok(None);
    };
    self.record_view(item.id, voter_ip).await?;
    Ok(Some(item))
  }

  async fn record_view(&self, item_id: ItemId, voter_ip: IpAddr) -> Result<()> {
    let today = self.clock.now().date_naive();
    self
      .store
      .insert_view_if_absent(item_id, voter_ip, today)
      .await
      .map_err(|e| store_failure("insert_view_if_absent", e))
  }
}
