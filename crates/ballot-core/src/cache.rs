//! The two process-wide caches: name → category, and the category index.
//!
//! Both are lazily populated and tolerate benign races: concurrent misses may
//! each query the store and each write an equivalent value. Map references
//! and lock guards are never held across an `.await`.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::{
  Error, Result,
  category::{Category, CategorySummary},
  store::BallotStore,
};

fn expired(since: DateTime<Utc>, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
  since.checked_add_signed(ttl).is_some_and(|expiry| now >= expiry)
}

// ─── Category resolver ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct CachedCategory {
  category:  Category,
  cached_at: DateTime<Utc>,
}

/// Read-through cache from category name to [`Category`].
///
/// With no TTL the first record seen for a name is served for the lifetime
/// of the resolver, even if the store later flips its `active` flag. Use
/// [`invalidate`](Self::invalidate) or a TTL to bound that staleness.
/// Negative lookups are never cached.
#[derive(Debug, Default)]
pub struct CategoryResolver {
  ttl:     Option<TimeDelta>,
  entries: DashMap<String, CachedCategory>,
}

impl CategoryResolver {
  pub fn new(ttl: Option<TimeDelta>) -> Self {
    Self { ttl, entries: DashMap::new() }
  }

  /// Resolve an already-slugified `name`.
  pub async fn resolve<S: BallotStore>(
    &self,
    store: &S,
    now: DateTime<Utc>,
    name: &str,
  ) -> Result<Option<Category>> {
    if let Some(hit) = self.cached(name, now) {
      debug!(category = name, "category cache hit");
      return Ok(Some(hit));
    }

    debug!(category = name, "category cache miss");
    let found = store.find_category_by_name(name).await.map_err(Error::store)?;
    if let Some(category) = &found {
      self.entries.insert(name.to_owned(), CachedCategory {
        category:  category.clone(),
        cached_at: now,
      });
    }
    Ok(found)
  }

  /// Drop the cached entry for `name`, if any.
  pub fn invalidate(&self, name: &str) {
    self.entries.remove(name);
  }

  fn cached(&self, name: &str, now: DateTime<Utc>) -> Option<Category> {
    let entry = self.entries.get(name)?;
    match self.ttl {
      Some(ttl) if expired(entry.cached_at, ttl, now) => None,
      _ => Some(entry.category.clone()),
    }
  }
}

// ─── Category index ──────────────────────────────────────────────────────────

#[derive(Debug)]
struct Snapshot {
  categories: Arc<Vec<CategorySummary>>,
  refreshed:  DateTime<Utc>,
}

/// Periodically refreshed list of active categories and their item counts,
/// ordered by count descending then name ascending.
#[derive(Debug)]
pub struct CategoryIndex {
  ttl:      TimeDelta,
  snapshot: RwLock<Option<Snapshot>>,
}

impl CategoryIndex {
  pub const DEFAULT_TTL_SECS: i64 = 300;

  pub fn new(ttl: TimeDelta) -> Self { Self { ttl, snapshot: RwLock::new(None) } }

  pub async fn list<S: BallotStore>(
    &self,
    store: &S,
    now: DateTime<Utc>,
  ) -> Result<Arc<Vec<CategorySummary>>> {
    if let Some(fresh) = self.fresh(now) {
      return Ok(fresh);
    }

    let mut categories = store
      .list_active_categories_with_item_counts()
      .await
      .map_err(Error::store)?;
    categories.sort_by(|a, b| {
      b.item_count
        .cmp(&a.item_count)
        .then_with(|| a.name.cmp(&b.name))
    });
    debug!(count = categories.len(), "refreshed category index");

    let categories = Arc::new(categories);
    *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Snapshot {
      categories: Arc::clone(&categories),
      refreshed:  now,
    });
    Ok(categories)
  }

  /// Force the next [`list`](Self::list) to refresh from the store.
  pub fn invalidate(&self) {
    *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
  }

  fn fresh(&self, now: DateTime<Utc>) -> Option<Arc<Vec<CategorySummary>>> {
    let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
    snapshot
      .as_ref()
      .filter(|s| !expired(s.refreshed, self.ttl, now))
      .map(|s| Arc::clone(&s.categories))
  }
}

impl Default for CategoryIndex {
  fn default() -> Self { Self::new(TimeDelta::seconds(Self::DEFAULT_TTL_SECS)) }
}
