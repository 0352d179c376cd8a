//! In-memory [`BallotStore`] and a hand-driven clock for unit tests.

use std::{
  collections::{HashMap, HashSet},
  net::IpAddr,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone as _, Utc};
use thiserror::Error;

use crate::{
  category::{Category, CategoryId, CategorySummary},
  clock::Clock,
  item::{ItemCounts, ItemId, NewItem},
  store::BallotStore,
};

#[derive(Debug, Error)]
#[error("memory store is offline")]
pub struct Offline;

#[derive(Debug, Clone)]
struct StoredItem {
  id:          ItemId,
  category_id: CategoryId,
  content:     String,
  active:      bool,
  slug:        Option<String>,
}

#[derive(Debug, Default)]
struct Tables {
  categories: Vec<Category>,
  items:      Vec<StoredItem>,
  votes:      HashMap<(ItemId, IpAddr), bool>,
  views:      HashSet<(ItemId, IpAddr, NaiveDate)>,
}

/// Per-contract query counters.
#[derive(Debug, Default)]
pub struct QueryCounts {
  pub find_category:   AtomicUsize,
  pub list_categories: AtomicUsize,
  pub views:           AtomicUsize,
}

fn bump(counter: &AtomicUsize) { counter.fetch_add(1, Ordering::SeqCst); }

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables:      Mutex<Tables>,
  offline:     AtomicBool,
  blind:       AtomicBool,
  pub queries: QueryCounts,
}

impl MemoryStore {
  pub fn go_offline(&self) { self.offline.store(true, Ordering::SeqCst); }

  /// Make category lookups miss while writes keep succeeding.
  pub fn hide_categories(&self) { self.blind.store(true, Ordering::SeqCst); }

  pub fn set_category_active(&self, name: &str, active: bool) {
    let mut t = self.tables.lock().unwrap();
    for c in t.categories.iter_mut().filter(|c| c.name == name) {
      c.active = active;
    }
  }

  pub fn set_item_active(&self, id: ItemId, active: bool) {
    let mut t = self.tables.lock().unwrap();
    for i in t.items.iter_mut().filter(|i| i.id == id) {
      i.active = active;
    }
  }

  pub fn vote_row(&self, id: ItemId, ip: IpAddr) -> Option<bool> {
    self.tables.lock().unwrap().votes.get(&(id, ip)).copied()
  }

  pub fn vote_rows(&self) -> usize { self.tables.lock().unwrap().votes.len() }

  pub fn view_rows(&self) -> usize { self.tables.lock().unwrap().views.len() }

  fn check(&self) -> Result<(), Offline> {
    if self.offline.load(Ordering::SeqCst) { Err(Offline) } else { Ok(()) }
  }

  fn counts(t: &Tables, item: &StoredItem, voter_ip: IpAddr) -> ItemCounts {
    let votes = t.votes.iter().filter(|((id, _), _)| *id == item.id);
    let up = votes.clone().filter(|(_, v)| **v).count() as u64;
    let down = votes.filter(|(_, v)| !**v).count() as u64;
    ItemCounts {
      id: item.id,
      category_id: item.category_id,
      content: item.content.clone(),
      active: item.active,
      slug: item.slug.clone(),
      up,
      down,
      voter_vote: t.votes.get(&(item.id, voter_ip)).copied(),
    }
  }
}

impl BallotStore for MemoryStore {
  type Error = Offline;

  async fn find_category_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> Result<Option<Category>, Offline> {
    self.check()?;
    bump(&self.queries.find_category);
    if self.blind.load(Ordering::SeqCst) {
      return Ok(None);
    }
    let t = self.tables.lock().unwrap();
    Ok(t.categories.iter().find(|c| c.name == name).cloned())
  }

  async fn upsert_category<'a>(&'a self, name: &'a str) -> Result<(), Offline> {
    self.check()?;
    let mut t = self.tables.lock().unwrap();
    if !t.categories.iter().any(|c| c.name == name) {
      let id = CategoryId(t.categories.len() as i64 + 1);
      t.categories.push(Category { id, name: name.to_owned(), active: true });
    }
    Ok(())
  }

  async fn list_active_categories_with_item_counts(
    &self,
  ) -> Result<Vec<CategorySummary>, Offline> {
    self.check()?;
    bump(&self.queries.list_categories);
    let t = self.tables.lock().unwrap();
    Ok(
      t.categories
        .iter()
        .filter(|c| c.active)
        .map(|c| CategorySummary {
          name:       c.name.clone(),
          item_count: t
            .items
            .iter()
            .filter(|i| i.category_id == c.id && i.active)
            .count() as u64,
        })
        .collect(),
    )
  }

  async fn insert_item(&self, item: NewItem) -> Result<ItemId, Offline> {
    self.check()?;
    let mut t = self.tables.lock().unwrap();
    let id = ItemId(t.items.len() as i64 + 1);
    t.items.push(StoredItem {
      id,
      category_id: item.category_id,
      content: item.content,
      active: true,
      slug: item.slug,
    });
    Ok(id)
  }

  async fn list_active_items_with_counts(
    &self,
    category_id: CategoryId,
    voter_ip: IpAddr,
  ) -> Result<Vec<ItemCounts>, Offline> {
    self.check()?;
    let t = self.tables.lock().unwrap();
    Ok(
      t.items
        .iter()
        .filter(|i| i.category_id == category_id && i.active)
        .map(|i| Self::counts(&t, i, voter_ip))
        .collect(),
    )
  }

  async fn get_item_with_counts(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
  ) -> Result<Option<ItemCounts>, Offline> {
    self.check()?;
    let t = self.tables.lock().unwrap();
    Ok(
      t.items
        .iter()
        .find(|i| i.id == item_id && i.active)
        .map(|i| Self::counts(&t, i, voter_ip)),
    )
  }

  async fn find_vote(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
  ) -> Result<Option<bool>, Offline> {
    self.check()?;
    Ok(self.vote_row(item_id, voter_ip))
  }

  async fn insert_vote(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
    vote: bool,
  ) -> Result<bool, Offline> {
    self.check()?;
    let mut t = self.tables.lock().unwrap();
    if !t.items.iter().any(|i| i.id == item_id && i.active) {
      return Ok(false);
    }
    t.votes.insert((item_id, voter_ip), vote);
    Ok(true)
  }

  async fn delete_vote(&self, item_id: ItemId, voter_ip: IpAddr) -> Result<(), Offline> {
    self.check()?;
    self.tables.lock().unwrap().votes.remove(&(item_id, voter_ip));
    Ok(())
  }

  async fn insert_view_if_absent(
    &self,
    item_id: ItemId,
    voter_ip: IpAddr,
    date: NaiveDate,
  ) -> Result<(), Offline> {
    self.check()?;
    bump(&self.queries.views);
    self.tables.lock().unwrap().views.insert((item_id, voter_ip, date));
    Ok(())
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
  pub fn new() -> Self {
    Self(Mutex::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()))
  }

  pub fn advance(&self, by: TimeDelta) { *self.0.lock().unwrap() += by; }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> { *self.0.lock().unwrap() }
}
