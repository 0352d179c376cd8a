//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  net::{IpAddr, Ipv4Addr},
  sync::Arc,
};

use ballot_core::{
  Ballot, Error as CoreError,
  item::{ItemId, NewItem},
  rating::RatingRange,
  store::BallotStore,
  vote::VoteOutcome,
};
use chrono::NaiveDate;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ip(s: &str) -> IpAddr { s.parse().unwrap() }

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

async fn count(s: &SqliteStore, table: &'static str) -> i64 {
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    })
    .await
    .unwrap()
}

async fn seed_item(s: &SqliteStore, category: &str, content: &str) -> ItemId {
  s.upsert_category(category).await.unwrap();
  let c = s.find_category_by_name(category).await.unwrap().unwrap();
  s.insert_item(NewItem {
    category_id: c.id,
    content:     content.into(),
    slug:        None,
  })
  .await
  .unwrap()
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_category_is_idempotent() {
  let s = store().await;
  s.upsert_category("colors").await.unwrap();
  let first = s.find_category_by_name("colors").await.unwrap().unwrap();
  s.upsert_category("colors").await.unwrap();
  let second = s.find_category_by_name("colors").await.unwrap().unwrap();

  assert_eq!(first, second);
  assert!(first.active);
  assert_eq!(count(&s, "categories").await, 1);
}

#[tokio::test]
async fn find_missing_category_returns_none() {
  let s = store().await;
  assert!(s.find_category_by_name("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn category_counts_include_empty_and_skip_inactive() {
  let s = store().await;
  seed_item(&s, "colors", "Blue").await;
  let red = seed_item(&s, "colors", "Red").await;
  seed_item(&s, "hidden", "x").await;
  s.upsert_category("empty").await.unwrap();
  s.set_item_active(red, false).await.unwrap();
  s.set_category_active("hidden", false).await.unwrap();

  let mut counts: Vec<_> = s
    .list_active_categories_with_item_counts()
    .await
    .unwrap()
    .into_iter()
    .map(|c| (c.name, c.item_count))
    .collect();
  counts.sort();
  assert_eq!(counts, vec![("colors".into(), 1), ("empty".into(), 0)]);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn item_counts_and_voter_vote() {
  let s = store().await;
  let id = seed_item(&s, "colors", "Blue").await;
  s.insert_vote(id, ip("1.1.1.1"), true).await.unwrap();
  s.insert_vote(id, ip("2.2.2.2"), true).await.unwrap();
  s.insert_vote(id, ip("3.3.3.3"), false).await.unwrap();

  let row = s.get_item_with_counts(id, ip("3.3.3.3")).await.unwrap().unwrap();
  assert_eq!((row.up, row.down), (2, 1));
  assert_eq!(row.voter_vote, Some(false));

  let other = s.get_item_with_counts(id, ip("9.9.9.9")).await.unwrap().unwrap();
  assert_eq!(other.voter_vote, None);
}

#[tokio::test]
async fn inactive_items_are_hidden() {
  let s = store().await;
  let id = seed_item(&s, "colors", "Blue").await;
  let category = s.find_category_by_name("colors").await.unwrap().unwrap();
  s.set_item_active(id, false).await.unwrap();

  assert!(s.get_item_with_counts(id, ip("1.1.1.1")).await.unwrap().is_none());
  assert!(
    s.list_active_items_with_counts(category.id, ip("1.1.1.1"))
      .await
      .unwrap()
      .is_empty()
  );
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_vote_on_missing_item_reports_false() {
  let s = store().await;
  assert!(!s.insert_vote(ItemId(42), ip("1.1.1.1"), true).await.unwrap());
  assert_eq!(count(&s, "votes").await, 0);
}

#[tokio::test]
async fn toggle_vote_walks_the_state_machine() {
  let s = store().await;
  let id = seed_item(&s, "colors", "Blue").await;
  let voter = ip("1.2.3.4");

  assert_eq!(s.toggle_vote(id, voter, true).await.unwrap(), Some(VoteOutcome::Recorded));
  assert_eq!(s.find_vote(id, voter).await.unwrap(), Some(true));

  assert_eq!(s.toggle_vote(id, voter, false).await.unwrap(), Some(VoteOutcome::Recorded));
  assert_eq!(s.find_vote(id, voter).await.unwrap(), Some(false));
  assert_eq!(count(&s, "votes").await, 1);

  assert_eq!(s.toggle_vote(id, voter, false).await.unwrap(), Some(VoteOutcome::Cleared));
  assert_eq!(s.find_vote(id, voter).await.unwrap(), None);
  assert_eq!(count(&s, "votes").await, 0);
}

#[tokio::test]
async fn toggle_vote_on_missing_item_is_none() {
  let s = store().await;
  assert_eq!(s.toggle_vote(ItemId(7), ip("1.1.1.1"), true).await.unwrap(), None);
}

#[tokio::test]
async fn spawned_toggles_on_one_store_apply_in_sequence() {
  let s = store().await;
  let id = seed_item(&s, "colors", "Blue").await;
  let voter = ip("5.5.5.5");

  let tasks: Vec<_> = (0..8)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { s.toggle_vote(id, voter, true).await.unwrap() })
    })
    .collect();
  for task in tasks {
    task.await.unwrap();
  }

  // Calls on one store share its connection thread, so the eight toggles
  // apply one after another: record, clear, ... ends cleared.
  assert_eq!(s.find_vote(id, voter).await.unwrap(), None);
  assert_eq!(count(&s, "votes").await, 0);
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn views_dedup_per_day() {
  let s = store().await;
  let id = seed_item(&s, "colors", "Blue").await;
  let voter = ip("1.1.1.1");

  s.insert_view_if_absent(id, voter, day(1)).await.unwrap();
  s.insert_view_if_absent(id, voter, day(1)).await.unwrap();
  assert_eq!(count(&s, "views").await, 1);

  s.insert_view_if_absent(id, voter, day(2)).await.unwrap();
  s.insert_view_if_absent(id, ip("2.2.2.2"), day(2)).await.unwrap();
  assert_eq!(count(&s, "views").await, 3);
}

// ─── End to end through the service ──────────────────────────────────────────

#[tokio::test]
async fn submit_list_and_vote_round_trip() {
  let ballot = Ballot::new(Arc::new(store().await));
  let voter = IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4));

  let id = ballot.create_item("colors", "Blue sky").await.unwrap();

  let items = ballot.list_items("colors", voter, RatingRange::FULL).await.unwrap();
  let item = items.iter().find(|i| i.id == id).unwrap();
  assert_eq!((item.up, item.down), (0, 0));
  assert_eq!(item.rating, 50.0);

  assert_eq!(ballot.cast_vote(id, voter, true).await.unwrap().code(), 1);
  let items = ballot.list_items("colors", voter, RatingRange::FULL).await.unwrap();
  assert_eq!(items[0].up, 1);
  assert!((items[0].rating - 200.0 / 3.0).abs() < 1e-9);

  assert_eq!(ballot.cast_vote(id, voter, true).await.unwrap().code(), 0);
  let items = ballot.list_items("colors", voter, RatingRange::FULL).await.unwrap();
  assert_eq!(items[0].rating, 50.0);
}

#[tokio::test]
async fn pick_random_records_single_view_per_day() {
  let ballot = Ballot::new(Arc::new(store().await));
  let voter = ip("1.2.3.4");
  ballot.create_item("colors", "Blue sky").await.unwrap();
  let category = ballot.resolve_category("colors").await.unwrap().unwrap();

  for _ in 0..2 {
    let picked = ballot.pick_random(category.id, voter, RatingRange::FULL).await.unwrap();
    assert!(picked.is_some());
  }
  assert_eq!(count(ballot.store(), "views").await, 1);
}

#[tokio::test]
async fn stale_category_is_served_after_deactivation() {
  let ballot = Ballot::new(Arc::new(store().await));
  ballot.create_item("colors", "Blue sky").await.unwrap();
  assert!(ballot.resolve_category("colors").await.unwrap().unwrap().active);

  ballot.store().set_category_active("colors", false).await.unwrap();
  assert!(ballot.resolve_category("colors").await.unwrap().unwrap().active);

  ballot.invalidate_category("colors");
  assert!(matches!(
    ballot.list_items("colors", ip("1.1.1.1"), RatingRange::FULL).await,
    Err(CoreError::CategoryInactive(_))
  ));
}

#[tokio::test]
async fn vote_on_missing_item_surfaces_not_found() {
  let ballot = Ballot::new(Arc::new(store().await));
  assert!(matches!(
    ballot.cast_vote(ItemId(404), ip("1.1.1.1"), true).await,
    Err(CoreError::ItemNotFound(ItemId(404)))
  ));
}
