//! [`SqliteStore`] — the SQLite implementation of [`BallotStore`].

use std::{net::IpAddr, path::Path};

use ballot_core::{
  category::{Category, CategoryId, CategorySummary},
  item::{ItemCounts, ItemId, NewItem},
  store::BallotStore,
  vote::{VoteOutcome, VoteTransition},
};
use chrono::NaiveDate;
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use crate::{
  Result,
  encode::{RawCategory, RawItemCounts, encode_date, encode_ip},
  schema::SCHEMA,
};

/// Shared projection for item reads; `?2` is the requesting voter.
const ITEM_COUNTS_SELECT: &str = "
  SELECT
    i.id, i.category_id, i.content, i.active, i.slug,
    COUNT(CASE WHEN v.vote = 1 THEN 1 END) AS up,
    COUNT(CASE WHEN v.vote = 0 THEN 1 END) AS down,
    (SELECT mine.vote FROM votes mine
      WHERE mine.item_id = i.id AND mine.voter_ip = ?2) AS voter_vote
  FROM items i
  LEFT JOIN votes v ON v.item_id = i.id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Ballot store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Soft-delete (or restore) a category. Returns `false` if no category has
  /// that name.
  pub async fn set_category_active(&self, name: &str, active: bool) -> Result<bool> {
    let name = name.to_owned();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE categories SET active = ?2 WHERE name = ?1",
          rusqlite::params![name, active],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }

  /// Soft-delete (or restore) an item. Returns `false` if the item is
  /// missing.
  pub async fn set_item_active(&self, item_id: ItemId, active: bool) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE items SET active = ?2 WHERE id = ?1",
          rusqlite::params![item_id.0, active],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }
}

// ─── BallotStore impl ────────────────────────────────────────────────────────

impl BallotStore for SqliteStore {
  type Error = crate::Error;

  // ── Categories ────────────────────────────────────────────────────────────

  async fn find_category_by_name<'a>(&'a self, name: &'a str) -> Result<Option<Category>> {
    let name = name.to_owned();

    let raw: Option<RawCategory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, active FROM categories WHERE name = ?1",
              rusqlite::params![name],
              RawCategory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawCategory::into_category))
  }

  async fn upsert_category<'a>(&'a self, name: &'a str) -> Result<()> {
    let name = name.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO categories (name) VALUES (?1)
           ON CONFLICT (name) DO NOTHING",
          rusqlite::params![name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_active_categories_with_item_counts(&self) -> Result<Vec<CategorySummary>> {
    let rows: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT c.name, COUNT(i.id)
           FROM categories c
           LEFT JOIN items i ON i.category_id = c.id AND i.active = 1
           WHERE c.active = 1
           GROUP BY c.id, c.name",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(name, count)| {
        let item_count = u64::try_from(count)
          .map_err(|_| crate::Error::Decode(format!("negative item count: {count}")))?;
        Ok(CategorySummary { name, item_count })
      })
      .collect()
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn insert_item(&self, item: NewItem) -> Result<ItemId> {
    let id: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO items (category_id, content, slug) VALUES (?1, ?2, ?3)
           RETURNING id",
          rusqlite::params![item.category_id.0, item.content, item.slug],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(ItemId(id))
  }

  async fn list_active_items_with_counts(
    &self,
    category_id: CategoryId,
    voter_ip:    IpAddr,
  ) -> Result<Vec<ItemCounts>> {
    let ip = encode_ip(voter_ip);

    let raws: Vec<RawItemCounts> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{ITEM_COUNTS_SELECT}
           WHERE i.category_id = ?1 AND i.active = 1
           GROUP BY i.id
           ORDER BY i.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![category_id.0, ip], RawItemCounts::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItemCounts::into_counts).collect()
  }

  async fn get_item_with_counts(
    &self,
    item_id:  ItemId,
    voter_ip: IpAddr,
  ) -> Result<Option<ItemCounts>> {
    let ip = encode_ip(voter_ip);

    let raw: Option<RawItemCounts> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{ITEM_COUNTS_SELECT}
           WHERE i.id = ?1 AND i.active = 1
           GROUP BY i.id"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![item_id.0, ip], RawItemCounts::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItemCounts::into_counts).transpose()
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn find_vote(&self, item_id: ItemId, voter_ip: IpAddr) -> Result<Option<bool>> {
    let ip = encode_ip(voter_ip);

    let vote = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT vote FROM votes WHERE item_id = ?1 AND voter_ip = ?2",
              rusqlite::params![item_id.0, ip],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(vote)
  }

  async fn insert_vote(&self, item_id: ItemId, voter_ip: IpAddr, vote: bool) -> Result<bool> {
    let ip = encode_ip(voter_ip);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO votes (item_id, voter_ip, vote)
           SELECT id, ?2, ?3 FROM items WHERE id = ?1 AND active = 1",
          rusqlite::params![item_id.0, ip, vote],
        )?)
      })
      .await?;
    Ok(inserted == 1)
  }

  async fn delete_vote(&self, item_id: ItemId, voter_ip: IpAddr) -> Result<()> {
    let ip = encode_ip(voter_ip);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM votes WHERE item_id = ?1 AND voter_ip = ?2",
          rusqlite::params![item_id.0, ip],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Runs the whole read-then-write toggle inside one immediate transaction,
  /// so concurrent toggles for the same pair serialise on the write lock.
  async fn toggle_vote(
    &self,
    item_id:  ItemId,
    voter_ip: IpAddr,
    vote:     bool,
  ) -> Result<Option<VoteOutcome>> {
    let ip = encode_ip(voter_ip);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let live = tx
          .query_row(
            "SELECT 1 FROM items WHERE id = ?1 AND active = 1",
            rusqlite::params![item_id.0],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !live {
          return Ok(None);
        }

        let current: Option<bool> = tx
          .query_row(
            "SELECT vote FROM votes WHERE item_id = ?1 AND voter_ip = ?2",
            rusqlite::params![item_id.0, ip],
            |row| row.get(0),
          )
          .optional()?;

        let transition = VoteTransition::from_state(current, vote);
        match transition {
          VoteTransition::Retract => {
            tx.execute(
              "DELETE FROM votes WHERE item_id = ?1 AND voter_ip = ?2",
              rusqlite::params![item_id.0, ip],
            )?;
          }
          VoteTransition::Insert | VoteTransition::Switch => {
            tx.execute(
              "INSERT INTO votes (item_id, voter_ip, vote) VALUES (?1, ?2, ?3)
               ON CONFLICT (item_id, voter_ip) DO UPDATE SET vote = excluded.vote",
              rusqlite::params![item_id.0, ip, vote],
            )?;
          }
        }

        tx.commit()?;
        Ok(Some(transition.outcome()))
      })
      .await?;
    Ok(outcome)
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  async fn insert_view_if_absent(
    &self,
    item_id:  ItemId,
    voter_ip: IpAddr,
    date:     NaiveDate,
  ) -> Result<()> {
    let ip = encode_ip(voter_ip);
    let day = encode_date(date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO views (item_id, voter_ip, viewed_on) VALUES (?1, ?2, ?3)
           ON CONFLICT (item_id, voter_ip, viewed_on) DO NOTHING",
          rusqlite::params![item_id.0, ip, day],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
