//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! IP addresses are stored in their canonical text form and view dates as
//! ISO 8601 `YYYY-MM-DD`. Vote tallies come back as signed integers and are
//! checked on the way out.

use std::net::IpAddr;

use ballot_core::{
  category::{Category, CategoryId},
  item::{ItemCounts, ItemId},
};
use chrono::NaiveDate;

use crate::{Error, Result};

pub fn encode_ip(ip: IpAddr) -> String { ip.to_string() }

pub fn encode_date(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

fn decode_count(column: &str, value: i64) -> Result<u64> {
  u64::try_from(value)
    .map_err(|_| Error::Decode(format!("negative {column} count: {value}")))
}

// ─── Raw row types ───────────────────────────────────────────────────────────

pub struct RawCategory {
  pub id:     i64,
  pub name:   String,
  pub active: bool,
}

impl RawCategory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, name: row.get(1)?, active: row.get(2)? })
  }

  pub fn into_category(self) -> Category {
    Category { id: CategoryId(self.id), name: self.name, active: self.active }
  }
}

/// Column order: id, category_id, content, active, slug, up, down,
/// voter_vote.
pub struct RawItemCounts {
  pub id:          i64,
  pub category_id: i64,
  pub content:     String,
  pub active:      bool,
  pub slug:        Option<String>,
  pub up:          i64,
  pub down:        i64,
  pub voter_vote:  Option<bool>,
}

impl RawItemCounts {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      category_id: row.get(1)?,
      content:     row.get(2)?,
      active:      row.get(3)?,
      slug:        row.get(4)?,
      up:          row.get(5)?,
      down:        row.get(6)?,
      voter_vote:  row.get(7)?,
    })
  }

  pub fn into_counts(self) -> Result<ItemCounts> {
    Ok(ItemCounts {
      id:          ItemId(self.id),
      category_id: CategoryId(self.category_id),
      content:     self.content,
      active:      self.active,
      slug:        self.slug,
      up:          decode_count("up", self.up)?,
      down:        decode_count("down", self.down)?,
      voter_vote:  self.voter_vote,
    })
  }
}
