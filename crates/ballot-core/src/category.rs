//! Categories — named buckets of items.
//!
//! A category springs into existence the first time an item is submitted
//! under its name and is never hard-deleted; `active = false` marks a soft
//! deletion.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Store-assigned category identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A category record. Immutable once created except for `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:     CategoryId,
  pub name:   String,
  pub active: bool,
}

/// One row of the category index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
  pub name:       String,
  /// Number of active items in the category.
  pub item_count: u64,
}

/// Lowercase `text` and collapse every run of characters outside `[a-z0-9]`
/// into a single `-`, trimming dashes from both ends.
pub fn slugify(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut pending_dash = false;
  for c in text.chars().flat_map(char::to_lowercase) {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
      if pending_dash && !out.is_empty() {
        out.push('-');
      }
      pending_dash = false;
      out.push(c);
    } else {
      pending_dash = true;
    }
  }
  out
}

/// A category name that has already been slugified to `[a-z0-9-]+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryName(String);

impl CategoryName {
  /// Slugify `raw`; an empty slug is rejected.
  pub fn parse(raw: &str) -> Result<Self> {
    let slug = slugify(raw);
    if slug.is_empty() {
      return Err(Error::InvalidInput(format!(
        "category name {raw:?} has no usable characters"
      )));
    }
    Ok(Self(slug))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CategoryName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for CategoryName {
  fn as_ref(&self) -> &str { &self.0 }
}
