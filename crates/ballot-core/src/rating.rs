//! The smoothed approval rating and inclusive rating ranges.
//!
//! The rating is a Laplace-smoothed percentage: one phantom up-vote and one
//! phantom down-vote are added before taking the ratio, so it is always
//! finite and strictly inside `(0, 100)`, and a fresh item scores 50.

use std::cmp::Ordering;

use crate::{Error, Result, item::RatedItem};

/// `100 * (up + 1) / (up + 1 + down + 1)`.
pub fn rating(up: u64, down: u64) -> f64 {
  let up = up as f64 + 1.0;
  let down = down as f64 + 1.0;
  100.0 * up / (up + down)
}

/// Listing order: rating descending, then item id ascending.
pub fn by_rating_desc(a: &RatedItem, b: &RatedItem) -> Ordering {
  b.rating
    .partial_cmp(&a.rating)
    .unwrap_or(Ordering::Equal)
    .then(a.id.cmp(&b.id))
}

/// An inclusive `[min, max]` filter over ratings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRange {
  min: f64,
  max: f64,
}

impl RatingRange {
  pub const FULL: Self = Self { min: 0.0, max: 100.0 };

  pub fn new(min: f64, max: f64) -> Result<Self> {
    if !min.is_finite() || !max.is_finite() {
      return Err(Error::InvalidInput("rating bounds must be finite".into()));
    }
    if !(0.0..=100.0).contains(&min) || !(0.0..=100.0).contains(&max) {
      return Err(Error::InvalidInput(format!(
        "rating bounds must lie within [0, 100], got [{min}, {max}]"
      )));
    }
    if min > max {
      return Err(Error::InvalidInput(format!(
        "rating range is empty: min {min} exceeds max {max}"
      )));
    }
    Ok(Self { min, max })
  }

  /// Build a range from optional bounds, filling gaps from `defaults`.
  pub fn with_defaults(
    min: Option<f64>,
    max: Option<f64>,
    defaults: Self,
  ) -> Result<Self> {
    Self::new(min.unwrap_or(defaults.min), max.unwrap_or(defaults.max))
  }

  pub fn min(&self) -> f64 { self.min }

  pub fn max(&self) -> f64 { self.max }

  pub fn contains(&self, rating: f64) -> bool {
    rating >= self.min && rating <= self.max
  }
}

impl Default for RatingRange {
  fn default() -> Self { Self::FULL }
}
