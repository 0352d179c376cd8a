//! Candidate filtering and the uniform random draw.
//!
//! Selection is deliberately independent of ranking: once the candidate set
//! is fixed by the rating range, every candidate is equally likely.

use rand::{Rng, seq::SliceRandom};

use crate::{
  item::{ItemCounts, RatedItem},
  rating::RatingRange,
};

/// Rate every row and keep those whose rating lies in `range`.
pub fn rated_in_range(rows: Vec<ItemCounts>, range: RatingRange) -> Vec<RatedItem> {
  rows
    .into_iter()
    .map(RatedItem::from)
    .filter(|item| range.contains(item.rating))
    .collect()
}

/// Draw one candidate uniformly at random; `None` when there are none.
pub fn draw<R: Rng + ?Sized>(
  candidates: &[RatedItem],
  rng: &mut R,
) -> Option<RatedItem> {
  candidates.choose(rng).cloned()
}
