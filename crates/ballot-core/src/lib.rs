//! Core types, store contract, and rating/voting logic for Ballot.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! [`Ballot`](service::Ballot) service owns the two process-wide caches and
//! talks to persistence only through [`BallotStore`](store::BallotStore).

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod category;
pub mod clock;
pub mod error;
pub mod item;
pub mod rating;
pub mod selection;
pub mod service;
pub mod store;
pub mod vote;

pub use error::{Error, Result};
pub use service::{Ballot, BallotOptions};

#[cfg(test)]
mod testing;
