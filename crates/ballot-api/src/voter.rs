//! The [`Voter`] extractor: who is voting, keyed by IP address.

use std::net::{IpAddr, SocketAddr};

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::{HeaderMap, request::Parts},
};
use ballot_core::store::BallotStore;

use crate::{ApiState, error::ApiError};

/// The requesting client's IP address.
///
/// Taken from the first `X-Forwarded-For` hop when the API trusts its proxy,
/// otherwise from the peer address supplied by
/// `into_make_service_with_connect_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voter(pub IpAddr);

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
  headers
    .get("x-forwarded-for")?
    .to_str()
    .ok()?
    .split(',')
    .next()?
    .trim()
    .parse()
    .ok()
}

impl<S> FromRequestParts<ApiState<S>> for Voter
where
  S: BallotStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    if state.settings.trust_proxy
      && let Some(ip) = forwarded_for(&parts.headers)
    {
      return Ok(Voter(ip));
    }
    parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| Voter(addr.ip()))
      .ok_or_else(|| ApiError::BadRequest("client address unavailable".into()))
  }
}
