//! Runtime server configuration, deserialised from `config.toml` and
//! `BALLOT_*` environment variables.

use std::path::{Path, PathBuf};

use ballot_api::ApiSettings;
use ballot_core::{BallotOptions, rating::RatingRange};
use chrono::TimeDelta;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  pub store_path:              PathBuf,
  pub trust_proxy:             bool,
  pub category_list_ttl_secs:  u32,
  /// Unset keeps resolved categories for the life of the process.
  pub category_cache_ttl_secs: Option<u32>,
  pub default_min_rating:      f64,
  pub default_max_rating:      f64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                    "127.0.0.1".to_string(),
      port:                    4242,
      store_path:              PathBuf::from("ballot.db"),
      trust_proxy:             false,
      category_list_ttl_secs:  300,
      category_cache_ttl_secs: None,
      default_min_rating:      30.0,
      default_max_rating:      100.0,
    }
  }
}

impl ServerConfig {
  pub fn ballot_options(&self) -> BallotOptions {
    BallotOptions {
      category_cache_ttl: self
        .category_cache_ttl_secs
        .map(|s| TimeDelta::seconds(i64::from(s))),
      category_list_ttl:  TimeDelta::seconds(i64::from(self.category_list_ttl_secs)),
    }
  }

  pub fn api_settings(&self) -> ballot_core::Result<ApiSettings> {
    Ok(ApiSettings {
      trust_proxy:   self.trust_proxy,
      default_range: RatingRange::new(self.default_min_rating, self.default_max_rating)?,
    })
  }

  /// `store_path` with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
