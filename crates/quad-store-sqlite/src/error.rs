//! Error type for `quad-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] quad_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("account not found: {0}")]
  AccountNotFound(String),

  #[error("account already exists: {0}")]
  AccountExists(String),

  #[error("profile not found: {0}")]
  ProfileNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
