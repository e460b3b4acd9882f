//! Error types for `quad-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("post fields must be a JSON object, got {0}")]
  PostFieldsNotObject(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
