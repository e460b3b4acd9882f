//! Handler configuration.

use serde::Deserialize;

use crate::{Error, Result};

/// Tunables shared by the handlers, deserialised from the `functions` table
/// of the server configuration. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FunctionsConfig {
  /// Emails must end with this suffix, compared case-sensitively.
  pub allowed_email_suffix:       String,
  /// Message carried by a pre-create rejection.
  pub rejection_message:          String,
  /// Reject disallowed signups before the account is committed.
  pub before_create_enabled:      bool,
  /// Delete disallowed accounts after they are committed.
  pub validate_new_user_enabled:  bool,
  /// Posts read and deleted per atomic batch.
  pub sweep_chunk_size:           usize,
  /// Title used when a chat has no listing title.
  pub default_notification_title: String,
  /// Notification bodies are cut to this many characters.
  pub notification_body_limit:    usize,
}

impl Default for FunctionsConfig {
  fn default() -> Self {
    Self {
      allowed_email_suffix:       "@vit.ac.in".to_string(),
      rejection_message:          "Access restricted to VIT Chennai students only. Please use \
                                   your @vit.ac.in email."
        .to_string(),
      before_create_enabled:      true,
      validate_new_user_enabled:  true,
      sweep_chunk_size:           500,
      default_notification_title: "New Message".to_string(),
      notification_body_limit:    100,
    }
  }
}

impl FunctionsConfig {
  /// Reject settings that would make a handler misbehave.
  pub fn validate(&self) -> Result<()> {
    if self.allowed_email_suffix.is_empty() {
      return Err(Error::InvalidConfig(
        "allowed_email_suffix must not be empty".to_string(),
      ));
    }
    if self.sweep_chunk_size == 0 {
      return Err(Error::InvalidConfig(
        "sweep_chunk_size must be at least 1".to_string(),
      ));
    }
    Ok(())
  }
}
