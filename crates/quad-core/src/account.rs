//! Accounts as supplied by the identity subsystem.

use serde::{Deserialize, Serialize};

/// An account as it appears in identity trigger payloads.
///
/// Field names follow the identity subsystem's wire format (`uid`,
/// `displayName`, `photoURL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub uid:          String,
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default, rename = "displayName")]
  pub display_name: Option<String>,
  #[serde(default, rename = "photoURL")]
  pub photo_url:    Option<String>,
}

impl Account {
  pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
    Self {
      uid:          uid.into(),
      email:        Some(email.into()),
      display_name: None,
      photo_url:    None,
    }
  }

  /// The email address, or `""` when the account has none.
  pub fn email_or_empty(&self) -> &str { self.email.as_deref().unwrap_or("") }
}
