//! Signup gatekeeper.
//!
//! Two wirings of the same [`SignupPolicy`]: pre-create interception rejects
//! the signup outright, post-create correction deletes an account that was
//! already committed. Either can be switched off independently.

use quad_core::{
  account::Account,
  policy::{SignupPolicy, Verdict},
  store::IdentityProvider,
};
use thiserror::Error;

use crate::outcome::{Effect, HandlerError, Outcome, Skip};

/// Error code carried by every [`Rejection`].
pub const PERMISSION_DENIED: &str = "permission-denied";

/// A pre-create rejection; aborts the account creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct Rejection {
  pub code:    &'static str,
  pub message: String,
}

impl Rejection {
  pub fn permission_denied(message: impl Into<String>) -> Self {
    Self { code: PERMISSION_DENIED, message: message.into() }
  }
}

/// Allow the account to be created, or reject it with `message`.
///
/// Has no side effects.
pub fn before_create(
  policy: &dyn SignupPolicy,
  enabled: bool,
  message: &str,
  account: &Account,
) -> Result<(), Rejection> {
  if !enabled {
    return Ok(());
  }
  match policy.check(account.email_or_empty()) {
    Verdict::Allow => Ok(()),
    Verdict::Deny => Err(Rejection::permission_denied(message)),
  }
}

/// Delete `account` from the identity subsystem if it fails the policy.
pub async fn validate_new_user<I>(
  identity: &I,
  policy: &dyn SignupPolicy,
  enabled: bool,
  account: &Account,
) -> Outcome
where
  I: IdentityProvider,
{
  if !enabled {
    return Outcome::Skipped(Skip::Disabled);
  }
  if policy.check(account.email_or_empty()).is_allowed() {
    return Outcome::Skipped(Skip::EmailAllowed);
  }

  tracing::info!(
    uid = %account.uid,
    email = account.email_or_empty(),
    "deleting unauthorized account"
  );
  match identity.delete_account(&account.uid).await {
    Ok(()) => Outcome::Completed(Effect::AccountDeleted { uid: account.uid.clone() }),
    Err(e) => Outcome::Failed(HandlerError::DeleteAccount {
      uid:    account.uid.clone(),
      source: Box::new(e),
    }),
  }
}
