//! Profile provisioner: writes `users/{uid}` for every admitted account.

use quad_core::{
  account::Account,
  document::NewProfile,
  policy::SignupPolicy,
  store::DocumentStore,
};

use crate::outcome::{Effect, HandlerError, Outcome, Skip};

/// The display name to store: the account's own, or else the local part of
/// its email (everything before the first `@`).
pub fn display_name_for(account: &Account) -> String {
  match account.display_name.as_deref() {
    Some(name) if !name.is_empty() => name.to_string(),
    _ => {
      let email = account.email_or_empty();
      email.split('@').next().unwrap_or(email).to_string()
    }
  }
}

/// Build the profile for `account`; empty photo URLs are stored as absent.
pub fn profile_for(account: &Account) -> NewProfile {
  NewProfile {
    uid:          account.uid.clone(),
    email:        account.email.clone(),
    display_name: display_name_for(account),
    photo_url:    account.photo_url.clone().filter(|url| !url.is_empty()),
  }
}

/// Write the initial profile for `account`.
///
/// Accounts failing the policy are left alone; the gatekeeper removes them
/// separately, so a disallowed account may briefly exist without a profile.
pub async fn create_user_profile<S>(
  store: &S,
  policy: &dyn SignupPolicy,
  account: &Account,
) -> Outcome
where
  S: DocumentStore,
{
  if !policy.check(account.email_or_empty()).is_allowed() {
    return Outcome::Skipped(Skip::EmailNotAllowed);
  }

  match store.set_profile(profile_for(account)).await {
    Ok(profile) => Outcome::Completed(Effect::ProfileWritten { uid: profile.uid }),
    Err(e) => Outcome::Failed(HandlerError::WriteProfile {
      uid:    account.uid.clone(),
      source: Box::new(e),
    }),
  }
}
