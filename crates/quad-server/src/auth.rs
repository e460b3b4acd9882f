//! Bearer-secret extractor guarding the trigger routes.
//!
//! Callers present the shared trigger secret as `Authorization: Bearer
//! <secret>`; only its argon2 hash is kept in configuration.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use rand_core::OsRng;

use crate::{AppState, error::Error};

/// The secret accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub secret_hash: String,
}

/// Zero-size marker: present in the handler means the trigger was authenticated.
pub struct Authenticated;

/// Hash `secret` into the PHC string expected in `trigger_secret_hash`.
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(secret.as_bytes(), &salt)?.to_string())
}

/// Verify the bearer secret directly from headers.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let secret = header_val
    .strip_prefix("Bearer ")
    .ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&config.secret_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(secret.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(())
}

impl<S, I, P> FromRequestParts<AppState<S, I, P>> for Authenticated
where
  S: Send + Sync,
  I: Send + Sync,
  P: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I, P>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}
