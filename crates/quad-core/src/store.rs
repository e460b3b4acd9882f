//! The `DocumentStore` and `IdentityProvider` traits.
//!
//! Both are implemented by storage backends (e.g. `quad-store-sqlite`). The
//! handlers in `quad-functions` depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  account::Account,
  document::{Chat, NewPost, NewProfile, Post, Profile},
};

// ─── Document store ──────────────────────────────────────────────────────────

/// Abstraction over the shared document store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Retrieve `users/{uid}`. Returns `None` if not found.
  fn get_profile<'a>(
    &'a self,
    uid: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Write `users/{uid}` with set semantics: any existing document is
  /// replaced. `created_at` and `updated_at` are both set to the store clock
  /// at write time.
  fn set_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Attach a push device token to an existing profile.
  ///
  /// Token registration belongs to the client; this exists for seeding.
  fn set_device_token<'a>(
    &'a self,
    uid: &'a str,
    token: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Chats ─────────────────────────────────────────────────────────────

  /// Retrieve `chats/{chat_id}`. Returns `None` if not found.
  fn get_chat<'a>(
    &'a self,
    chat_id: &'a str,
  ) -> impl Future<Output = Result<Option<Chat>, Self::Error>> + Send + 'a;

  /// Create or replace `chats/{chat_id}`.
  fn put_chat<'a>(
    &'a self,
    chat_id: &'a str,
    chat: &'a Chat,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Create a post and return the stored document.
  fn put_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Retrieve a post by id. Returns `None` if not found.
  fn get_post<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + 'a;

  /// Ids of at most `limit` posts whose `expires_at` is strictly before
  /// `before`, oldest first.
  fn expired_posts(
    &self,
    before: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Delete the given posts as one atomic batch. Ids that no longer exist
  /// are ignored. Returns the number of documents actually removed.
  fn delete_posts<'a>(
    &'a self,
    ids: &'a [String],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}

// ─── Identity subsystem ──────────────────────────────────────────────────────

/// The identity subsystem that owns accounts.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve an account by uid. Returns `None` if not found.
  fn get_account<'a>(
    &'a self,
    uid: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Delete an account. Returns an error if the account does not exist.
  fn delete_account<'a>(
    &'a self,
    uid: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
