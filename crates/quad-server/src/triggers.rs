//! Trigger handlers.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/triggers/auth/before-create` | pre-create interception; `403` rejects |
//! | `POST` | `/triggers/auth/on-create` | post-create correction, then profile |
//! | `POST` | `/triggers/chats/{chat_id}/messages/{message_id}` | message notifier |
//! | `POST` | `/triggers/scheduled/cleanup-expired-posts` | expiry sweeper |
//!
//! Apart from the pre-create rejection, the status code never reflects what
//! a handler did: failures are reported and swallowed, so the caller has
//! nothing to retry.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use quad_core::{
  account::Account,
  document::Message,
  push::PushDispatcher,
  store::{DocumentStore, IdentityProvider},
};
use serde_json::{Value, json};

use crate::{AppState, auth::Authenticated, error::Error};

/// `POST /triggers/auth/before-create`, body: an [`Account`].
pub async fn before_create<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  _auth: Authenticated,
  Json(account): Json<Account>,
) -> Result<Json<Value>, Error>
where
  S: DocumentStore + 'static,
  I: IdentityProvider + 'static,
  P: PushDispatcher + 'static,
{
  state.functions.before_create(&account)?;
  Ok(Json(json!({})))
}

/// `POST /triggers/auth/on-create`, body: the committed [`Account`].
pub async fn on_create<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  _auth: Authenticated,
  Json(account): Json<Account>,
) -> StatusCode
where
  S: DocumentStore + 'static,
  I: IdentityProvider + 'static,
  P: PushDispatcher + 'static,
{
  state.functions.on_account_created(&account).await;
  StatusCode::NO_CONTENT
}

/// `POST /triggers/chats/{chat_id}/messages/{message_id}`, body: the new
/// [`Message`] document.
pub async fn on_new_message<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  _auth: Authenticated,
  Path((chat_id, message_id)): Path<(String, String)>,
  Json(message): Json<Message>,
) -> StatusCode
where
  S: DocumentStore + 'static,
  I: IdentityProvider + 'static,
  P: PushDispatcher + 'static,
{
  state.functions.on_new_message(&chat_id, &message_id, &message).await;
  StatusCode::NO_CONTENT
}

/// `POST /triggers/scheduled/cleanup-expired-posts`: run the sweeper now.
pub async fn cleanup_expired_posts<S, I, P>(
  State(state): State<AppState<S, I, P>>,
  _auth: Authenticated,
) -> StatusCode
where
  S: DocumentStore + 'static,
  I: IdentityProvider + 'static,
  P: PushDispatcher + 'static,
{
  state.functions.cleanup_expired_posts().await;
  StatusCode::NO_CONTENT
}
