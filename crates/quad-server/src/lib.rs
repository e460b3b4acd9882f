//! Self-hosted trigger surface for the Quad handlers.
//!
//! Exposes an axum [`Router`] through which an identity subsystem, a
//! document-change feed or an operator can fire the handlers, plus the
//! interval scheduler that drives the expiry sweeper and an HTTP push
//! dispatcher.

pub mod auth;
pub mod error;
pub mod push;
pub mod scheduler;
pub mod shutdown;
pub mod triggers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::post};
use quad_core::{
  push::PushDispatcher,
  store::{DocumentStore, IdentityProvider},
};
use quad_functions::{Functions, FunctionsConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use push::PushConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `QUAD_*`
/// environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Argon2 PHC string of the shared trigger secret.
  pub trigger_secret_hash: String,
  #[serde(default = "default_sweep_interval_secs")]
  pub sweep_interval_secs: u64,
  #[serde(default)]
  pub functions:           FunctionsConfig,
  pub push:                PushConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_sweep_interval_secs() -> u64 { 3600 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, I, P> {
  pub functions: Functions<S, I, P>,
  pub auth:      Arc<AuthConfig>,
}

impl<S, I, P> Clone for AppState<S, I, P> {
  fn clone(&self) -> Self {
    Self { functions: self.functions.clone(), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the trigger [`Router`].
pub fn router<S, I, P>(state: AppState<S, I, P>) -> Router
where
  S: DocumentStore + 'static,
  I: IdentityProvider + 'static,
  P: PushDispatcher + 'static,
{
  Router::new()
    .route("/triggers/auth/before-create", post(triggers::before_create::<S, I, P>))
    .route("/triggers/auth/on-create", post(triggers::on_create::<S, I, P>))
    .route(
      "/triggers/chats/{chat_id}/messages/{message_id}",
      post(triggers::on_new_message::<S, I, P>),
    )
    .route(
      "/triggers/scheduled/cleanup-expired-posts",
      post(triggers::cleanup_expired_posts::<S, I, P>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
