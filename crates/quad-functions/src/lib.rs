//! Trigger handlers for the Quad campus utility backend.
//!
//! Each handler reacts to a single external trigger (an identity event, a
//! scheduler tick or a document write) and is independent of the others.
//! Downstream failures never escape a handler: they come back as
//! [`Outcome::Failed`] and are handed to a [`Reporter`]. The only failure a
//! caller ever sees is the pre-create [`Rejection`].

pub mod config;
pub mod error;
pub mod gatekeeper;
pub mod notifier;
pub mod outcome;
pub mod provisioner;
pub mod sweeper;

#[cfg(test)]
mod testing;

pub use config::FunctionsConfig;
pub use error::{Error, Result};
pub use gatekeeper::Rejection;
pub use outcome::{Effect, HandlerError, Outcome, Reporter, Skip, TracingReporter};

use std::sync::Arc;

use chrono::Utc;
use quad_core::{
  account::Account,
  document::Message,
  policy::{DomainSuffixPolicy, SignupPolicy},
  push::PushDispatcher,
  store::{DocumentStore, IdentityProvider},
};

// ─── Handler names ───────────────────────────────────────────────────────────

pub const BEFORE_CREATE: &str = "beforeCreate";
pub const VALIDATE_NEW_USER: &str = "validateNewUser";
pub const CREATE_USER_PROFILE: &str = "createUserProfile";
pub const CLEANUP_EXPIRED_POSTS: &str = "cleanupExpiredPosts";
pub const ON_NEW_MESSAGE: &str = "onNewMessage";

// ─── Bundle ──────────────────────────────────────────────────────────────────

/// All handlers wired to their collaborators.
///
/// Every collaborator is reference-counted, so cloning is cheap. Each method is
/// one trigger invocation; invocations share no mutable state.
pub struct Functions<S, I, P> {
  store:    Arc<S>,
  identity: Arc<I>,
  push:     Arc<P>,
  policy:   Arc<dyn SignupPolicy>,
  reporter: Arc<dyn Reporter>,
  config:   Arc<FunctionsConfig>,
}

impl<S, I, P> Clone for Functions<S, I, P> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      identity: Arc::clone(&self.identity),
      push:     Arc::clone(&self.push),
      policy:   Arc::clone(&self.policy),
      reporter: Arc::clone(&self.reporter),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S, I, P> Functions<S, I, P>
where
  S: DocumentStore,
  I: IdentityProvider,
  P: PushDispatcher,
{
  /// Wire the handlers with a [`DomainSuffixPolicy`] built from `config` and
  /// a [`TracingReporter`].
  pub fn new(store: Arc<S>, identity: Arc<I>, push: Arc<P>, config: FunctionsConfig) -> Self {
    let policy = DomainSuffixPolicy::new(config.allowed_email_suffix.clone());
    Self {
      store,
      identity,
      push,
      policy: Arc::new(policy),
      reporter: Arc::new(TracingReporter),
      config: Arc::new(config),
    }
  }

  pub fn with_policy(mut self, policy: Arc<dyn SignupPolicy>) -> Self {
    self.policy = policy;
    self
  }

  pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
    self.reporter = reporter;
    self
  }

  pub fn config(&self) -> &FunctionsConfig { &self.config }

  /// Pre-create interception. `Err` aborts the account creation.
  pub fn before_create(&self, account: &Account) -> Result<(), Rejection> {
    let result = gatekeeper::before_create(
      self.policy.as_ref(),
      self.config.before_create_enabled,
      &self.config.rejection_message,
      account,
    );
    if let Err(rejection) = &result {
      tracing::info!(
        handler = BEFORE_CREATE,
        uid = %account.uid,
        email = account.email_or_empty(),
        code = rejection.code,
        "signup rejected"
      );
    }
    result
  }

  /// Post-create correction: delete an account that should not exist.
  pub async fn validate_new_user(&self, account: &Account) -> Outcome {
    let outcome = gatekeeper::validate_new_user(
      self.identity.as_ref(),
      self.policy.as_ref(),
      self.config.validate_new_user_enabled,
      account,
    )
    .await;
    self.reporter.report(VALIDATE_NEW_USER, &outcome);
    outcome
  }

  /// Write the initial profile for a newly committed account.
  pub async fn create_user_profile(&self, account: &Account) -> Outcome {
    let outcome =
      provisioner::create_user_profile(self.store.as_ref(), self.policy.as_ref(), account).await;
    self.reporter.report(CREATE_USER_PROFILE, &outcome);
    outcome
  }

  /// Every post-create handler, in trigger order.
  pub async fn on_account_created(&self, account: &Account) -> Vec<Outcome> {
    vec![
      self.validate_new_user(account).await,
      self.create_user_profile(account).await,
    ]
  }

  /// Scheduled sweep of posts whose expiry has passed.
  pub async fn cleanup_expired_posts(&self) -> Outcome {
    let outcome =
      sweeper::cleanup_expired_posts(self.store.as_ref(), self.config.sweep_chunk_size, Utc::now())
        .await;
    self.reporter.report(CLEANUP_EXPIRED_POSTS, &outcome);
    outcome
  }

  /// Notify the other participant of `chats/{chat_id}/messages/{message_id}`.
  pub async fn on_new_message(&self, chat_id: &str, message_id: &str, message: &Message) -> Outcome {
    tracing::debug!(handler = ON_NEW_MESSAGE, chat_id, message_id, "message created");
    let outcome = notifier::on_new_message(
      self.store.as_ref(),
      self.push.as_ref(),
      &self.config,
      chat_id,
      message,
    )
    .await;
    self.reporter.report(ON_NEW_MESSAGE, &outcome);
    outcome
  }
}
