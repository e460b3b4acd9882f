//! Handler outcomes and the collaborator that logs them.
//!
//! A handler never fails its trigger. Whatever happened comes back as an
//! [`Outcome`], and a [`Reporter`] decides how to surface it.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a single handler invocation did.
#[derive(Debug)]
pub enum Outcome {
  Completed(Effect),
  /// Nothing to do. Not an error.
  Skipped(Skip),
  /// A downstream call failed; logged and swallowed, never retried here.
  Failed(HandlerError),
}

impl Outcome {
  pub fn is_failed(&self) -> bool { matches!(self, Self::Failed(_)) }

  pub fn effect(&self) -> Option<&Effect> {
    match self {
      Self::Completed(effect) => Some(effect),
      _ => None,
    }
  }

  pub fn skip(&self) -> Option<Skip> {
    match self {
      Self::Skipped(skip) => Some(*skip),
      _ => None,
    }
  }
}

/// The side effect of a completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  AccountDeleted { uid: String },
  ProfileWritten { uid: String },
  PostsDeleted { deleted: usize, batches: usize },
  NotificationSent { recipient: String, chat_id: String },
}

/// Why an invocation had nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
  /// The handler is switched off in configuration.
  Disabled,
  /// The account passed the signup policy; nothing to correct.
  EmailAllowed,
  /// The account failed the signup policy; the gatekeeper removes it.
  EmailNotAllowed,
  NothingExpired,
  ChatNotFound,
  /// The chat has no participant other than the sender.
  NoRecipient,
  ProfileNotFound,
  NoDeviceToken,
}

impl Skip {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Disabled => "disabled",
      Self::EmailAllowed => "email_allowed",
      Self::EmailNotAllowed => "email_not_allowed",
      Self::NothingExpired => "nothing_expired",
      Self::ChatNotFound => "chat_not_found",
      Self::NoRecipient => "no_recipient",
      Self::ProfileNotFound => "profile_not_found",
      Self::NoDeviceToken => "no_device_token",
    }
  }
}

/// A recoverable downstream failure.
#[derive(Debug, Error)]
pub enum HandlerError {
  #[error("failed to delete account {uid}: {source}")]
  DeleteAccount {
    uid:    String,
    #[source]
    source: BoxError,
  },

  #[error("failed to write profile for {uid}: {source}")]
  WriteProfile {
    uid:    String,
    #[source]
    source: BoxError,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path:   String,
    #[source]
    source: BoxError,
  },

  #[error("expired post cleanup stopped after deleting {deleted}: {source}")]
  Sweep {
    deleted: usize,
    #[source]
    source:  BoxError,
  },

  #[error("failed to send notification to {recipient}: {source}")]
  Dispatch {
    recipient: String,
    #[source]
    source:    BoxError,
  },
}

// ─── Reporting ───────────────────────────────────────────────────────────────

/// Receives every outcome a handler produces.
pub trait Reporter: Send + Sync {
  fn report(&self, handler: &'static str, outcome: &Outcome);
}

/// Logs outcomes through `tracing`: completions at info, skips at debug and
/// failures at error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
  fn report(&self, handler: &'static str, outcome: &Outcome) {
    match outcome {
      Outcome::Completed(Effect::AccountDeleted { uid }) => {
        tracing::info!(handler, uid = %uid, "deleted unauthorized account");
      }
      Outcome::Completed(Effect::ProfileWritten { uid }) => {
        tracing::info!(handler, uid = %uid, "created profile");
      }
      Outcome::Completed(Effect::PostsDeleted { deleted, batches }) => {
        tracing::info!(handler, deleted, batches, "deleted expired posts");
      }
      Outcome::Completed(Effect::NotificationSent { recipient, chat_id }) => {
        tracing::info!(handler, recipient = %recipient, chat_id = %chat_id, "notification sent");
      }
      Outcome::Skipped(skip) => {
        tracing::debug!(handler, reason = skip.as_str(), "nothing to do");
      }
      Outcome::Failed(error) => {
        tracing::error!(handler, error = %error, "handler failed");
      }
    }
  }
}
