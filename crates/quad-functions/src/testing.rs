//! Fakes shared by the handler tests.

use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use chrono::{DateTime, Utc};
use quad_core::{
  document::{Chat, NewPost, NewProfile, Post, Profile},
  push::{PushDispatcher, PushMessage},
  store::DocumentStore,
};
use quad_store_sqlite::SqliteStore;
use thiserror::Error;

use crate::outcome::{Outcome, Reporter};

#[derive(Debug, Error)]
#[error("service unavailable")]
pub struct Unavailable;

/// A document store whose every call fails.
pub struct BrokenStore;

impl DocumentStore for BrokenStore {
  type Error = Unavailable;

  async fn get_profile(&self, _: &str) -> Result<Option<Profile>, Unavailable> { Err(Unavailable) }
  async fn set_profile(&self, _: NewProfile) -> Result<Profile, Unavailable> { Err(Unavailable) }
  async fn set_device_token(&self, _: &str, _: &str) -> Result<(), Unavailable> { Err(Unavailable) }
  async fn get_chat(&self, _: &str) -> Result<Option<Chat>, Unavailable> { Err(Unavailable) }
  async fn put_chat(&self, _: &str, _: &Chat) -> Result<(), Unavailable> { Err(Unavailable) }
  async fn put_post(&self, _: NewPost) -> Result<Post, Unavailable> { Err(Unavailable) }
  async fn get_post(&self, _: &str) -> Result<Option<Post>, Unavailable> { Err(Unavailable) }
  async fn expired_posts(&self, _: DateTime<Utc>, _: usize) -> Result<Vec<String>, Unavailable> {
    Err(Unavailable)
  }
  async fn delete_posts(&self, _: &[String]) -> Result<usize, Unavailable> { Err(Unavailable) }
}

#[derive(Debug, Error)]
pub enum FlakyError {
  #[error(transparent)]
  Store(#[from] quad_store_sqlite::Error),
  #[error(transparent)]
  Unavailable(#[from] Unavailable),
}

/// An in-memory store whose batch deletes start failing after `commits`
/// successful ones. Every other call goes straight to the inner store.
pub struct FlakyDeletes {
  pub inner: SqliteStore,
  commits:   AtomicUsize,
}

impl FlakyDeletes {
  pub fn new(inner: SqliteStore, commits: usize) -> Self {
    Self { inner, commits: AtomicUsize::new(commits) }
  }
}

impl DocumentStore for FlakyDeletes {
  type Error = FlakyError;

  async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, FlakyError> {
    Ok(self.inner.get_profile(uid).await?)
  }
  async fn set_profile(&self, profile: NewProfile) -> Result<Profile, FlakyError> {
    Ok(self.inner.set_profile(profile).await?)
  }
  async fn set_device_token(&self, uid: &str, token: &str) -> Result<(), FlakyError> {
    Ok(self.inner.set_device_token(uid, token).await?)
  }
  async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, FlakyError> {
    Ok(self.inner.get_chat(chat_id).await?)
  }
  async fn put_chat(&self, chat_id: &str, chat: &Chat) -> Result<(), FlakyError> {
    Ok(self.inner.put_chat(chat_id, chat).await?)
  }
  async fn put_post(&self, post: NewPost) -> Result<Post, FlakyError> {
    Ok(self.inner.put_post(post).await?)
  }
  async fn get_post(&self, id: &str) -> Result<Option<Post>, FlakyError> {
    Ok(self.inner.get_post(id).await?)
  }
  async fn expired_posts(&self, before: DateTime<Utc>, limit: usize) -> Result<Vec<String>, FlakyError> {
    Ok(self.inner.expired_posts(before, limit).await?)
  }
  async fn delete_posts(&self, ids: &[String]) -> Result<usize, FlakyError> {
    let left = self.commits.load(Ordering::SeqCst);
    if left == 0 {
      return Err(Unavailable.into());
    }
    self.commits.store(left - 1, Ordering::SeqCst);
    Ok(self.inner.delete_posts(ids).await?)
  }
}

/// Records every message instead of sending it.
#[derive(Default)]
pub struct RecordingPush {
  sent: Mutex<Vec<PushMessage>>,
}

impl RecordingPush {
  pub fn sent(&self) -> Vec<PushMessage> { self.sent.lock().unwrap().clone() }
}

impl PushDispatcher for RecordingPush {
  type Error = Unavailable;

  async fn send(&self, message: &PushMessage) -> Result<(), Unavailable> {
    self.sent.lock().unwrap().push(message.clone());
    Ok(())
  }
}

/// A push service that is always down.
pub struct FailingPush;

impl PushDispatcher for FailingPush {
  type Error = Unavailable;

  async fn send(&self, _: &PushMessage) -> Result<(), Unavailable> { Err(Unavailable) }
}

/// Keeps `(handler, summary)` pairs for every reported outcome.
#[derive(Default)]
pub struct RecordingReporter {
  reports: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
  pub fn reports(&self) -> Vec<(&'static str, String)> { self.reports.lock().unwrap().clone() }
}

impl Reporter for RecordingReporter {
  fn report(&self, handler: &'static str, outcome: &Outcome) {
    let summary = match outcome {
      Outcome::Completed(effect) => format!("completed: {effect:?}"),
      Outcome::Skipped(skip) => format!("skipped: {}", skip.as_str()),
      Outcome::Failed(error) => format!("failed: {error}"),
    };
    self.reports.lock().unwrap().push((handler, summary));
  }
}
