//! HTTP push dispatcher.
//!
//! Posts each notification to a push gateway as a single JSON request in
//! the FCM v1 `messages:send` shape:
//!
//! ```json
//! {"message":{"token":"…","notification":{"title":"…","body":"…"},"data":{"chatId":"…"}}}
//! ```

use std::{collections::BTreeMap, time::Duration};

use quad_core::push::{PushDispatcher, PushMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection settings for the push gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
  /// Full URL notifications are POSTed to.
  pub endpoint:     String,
  /// Sent as `Authorization: Bearer <token>` when set.
  #[serde(default)]
  pub bearer_token: Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 10 }

#[derive(Debug, Error)]
pub enum PushError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("push gateway returned {status}: {body}")]
  Status { status: u16, body: String },
}

// ─── Wire format ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Envelope<'a> {
  message: WireMessage<'a>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
  token:        &'a str,
  notification: WireNotification<'a>,
  data:         &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct WireNotification<'a> {
  title: &'a str,
  body:  &'a str,
}

impl<'a> From<&'a PushMessage> for Envelope<'a> {
  fn from(message: &'a PushMessage) -> Self {
    Self {
      message: WireMessage {
        token:        &message.token,
        notification: WireNotification { title: &message.title, body: &message.body },
        data:         &message.data,
      },
    }
  }
}

// ─── Dispatcher ───────────────────────────────────────────────────────────────

/// Sends notifications to the configured push gateway, one attempt each.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpPushDispatcher {
  client: Client,
  config: PushConfig,
}

impl HttpPushDispatcher {
  pub fn new(config: PushConfig) -> Result<Self, PushError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }
}

impl PushDispatcher for HttpPushDispatcher {
  type Error = PushError;

  async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
    let mut req = self.client.post(&self.config.endpoint).json(&Envelope::from(message));
    if let Some(token) = &self.config.bearer_token {
      req = req.bearer_auth(token);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(PushError::Status { status: status.as_u16(), body });
    }
    tracing::debug!(status = status.as_u16(), "push gateway accepted notification");
    Ok(())
  }
}
