//! Push notifications and the dispatch-service abstraction.

use std::{collections::BTreeMap, future::Future};

use serde::{Deserialize, Serialize};

/// A notification addressed to a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
  pub token: String,
  pub title: String,
  pub body:  String,
  /// String-only key/value payload delivered alongside the notification.
  pub data:  BTreeMap<String, String>,
}

/// Best-effort delivery of a [`PushMessage`].
///
/// Implementations make a single attempt; retry policy, if any, belongs to
/// the caller.
pub trait PushDispatcher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    message: &'a PushMessage,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
