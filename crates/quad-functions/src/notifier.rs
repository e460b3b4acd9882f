//! Message notifier: pushes a notification to the other chat participant.

use std::collections::BTreeMap;

use quad_core::{
  document::{Chat, Message, CHATS, USERS},
  push::{PushDispatcher, PushMessage},
  store::DocumentStore,
};

use crate::{
  config::FunctionsConfig,
  outcome::{Effect, HandlerError, Outcome, Skip},
};

/// `type` value in the data payload of a new-message notification.
pub const NEW_MESSAGE_TYPE: &str = "new_message";

/// The first `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
  match text.char_indices().nth(limit) {
    Some((idx, _)) => &text[..idx],
    None => text,
  }
}

/// Build the notification for `message` in `chat`, addressed to `token`.
pub fn build_notification(
  config: &FunctionsConfig,
  chat_id: &str,
  chat: &Chat,
  message: &Message,
  token: &str,
) -> PushMessage {
  let title = match chat.listing_title.as_deref() {
    Some(title) if !title.is_empty() => title.to_string(),
    _ => config.default_notification_title.clone(),
  };

  let mut data = BTreeMap::new();
  data.insert("chatId".to_string(), chat_id.to_string());
  data.insert("type".to_string(), NEW_MESSAGE_TYPE.to_string());

  PushMessage {
    token: token.to_string(),
    title,
    body: truncate_chars(&message.text, config.notification_body_limit).to_string(),
    data,
  }
}

/// Notify the participant of `chat_id` who did not send `message`.
///
/// Missing chat, recipient, profile or device token each end the run as a
/// [`Outcome::Skipped`].
pub async fn on_new_message<S, P>(
  store: &S,
  push: &P,
  config: &FunctionsConfig,
  chat_id: &str,
  message: &Message,
) -> Outcome
where
  S: DocumentStore,
  P: PushDispatcher,
{
  let chat = match store.get_chat(chat_id).await {
    Ok(Some(chat)) => chat,
    Ok(None) => return Outcome::Skipped(Skip::ChatNotFound),
    Err(e) => {
      return Outcome::Failed(HandlerError::Read {
        path:   format!("{CHATS}/{chat_id}"),
        source: Box::new(e),
      });
    }
  };

  let Some(recipient) = chat.other_participant(&message.sender_id) else {
    return Outcome::Skipped(Skip::NoRecipient);
  };

  let profile = match store.get_profile(recipient).await {
    Ok(Some(profile)) => profile,
    Ok(None) => return Outcome::Skipped(Skip::ProfileNotFound),
    Err(e) => {
      return Outcome::Failed(HandlerError::Read {
        path:   format!("{USERS}/{recipient}"),
        source: Box::new(e),
      });
    }
  };

  let token = match profile.device_token.as_deref() {
    Some(token) if !token.is_empty() => token,
    _ => return Outcome::Skipped(Skip::NoDeviceToken),
  };

  let notification = build_notification(config, chat_id, &chat, message, token);
  match push.send(&notification).await {
    Ok(()) => Outcome::Completed(Effect::NotificationSent {
      recipient: recipient.to_string(),
      chat_id:   chat_id.to_string(),
    }),
    Err(e) => Outcome::Failed(HandlerError::Dispatch {
      recipient: recipient.to_string(),
      source:    Box::new(e),
    }),
  }
}

#[cfg(test)]
mod tests {
  use quad_core::document::NewProfile;
  use quad_store_sqlite::SqliteStore;

  use super::*;
  use crate::testing::{BrokenStore, FailingPush, RecordingPush};

  async fn seeded_store(token: Option<&str>) -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .put_chat(
        "c1",
        &Chat {
          participants:  vec!["u1".into(), "u2".into()],
          listing_title: Some("Drafter for sale".into()),
        },
      )
      .await
      .unwrap();
    store
      .set_profile(NewProfile {
        uid:          "u2".into(),
        email:        Some("b@vit.ac.in".into()),
        display_name: "b".into(),
        photo_url:    None,
      })
      .await
      .unwrap();
    if let Some(token) = token {
      store.set_device_token("u2", token).await.unwrap();
    }
    store
  }

  fn message(sender: &str, text: &str) -> Message {
    Message { sender_id: sender.into(), text: text.into() }
  }

  #[test]
  fn truncate_counts_characters_not_bytes() {
    assert_eq!(truncate_chars("hello", 3), "hel");
    assert_eq!(truncate_chars("hi", 100), "hi");
    assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
    assert_eq!(truncate_chars("", 100), "");
  }

  #[test]
  fn title_falls_back_to_default() {
    let config = FunctionsConfig::default();
    let chat = Chat { participants: vec![], listing_title: Some(String::new()) };
    let n = build_notification(&config, "c1", &chat, &message("u1", "hi"), "T");
    assert_eq!(n.title, "New Message");
    assert_eq!(n.data["chatId"], "c1");
    assert_eq!(n.data["type"], NEW_MESSAGE_TYPE);
  }

  #[tokio::test]
  async fn sends_truncated_body_to_recipient_token() {
    let store = seeded_store(Some("T")).await;
    let push = RecordingPush::default();
    let text = "x".repeat(120);

    let outcome = on_new_message(
      &store,
      &push,
      &FunctionsConfig::default(),
      "c1",
      &message("u1", &text),
    )
    .await;
    assert_eq!(
      outcome.effect(),
      Some(&Effect::NotificationSent { recipient: "u2".into(), chat_id: "c1".into() })
    );

    let sent = push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].token, "T");
    assert_eq!(sent[0].title, "Drafter for sale");
    assert_eq!(sent[0].body.chars().count(), 100);
  }

  #[tokio::test]
  async fn no_device_token_means_no_dispatch() {
    let store = seeded_store(None).await;
    let push = RecordingPush::default();

    let outcome =
      on_new_message(&store, &push, &FunctionsConfig::default(), "c1", &message("u1", "hi"))
        .await;
    assert_eq!(outcome.skip(), Some(Skip::NoDeviceToken));
    assert!(push.sent().is_empty());
  }

  #[tokio::test]
  async fn empty_device_token_means_no_dispatch() {
    let store = seeded_store(Some("")).await;
    let push = RecordingPush::default();

    let outcome =
      on_new_message(&store, &push, &FunctionsConfig::default(), "c1", &message("u1", "hi"))
        .await;
    assert_eq!(outcome.skip(), Some(Skip::NoDeviceToken));
    assert!(push.sent().is_empty());
  }

  #[tokio::test]
  async fn missing_chat_is_skipped() {
    let store = seeded_store(Some("T")).await;
    let push = RecordingPush::default();

    let outcome =
      on_new_message(&store, &push, &FunctionsConfig::default(), "nope", &message("u1", "hi"))
        .await;
    assert_eq!(outcome.skip(), Some(Skip::ChatNotFound));
    assert!(push.sent().is_empty());
  }

  #[tokio::test]
  async fn chat_without_other_participant_is_skipped() {
    let store = seeded_store(Some("T")).await;
    store
      .put_chat("solo", &Chat { participants: vec!["u1".into(), "u1".into()], listing_title: None })
      .await
      .unwrap();
    let push = RecordingPush::default();

    let outcome =
      on_new_message(&store, &push, &FunctionsConfig::default(), "solo", &message("u1", "hi"))
        .await;
    assert_eq!(outcome.skip(), Some(Skip::NoRecipient));
  }

  #[tokio::test]
  async fn missing_recipient_profile_is_skipped() {
    let store = seeded_store(Some("T")).await;
    let push = RecordingPush::default();

    // u2 writes to u1, who has no profile.
    let outcome =
      on_new_message(&store, &push, &FunctionsConfig::default(), "c1", &message("u2", "hi"))
        .await;
    assert_eq!(outcome.skip(), Some(Skip::ProfileNotFound));
    assert!(push.sent().is_empty());
  }

  #[tokio::test]
  async fn dispatch_failure_is_recoverable() {
    let store = seeded_store(Some("T")).await;

    let outcome = on_new_message(
      &store,
      &FailingPush,
      &FunctionsConfig::default(),
      "c1",
      &message("u1", "hi"),
    )
    .await;
    match outcome {
      Outcome::Failed(HandlerError::Dispatch { recipient, .. }) => assert_eq!(recipient, "u2"),
      other => panic!("unexpected outcome: {other:?}"),
    }
  }

  #[tokio::test]
  async fn store_failure_is_recoverable() {
    let push = RecordingPush::default();
    let outcome =
      on_new_message(&BrokenStore, &push, &FunctionsConfig::default(), "c1", &message("u1", "hi"))
        .await;
    match outcome {
      Outcome::Failed(HandlerError::Read { path, .. }) => assert_eq!(path, "chats/c1"),
      other => panic!("unexpected outcome: {other:?}"),
    }
  }
}
