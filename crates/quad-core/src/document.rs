//! Documents owned by the shared document store.
//!
//! Serde names follow the store's wire format (camelCase, `fcmToken`), so a
//! document serialises the same way whether it comes from the store or from
//! a trigger payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── Collections ─────────────────────────────────────────────────────────────

/// Profile documents, keyed by account uid.
pub const USERS: &str = "users";
/// Ephemeral "empty class" posts swept after expiry.
pub const POSTS: &str = "empty_class_posts";
/// Two-party chats; messages live in a sub-collection.
pub const CHATS: &str = "chats";
/// Sub-collection of a chat holding its messages.
pub const MESSAGES: &str = "messages";

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The per-user profile document at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub uid:          String,
  pub email:        Option<String>,
  pub display_name: String,
  pub photo_url:    Option<String>,
  /// Server-assigned at write time.
  pub created_at:   DateTime<Utc>,
  /// Server-assigned at write time.
  pub updated_at:   DateTime<Utc>,
  /// Push device token, registered by the client out of band.
  #[serde(default, rename = "fcmToken", skip_serializing_if = "Option::is_none")]
  pub device_token: Option<String>,
}

/// The caller-supplied part of a profile; timestamps are set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
  pub uid:          String,
  pub email:        Option<String>,
  pub display_name: String,
  pub photo_url:    Option<String>,
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A post in [`POSTS`]. Only `expires_at` matters to this system; everything
/// else the client wrote is carried in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id:         String,
  pub expires_at: DateTime<Utc>,
  #[serde(flatten)]
  pub fields:     Map<String, Value>,
}

/// Input for seeding a post. A missing `id` is generated by the store.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
  pub id:         Option<String>,
  pub expires_at: DateTime<Utc>,
  /// Must be a JSON object (or `Null` for none).
  pub fields:     Value,
}

impl NewPost {
  pub fn expiring_at(expires_at: DateTime<Utc>) -> Self {
    Self { id: None, expires_at, fields: Value::Null }
  }

  /// The extra fields as a JSON object; `Null` reads as empty.
  pub fn fields_object(&self) -> Result<Map<String, Value>> {
    match &self.fields {
      Value::Null => Ok(Map::new()),
      Value::Object(map) => Ok(map.clone()),
      Value::Bool(_) => Err(Error::PostFieldsNotObject("a boolean")),
      Value::Number(_) => Err(Error::PostFieldsNotObject("a number")),
      Value::String(_) => Err(Error::PostFieldsNotObject("a string")),
      Value::Array(_) => Err(Error::PostFieldsNotObject("an array")),
    }
  }
}

// ─── Chat ────────────────────────────────────────────────────────────────────

/// A chat document at `chats/{chatId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
  #[serde(default)]
  pub participants:  Vec<String>,
  /// Display label, e.g. the title of the listing the chat is about.
  #[serde(default)]
  pub listing_title: Option<String>,
}

impl Chat {
  /// The first participant that is not `sender_id`.
  pub fn other_participant(&self, sender_id: &str) -> Option<&str> {
    self
      .participants
      .iter()
      .map(String::as_str)
      .find(|id| *id != sender_id)
  }
}

// ─── Message ─────────────────────────────────────────────────────────────────

/// A message document at `chats/{chatId}/messages/{messageId}`, as delivered
/// in the document-created trigger payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub sender_id: String,
  #[serde(default)]
  pub text:      String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chat(participants: &[&str]) -> Chat {
    Chat {
      participants:  participants.iter().map(|p| p.to_string()).collect(),
      listing_title: None,
    }
  }

  #[test]
  fn other_participant_skips_sender() {
    assert_eq!(chat(&["u1", "u2"]).other_participant("u1"), Some("u2"));
    assert_eq!(chat(&["u1", "u2"]).other_participant("u2"), Some("u1"));
  }

  #[test]
  fn other_participant_absent_for_malformed_chat() {
    assert_eq!(chat(&["u1", "u1"]).other_participant("u1"), None);
    assert_eq!(chat(&[]).other_participant("u1"), None);
  }

  #[test]
  fn profile_serialises_with_store_field_names() {
    let now = Utc::now();
    let profile = Profile {
      uid:          "u1".into(),
      email:        Some("a@vit.ac.in".into()),
      display_name: "a".into(),
      photo_url:    None,
      created_at:   now,
      updated_at:   now,
      device_token: Some("T".into()),
    };
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["displayName"], "a");
    assert_eq!(json["fcmToken"], "T");
    assert!(json["photoUrl"].is_null());
  }

  #[test]
  fn message_extra_fields_are_ignored() {
    let msg: Message = serde_json::from_str(
      r#"{"senderId":"u1","text":"hi","createdAt":"2024-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(msg.sender_id, "u1");
    assert_eq!(msg.text, "hi");
  }

  #[test]
  fn new_post_fields_must_be_an_object() {
    let mut post = NewPost::expiring_at(Utc::now());
    assert!(post.fields_object().unwrap().is_empty());

    post.fields = serde_json::json!({ "room": "AB1-101" });
    assert_eq!(post.fields_object().unwrap()["room"], "AB1-101");

    post.fields = serde_json::json!(["AB1-101"]);
    assert!(matches!(
      post.fields_object(),
      Err(Error::PostFieldsNotObject("an array"))
    ));
  }

  #[test]
  fn post_flattens_extra_fields() {
    let post: Post = serde_json::from_str(
      r#"{"id":"p1","expiresAt":"2024-01-01T00:00:00Z","room":"AB1-101"}"#,
    )
    .unwrap();
    assert_eq!(post.fields["room"], "AB1-101");
  }
}
