//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that text comparison orders them correctly.
//! Structured fields are stored as compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use quad_core::{
  account::Account,
  document::{Chat, Post, Profile},
};
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Truncate to the precision a stored timestamp keeps.
pub fn stored_precision(dt: DateTime<Utc>) -> Result<DateTime<Utc>> {
  decode_dt(&encode_dt(dt))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_participants(participants: &[String]) -> Result<String> {
  Ok(serde_json::to_string(participants)?)
}

pub fn decode_participants(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_fields(fields: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

pub fn decode_fields(s: &str) -> Result<Map<String, Value>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub uid:          String,
  pub email:        Option<String>,
  pub display_name: Option<String>,
  pub photo_url:    Option<String>,
}

impl RawAccount {
  pub fn into_account(self) -> Account {
    Account {
      uid:          self.uid,
      email:        self.email,
      display_name: self.display_name,
      photo_url:    self.photo_url,
    }
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawProfile {
  pub uid:          String,
  pub email:        Option<String>,
  pub display_name: String,
  pub photo_url:    Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
  pub fcm_token:    Option<String>,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      uid:          self.uid,
      email:        self.email,
      display_name: self.display_name,
      photo_url:    self.photo_url,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
      device_token: self.fcm_token,
    })
  }
}

/// Raw strings read directly from a `chats` row.
pub struct RawChat {
  pub participants:  String,
  pub listing_title: Option<String>,
}

impl RawChat {
  pub fn into_chat(self) -> Result<Chat> {
    Ok(Chat {
      participants:  decode_participants(&self.participants)?,
      listing_title: self.listing_title,
    })
  }
}

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:    String,
  pub expires_at: String,
  pub fields:     String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:         self.post_id,
      expires_at: decode_dt(&self.expires_at)?,
      fields:     decode_fields(&self.fields)?,
    })
  }
}
