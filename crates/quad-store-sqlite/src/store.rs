//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`] and
//! [`IdentityProvider`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use quad_core::{
  account::Account,
  document::{Chat, NewPost, NewProfile, Post, Profile},
  store::{DocumentStore, IdentityProvider},
};

use crate::{
  encode::{
    encode_dt, encode_fields, encode_participants, stored_precision, RawAccount, RawChat,
    RawPost, RawProfile,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store and account table backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Commit an account, as the identity subsystem does once signup passes
  /// any pre-create interception.
  pub async fn create_account(&self, account: &Account) -> Result<()> {
    let uid          = account.uid.clone();
    let email        = account.email.clone();
    let display_name = account.display_name.clone();
    let photo_url    = account.photo_url.clone();
    let at_str       = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO accounts (uid, email, display_name, photo_url, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![uid, email, display_name, photo_url, at_str],
        )?;
        Ok(n)
      })
      .await?;

    // The uid is the primary key; an ignored insert means it is taken.
    if inserted == 0 {
      return Err(Error::AccountExists(account.uid.clone()));
    }
    Ok(())
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, uid: &str) -> Result<Option<Profile>> {
    let uid = uid.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT uid, email, display_name, photo_url, created_at, updated_at, fcm_token
             FROM users WHERE uid = ?1",
            rusqlite::params![uid],
            |row| {
              Ok(RawProfile {
                uid:          row.get(0)?,
                email:        row.get(1)?,
                display_name: row.get(2)?,
                photo_url:    row.get(3)?,
                created_at:   row.get(4)?,
                updated_at:   row.get(5)?,
                fcm_token:    row.get(6)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn set_profile(&self, input: NewProfile) -> Result<Profile> {
    let now = stored_precision(Utc::now())?;
    let profile = Profile {
      uid:          input.uid,
      email:        input.email,
      display_name: input.display_name,
      photo_url:    input.photo_url,
      created_at:   now,
      updated_at:   now,
      device_token: None,
    };

    let uid          = profile.uid.clone();
    let email        = profile.email.clone();
    let display_name = profile.display_name.clone();
    let photo_url    = profile.photo_url.clone();
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO users
             (uid, email, display_name, photo_url, created_at, updated_at, fcm_token)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5, NULL)",
          rusqlite::params![uid, email, display_name, photo_url, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn set_device_token(&self, uid: &str, token: &str) -> Result<()> {
    let uid_owned = uid.to_owned();
    let token     = token.to_owned();
    let at_str    = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET fcm_token = ?2, updated_at = ?3 WHERE uid = ?1",
          rusqlite::params![uid_owned, token, at_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::ProfileNotFound(uid.to_owned()));
    }
    Ok(())
  }

  // ── Chats ─────────────────────────────────────────────────────────────────

  async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>> {
    let chat_id = chat_id.to_owned();

    let raw: Option<RawChat> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT participants, listing_title FROM chats WHERE chat_id = ?1",
            rusqlite::params![chat_id],
            |row| {
              Ok(RawChat {
                participants:  row.get(0)?,
                listing_title: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawChat::into_chat).transpose()
  }

  async fn put_chat(&self, chat_id: &str, chat: &Chat) -> Result<()> {
    let chat_id       = chat_id.to_owned();
    let participants  = encode_participants(&chat.participants)?;
    let listing_title = chat.listing_title.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO chats (chat_id, participants, listing_title)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![chat_id, participants, listing_title],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn put_post(&self, input: NewPost) -> Result<Post> {
    let fields = input.fields_object()?;
    let post = Post {
      id:         input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
      expires_at: stored_precision(input.expires_at)?,
      fields,
    };

    let id_str     = post.id.clone();
    let expires    = encode_dt(post.expires_at);
    let fields_str = encode_fields(&post.fields)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO posts (post_id, expires_at, fields) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, expires, fields_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, id: &str) -> Result<Option<Post>> {
    let id = id.to_owned();

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT post_id, expires_at, fields FROM posts WHERE post_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawPost {
                post_id:    row.get(0)?,
                expires_at: row.get(1)?,
                fields:     row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn expired_posts(&self, before: DateTime<Utc>, limit: usize) -> Result<Vec<String>> {
    let before_str = encode_dt(before);
    let limit_val  = i64::try_from(limit).unwrap_or(i64::MAX);

    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT post_id FROM posts
           WHERE expires_at < ?1
           ORDER BY expires_at, post_id
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![before_str, limit_val], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids)
  }

  async fn delete_posts(&self, ids: &[String]) -> Result<usize> {
    if ids.is_empty() {
      return Ok(0);
    }
    let ids = ids.to_vec();

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut deleted = 0;
        {
          let mut stmt = tx.prepare("DELETE FROM posts WHERE post_id = ?1")?;
          for id in &ids {
            deleted += stmt.execute(rusqlite::params![id])?;
          }
        }
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    Ok(deleted)
  }
}

// ─── IdentityProvider impl ───────────────────────────────────────────────────

impl IdentityProvider for SqliteStore {
  type Error = Error;

  async fn get_account(&self, uid: &str) -> Result<Option<Account>> {
    let uid = uid.to_owned();

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT uid, email, display_name, photo_url FROM accounts WHERE uid = ?1",
            rusqlite::params![uid],
            |row| {
              Ok(RawAccount {
                uid:          row.get(0)?,
                email:        row.get(1)?,
                display_name: row.get(2)?,
                photo_url:    row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawAccount::into_account))
  }

  async fn delete_account(&self, uid: &str) -> Result<()> {
    let uid_owned = uid.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM accounts WHERE uid = ?1", rusqlite::params![uid_owned])?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::AccountNotFound(uid.to_owned()));
    }
    tracing::debug!(uid, "account deleted");
    Ok(())
  }
}
