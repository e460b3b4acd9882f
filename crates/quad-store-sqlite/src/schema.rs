//! SQL schema for the Quad SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Identity subsystem.
CREATE TABLE IF NOT EXISTS accounts (
    uid           TEXT PRIMARY KEY,
    email         TEXT,
    display_name  TEXT,
    photo_url     TEXT,
    created_at    TEXT NOT NULL
);

-- users/{uid}
CREATE TABLE IF NOT EXISTS users (
    uid           TEXT PRIMARY KEY,
    email         TEXT,
    display_name  TEXT NOT NULL,
    photo_url     TEXT,
    created_at    TEXT NOT NULL,   -- server-assigned
    updated_at    TEXT NOT NULL,   -- server-assigned
    fcm_token     TEXT
);

-- chats/{chatId}
CREATE TABLE IF NOT EXISTS chats (
    chat_id       TEXT PRIMARY KEY,
    participants  TEXT NOT NULL,   -- JSON array of uids
    listing_title TEXT
);

-- empty_class_posts/{id}
CREATE TABLE IF NOT EXISTS posts (
    post_id       TEXT PRIMARY KEY,
    expires_at    TEXT NOT NULL,   -- fixed-width RFC 3339, compared as text
    fields        TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS posts_expires_idx ON posts(expires_at);

PRAGMA user_version = 1;
";
