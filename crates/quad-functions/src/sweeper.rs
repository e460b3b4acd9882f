//! Expiry sweeper: deletes posts whose `expires_at` has passed.
//!
//! Reads are paginated and each page is deleted as one atomic batch of at
//! most `chunk_size` documents, so the run stays within the store's batch
//! mutation limit however many posts have expired.

use chrono::{DateTime, Utc};
use quad_core::store::DocumentStore;

use crate::outcome::{Effect, HandlerError, Outcome, Skip};

/// Delete every post with `expires_at < now`, `chunk_size` at a time.
///
/// A failed read or commit stops the run; batches already committed stay
/// deleted and the remaining posts are picked up by the next run.
pub async fn cleanup_expired_posts<S>(store: &S, chunk_size: usize, now: DateTime<Utc>) -> Outcome
where
  S: DocumentStore,
{
  let chunk_size = chunk_size.max(1);
  let mut deleted = 0;
  let mut batches = 0;

  loop {
    let ids = match store.expired_posts(now, chunk_size).await {
      Ok(ids) => ids,
      Err(e) => return Outcome::Failed(HandlerError::Sweep { deleted, source: Box::new(e) }),
    };
    if ids.is_empty() {
      break;
    }

    let removed = match store.delete_posts(&ids).await {
      Ok(n) => n,
      Err(e) => return Outcome::Failed(HandlerError::Sweep { deleted, source: Box::new(e) }),
    };
    deleted += removed;
    batches += 1;
    tracing::debug!(batch = batches, removed, "committed expired post batch");

    // A short page is the last one; an empty commit means someone else is
    // deleting the same posts.
    if ids.len() < chunk_size || removed == 0 {
      break;
    }
  }

  if batches == 0 {
    Outcome::Skipped(Skip::NothingExpired)
  } else {
    Outcome::Completed(Effect::PostsDeleted { deleted, batches })
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use quad_core::document::NewPost;
  use quad_store_sqlite::SqliteStore;

  use super::*;
  use crate::testing::{BrokenStore, FlakyDeletes, FlakyError};

  #[tokio::test]
  async fn deletes_expired_and_keeps_live_posts() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let now = Utc::now();
    let p1 = store.put_post(NewPost::expiring_at(now - Duration::hours(1))).await.unwrap();
    let p2 = store.put_post(NewPost::expiring_at(now + Duration::hours(1))).await.unwrap();

    let outcome = cleanup_expired_posts(&store, 500, now).await;
    assert_eq!(
      outcome.effect(),
      Some(&Effect::PostsDeleted { deleted: 1, batches: 1 })
    );
    assert!(store.get_post(&p1.id).await.unwrap().is_none());
    assert!(store.get_post(&p2.id).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn nothing_expired_is_a_noop() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let now = Utc::now();
    store.put_post(NewPost::expiring_at(now + Duration::hours(1))).await.unwrap();

    let outcome = cleanup_expired_posts(&store, 500, now).await;
    assert_eq!(outcome.skip(), Some(Skip::NothingExpired));
  }

  #[tokio::test]
  async fn second_run_deletes_nothing() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let now = Utc::now();
    store.put_post(NewPost::expiring_at(now - Duration::minutes(5))).await.unwrap();

    assert!(cleanup_expired_posts(&store, 500, now).await.effect().is_some());
    let again = cleanup_expired_posts(&store, 500, now).await;
    assert_eq!(again.skip(), Some(Skip::NothingExpired));
  }

  #[tokio::test]
  async fn commits_in_fixed_size_chunks() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let now = Utc::now();
    for i in 0..7 {
      store
        .put_post(NewPost::expiring_at(now - Duration::minutes(i + 1)))
        .await
        .unwrap();
    }
    let live = store.put_post(NewPost::expiring_at(now + Duration::minutes(1))).await.unwrap();

    let outcome = cleanup_expired_posts(&store, 3, now).await;
    assert_eq!(
      outcome.effect(),
      Some(&Effect::PostsDeleted { deleted: 7, batches: 3 })
    );
    assert!(store.expired_posts(now, 100).await.unwrap().is_empty());
    assert!(store.get_post(&live.id).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn exact_multiple_of_chunk_size_needs_one_empty_read() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let now = Utc::now();
    for i in 0..4 {
      store
        .put_post(NewPost::expiring_at(now - Duration::minutes(i + 1)))
        .await
        .unwrap();
    }

    let outcome = cleanup_expired_posts(&store, 2, now).await;
    assert_eq!(
      outcome.effect(),
      Some(&Effect::PostsDeleted { deleted: 4, batches: 2 })
    );
  }

  #[tokio::test]
  async fn read_failure_is_recoverable() {
    let outcome = cleanup_expired_posts(&BrokenStore, 500, Utc::now()).await;
    match outcome {
      Outcome::Failed(HandlerError::Sweep { deleted, .. }) => assert_eq!(deleted, 0),
      other => panic!("unexpected outcome: {other:?}"),
    }
  }

  #[tokio::test]
  async fn commit_failure_reports_batches_already_deleted() {
    let store = FlakyDeletes::new(SqliteStore::open_in_memory().await.unwrap(), 1);
    let now = Utc::now();
    for i in 0..5 {
      store
        .put_post(NewPost::expiring_at(now - Duration::minutes(i + 1)))
        .await
        .unwrap();
    }

    let outcome = cleanup_expired_posts(&store, 2, now).await;
    match outcome {
      Outcome::Failed(HandlerError::Sweep { deleted, source }) => {
        assert_eq!(deleted, 2);
        assert!(source.downcast_ref::<FlakyError>().is_some());
      }
      other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(store.inner.expired_posts(now, 100).await.unwrap().len(), 3);
  }
}
