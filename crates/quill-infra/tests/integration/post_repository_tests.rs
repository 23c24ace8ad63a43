//! Integration tests for PostgresPostRepository.
//!
//! Each test provisions its own database through `setup_test_db`, which also
//! empties the `posts` table first.

use std::collections::HashSet;

use futures::{StreamExt, TryStreamExt};
use quill_core::PersistenceError;
use quill_core::domain::{Post, PostStatus, TITLE_MAX_LEN};
use quill_core::ports::{BaseRepository, PageRequest, PostRepository};
use uuid::Uuid;

use crate::integration::common::{published_post, setup_test_db};

async fn stored(repo: &impl PostRepository, id: Uuid) -> Post {
    repo.find_by_id(id)
        .await
        .expect("find_by_id should succeed")
        .expect("post should exist")
}

async fn row_count(repo: &impl PostRepository) -> u64 {
    repo.count().await.expect("count should succeed")
}

/// Inserting and saving, with and without an explicit id, always yields id and created_at.
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_insert_and_save() {
    let db = setup_test_db().await;

    let inserted = db
        .posts()
        .insert(Post::new("test title", "test content"))
        .await
        .expect("insert should succeed");
    assert!(inserted.id.is_some(), "store should assign an id");
    assert!(inserted.created_at.is_some(), "created_at should be stamped");

    let inserted_with_id = db
        .posts()
        .insert(Post::new("test title", "test content").with_id(Uuid::new_v4()))
        .await
        .expect("insert with id should succeed");
    assert!(inserted_with_id.created_at.is_some());

    let saved = db
        .posts()
        .save(Post::new("test title", "test content"))
        .await
        .expect("save should succeed");
    assert!(saved.id.is_some(), "store should assign an id");
    assert!(saved.created_at.is_some(), "created_at should be stamped");

    let id = Uuid::new_v4();
    let saved_with_id = db
        .posts()
        .save(Post::new("test title", "test content").with_id(id))
        .await
        .expect("save with id should succeed");
    assert_eq!(saved_with_id.id, Some(id), "caller id should be honoured");
    assert!(saved_with_id.created_at.is_some());

    let ids: HashSet<_> = [
        inserted.id,
        inserted_with_id.id,
        saved.id,
        saved_with_id.id,
    ]
    .into_iter()
    .collect();
    assert_eq!(ids.len(), 4, "ids should be unique");
    assert_eq!(row_count(db.posts()).await, 4);
}

/// Round-trip, then update in place (title and status).
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_insert_and_query() {
    let db = setup_test_db().await;

    let saved = db
        .posts()
        .save(Post::new("test title", "test content"))
        .await
        .expect("save should succeed");
    let id = saved.id.expect("id should be assigned");

    let mut found = stored(db.posts(), id).await;
    assert_eq!(found.title, "test title");
    assert_eq!(found.content, "test content");
    assert_eq!(found.status, PostStatus::Draft);
    assert_eq!(found.created_at, saved.created_at);

    found.title = "update title".to_string();
    found.status = PostStatus::PendingModeration;
    let updated = db.posts().save(found).await.expect("update should succeed");
    assert_eq!(updated.id, Some(id), "update should keep the identity");
    assert_eq!(
        updated.created_at, saved.created_at,
        "created_at should never change"
    );

    let updated_posts = db
        .posts()
        .find_by_title_contains("update")
        .await
        .expect("title search should succeed");
    assert_eq!(updated_posts.len(), 1);
    assert_eq!(updated_posts[0].title, "update title");

    let pending = db
        .posts()
        .find_by_status(PostStatus::PendingModeration)
        .await
        .expect("status search should succeed");
    assert_eq!(pending.len(), 1);
    assert!(
        db.posts()
            .find_by_status(PostStatus::Draft)
            .await
            .expect("status search should succeed")
            .is_empty()
    );
    assert_eq!(row_count(db.posts()).await, 1);
}

/// A caller-supplied created_at on update is ignored in favour of the stored one.
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_resave_keeps_original_created_at() {
    let db = setup_test_db().await;

    let saved = db
        .posts()
        .save(Post::new("test title", "test content"))
        .await
        .expect("save should succeed");

    let mut tampered = saved.clone();
    tampered.created_at = Some(chrono::Utc::now() + chrono::Duration::days(1));
    let resaved = db.posts().save(tampered).await.expect("resave should succeed");

    assert_eq!(resaved.created_at, saved.created_at);
}

/// Default status is DRAFT; PUBLISHED posts are found by status.
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_published_posts() {
    let db = setup_test_db().await;

    let draft = db
        .posts()
        .save(Post::new("test title", "test content"))
        .await
        .expect("save should succeed");
    assert_eq!(draft.status, PostStatus::Draft);

    db.posts()
        .delete_all()
        .await
        .expect("clear should succeed");

    let saved = db
        .posts()
        .save(Post::new("test title", "test content").with_status(PostStatus::Published))
        .await
        .expect("save should succeed");
    assert!(saved.id.is_some());

    let published = db
        .posts()
        .find_by_status(PostStatus::Published)
        .await
        .expect("status search should succeed");
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].status, PostStatus::Published);
    assert_eq!(published[0].title, "test title");
}

/// 15 posts split into pages of 10 and 5.
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_pagination() {
    let db = setup_test_db().await;

    let saved: Vec<Post> = db
        .posts()
        .save_all((1..=15).map(published_post).collect())
        .inspect_ok(|post| tracing::debug!(post_id = ?post.id, "saved post"))
        .try_collect()
        .await
        .expect("save_all should succeed");
    assert_eq!(saved.len(), 15);

    let page1: Vec<Post> = db
        .posts()
        .find_all()
        .skip(0)
        .take(10)
        .try_collect()
        .await
        .expect("first page should load");
    assert_eq!(page1.len(), 10);

    let page2: Vec<Post> = db
        .posts()
        .find_all()
        .skip(10)
        .take(10)
        .try_collect()
        .await
        .expect("second page should load");
    assert_eq!(page2.len(), 5);

    let server_page1 = db
        .posts()
        .find_page(PageRequest::of(0, 10))
        .await
        .expect("server-side page should load");
    let server_page2 = db
        .posts()
        .find_page(PageRequest::of(1, 10))
        .await
        .expect("server-side page should load");
    assert_eq!(server_page1, page1);
    assert_eq!(server_page2, page2);
}

/// An invalid element stops save_all; earlier rows stay committed.
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_save_all_fails_fast() {
    let db = setup_test_db().await;

    let batch = vec![
        published_post(1),
        published_post(2),
        Post::new("x".repeat(TITLE_MAX_LEN + 1), "too long"),
        published_post(4),
    ];

    let results: Vec<_> = db.posts().save_all(batch).collect().await;

    assert_eq!(results.len(), 3);
    assert!(results[..2].iter().all(Result::is_ok));
    assert!(matches!(
        results[2],
        Err(PersistenceError::ValidationFailure(_))
    ));
    assert_eq!(row_count(db.posts()).await, 2);
}

#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_find_missing_post_is_none() {
    let db = setup_test_db().await;

    let found = db
        .posts()
        .find_by_id(Uuid::new_v4())
        .await
        .expect("missing rows are not an error");
    assert!(found.is_none());
}

#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_delete_all_reports_count() {
    let db = setup_test_db().await;

    for n in 1..=3 {
        db.posts()
            .save(published_post(n))
            .await
            .expect("save should succeed");
    }

    let deleted = db.posts().delete_all().await.expect("clear should succeed");
    assert_eq!(deleted, 3);
    assert_eq!(row_count(db.posts()).await, 0);
}

/// Inserting an identity twice is a constraint violation and keeps the first row.
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_duplicate_insert_is_constraint_violation() {
    let db = setup_test_db().await;
    let id = Uuid::new_v4();

    let first = db
        .posts()
        .insert(Post::new("test title", "test content").with_id(id))
        .await
        .expect("first insert should succeed");

    let err = db
        .posts()
        .insert(Post::new("other title", "other content").with_id(id))
        .await
        .expect_err("second insert should fail");
    assert!(
        matches!(err, PersistenceError::ConstraintViolation(_)),
        "unexpected error: {err}"
    );

    assert_eq!(stored(db.posts(), id).await, first);
    assert_eq!(row_count(db.posts()).await, 1);
}

/// Windows beyond the BIGINT range are clamped rather than failing to bind.
#[tokio::test]
#[ignore = "requires Docker or TEST_DATABASE_URL"]
async fn test_oversized_page_is_empty() {
    let db = setup_test_db().await;
    db.posts()
        .save(published_post(1))
        .await
        .expect("save should succeed");

    let page = db
        .posts()
        .find_page(PageRequest {
            offset: u64::MAX,
            limit: u64::MAX,
        })
        .await
        .expect("oversized page should load");
    assert!(page.is_empty());
}
