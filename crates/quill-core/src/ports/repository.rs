use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use uuid::Uuid;

use crate::domain::{Post, PostStatus};
use crate::error::PersistenceError;

/// Generic repository trait for operations that do not depend on the entity shape.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID. A missing row is `Ok(None)`.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, PersistenceError>;

    /// Number of stored entities.
    async fn count(&self) -> Result<u64, PersistenceError>;

    /// Remove every entity, returning how many were deleted.
    async fn delete_all(&self) -> Result<u64, PersistenceError>;
}

/// A window over the store's stable ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Largest offset or limit a SQL backend can bind (a signed BIGINT).
    pub const MAX_WINDOW: u64 = i64::MAX as u64;

    /// Zero-based page `page` of `size` items.
    pub fn of(page: u64, size: u64) -> Self {
        Self {
            offset: page.saturating_mul(size),
            limit: size,
        }
        .clamped()
    }

    /// The same window with offset and limit capped at `MAX_WINDOW`.
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset.min(Self::MAX_WINDOW),
            limit: self.limit.min(Self::MAX_WINDOW),
        }
    }
}

/// Post repository - the entity store for posts.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Insert or update by identity.
    ///
    /// A post without an `id` gets a generated one. `created_at` is stamped on
    /// first persistence and never changed by later saves. The returned post
    /// is the row as stored.
    async fn save(&self, post: Post) -> Result<Post, PersistenceError>;

    /// Insert only. An identity that is already stored fails with
    /// `ConstraintViolation` and the stored row is left untouched.
    async fn insert(&self, post: Post) -> Result<Post, PersistenceError>;

    async fn find_by_title_contains(&self, fragment: &str)
    -> Result<Vec<Post>, PersistenceError>;

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, PersistenceError>;

    /// Every post, oldest first, produced lazily.
    fn find_all(&self) -> BoxStream<'_, Result<Post, PersistenceError>>;

    /// One page of the `find_all` ordering, sliced by the backend.
    async fn find_page(&self, page: PageRequest) -> Result<Vec<Post>, PersistenceError>;

    /// Save each post in order as the stream is polled.
    ///
    /// Writes are not batched into a transaction. The first failure is
    /// yielded and ends the stream; posts saved before it stay saved.
    fn save_all(&self, posts: Vec<Post>) -> BoxStream<'_, Result<Post, PersistenceError>> {
        stream::try_unfold(posts.into_iter(), move |mut pending| async move {
            match pending.next() {
                Some(post) => {
                    let saved = self.save(post).await?;
                    Ok(Some((saved, pending)))
                }
                None => Ok(None),
            }
        })
        .boxed()
    }
}
