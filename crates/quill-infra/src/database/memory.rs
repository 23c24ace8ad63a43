//! In-memory post repository - used when no database is configured.

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::PersistenceError;
use quill_core::domain::{Post, PostStatus};
use quill_core::ports::{BaseRepository, PageRequest, PostRepository};

/// Post store backed by a `Vec` behind an async RwLock.
///
/// Posts keep insertion order, which is also creation order.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }

    async fn filtered(&self, keep: impl Fn(&Post) -> bool) -> Vec<Post> {
        let posts = self.posts.read().await;
        posts.iter().filter(|p| keep(p)).cloned().collect()
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, PersistenceError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == Some(id)).cloned())
    }

    async fn count(&self) -> Result<u64, PersistenceError> {
        Ok(self.posts.read().await.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, PersistenceError> {
        let mut posts = self.posts.write().await;
        let deleted = posts.len() as u64;
        posts.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn save(&self, post: Post) -> Result<Post, PersistenceError> {
        post.validate()?;

        let post = post.assign_identity(Utc::now());
        let mut posts = self.posts.write().await;

        let saved = match posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => {
                existing.title = post.title;
                existing.content = post.content;
                existing.status = post.status;
                existing.clone()
            }
            None => {
                posts.push(post.clone());
                post
            }
        };

        tracing::debug!(post_id = ?saved.id, status = %saved.status, "Saved post in memory");
        Ok(saved)
    }

    async fn insert(&self, post: Post) -> Result<Post, PersistenceError> {
        post.validate()?;

        let post = post.assign_identity(Utc::now());
        let mut posts = self.posts.write().await;

        if posts.iter().any(|p| p.id == post.id) {
            return Err(PersistenceError::ConstraintViolation(format!(
                "post {} already exists",
                post.id.unwrap_or_default()
            )));
        }
        posts.push(post.clone());

        tracing::debug!(post_id = ?post.id, status = %post.status, "Inserted post in memory");
        Ok(post)
    }

    async fn find_by_title_contains(
        &self,
        fragment: &str,
    ) -> Result<Vec<Post>, PersistenceError> {
        Ok(self.filtered(|p| p.title.contains(fragment)).await)
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, PersistenceError> {
        Ok(self.filtered(|p| p.status == status).await)
    }

    fn find_all(&self) -> BoxStream<'_, Result<Post, PersistenceError>> {
        // Snapshot on first poll so the lock is not held while the caller consumes.
        stream::once(async move { self.posts.read().await.clone() })
            .flat_map(|posts| stream::iter(posts.into_iter().map(Ok)))
            .boxed()
    }

    async fn find_page(&self, page: PageRequest) -> Result<Vec<Post>, PersistenceError> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}
