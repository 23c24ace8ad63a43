//! PostgreSQL post repository.

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};

use quill_core::PersistenceError;
use quill_core::domain::{Post, PostStatus};
use quill_core::ports::{PageRequest, PostRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Posts in storage order: oldest first, id as the tie-breaker.
fn ordered() -> Select<PostEntity> {
    PostEntity::find()
        .order_by_asc(post::Column::CreatedAt)
        .order_by_asc(post::Column::Id)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn save(&self, post: Post) -> Result<Post, PersistenceError> {
        post.validate()?;

        let active: post::ActiveModel = post.assign_identity(Utc::now()).into();

        // An update never touches created_at.
        let upsert = OnConflict::column(post::Column::Id)
            .update_columns([
                post::Column::Title,
                post::Column::Content,
                post::Column::Status,
            ])
            .to_owned();

        let model = PostEntity::insert(active)
            .on_conflict(upsert)
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(post_id = %model.id, status = ?model.status, "Saved post");
        Ok(model.into())
    }

    async fn insert(&self, post: Post) -> Result<Post, PersistenceError> {
        post.validate()?;

        let active: post::ActiveModel = post.assign_identity(Utc::now()).into();

        let model = PostEntity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(post_id = %model.id, status = ?model.status, "Inserted post");
        Ok(model.into())
    }

    async fn find_by_title_contains(
        &self,
        fragment: &str,
    ) -> Result<Vec<Post>, PersistenceError> {
        tracing::debug!(fragment, "Finding posts by title");

        let result = ordered()
            .filter(post::Column::Title.contains(fragment))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, PersistenceError> {
        tracing::debug!(%status, "Finding posts by status");

        let result = ordered()
            .filter(post::Column::Status.eq(post::Status::from(status)))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    fn find_all(&self) -> BoxStream<'_, Result<Post, PersistenceError>> {
        stream::once(async move { ordered().stream(&self.db).await })
            .try_flatten()
            .map_ok(Post::from)
            .map_err(map_db_err)
            .boxed()
    }

    async fn find_page(&self, page: PageRequest) -> Result<Vec<Post>, PersistenceError> {
        // Values past i64::MAX cannot be bound as BIGINT.
        let page = page.clamped();
        tracing::debug!(offset = page.offset, limit = page.limit, "Fetching post page");

        let result = ordered()
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
