//! Post entity for SeaORM.

use sea_orm::{NotSet, Set};
use sea_orm::entity::prelude::*;

use quill_core::domain::PostStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub status: Status,
    pub created_at: DateTimeWithTimeZone,
}

/// `posts.status`, stored as the status name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Status {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PENDING_MODERATION")]
    PendingModeration,
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => Self::Draft,
            PostStatus::PendingModeration => Self::PendingModeration,
            PostStatus::Published => Self::Published,
        }
    }
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Draft => Self::Draft,
            Status::PendingModeration => Self::PendingModeration,
            Status::Published => Self::Published,
        }
    }
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            title: model.title,
            content: model.content,
            status: model.status.into(),
            created_at: Some(model.created_at.into()),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
///
/// Identity and creation time stay `NotSet` when the post has none yet.
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: post.id.map_or(NotSet, Set),
            title: Set(post.title),
            content: Set(post.content),
            status: Set(post.status.into()),
            created_at: post.created_at.map_or(NotSet, |at| Set(at.into())),
        }
    }
}
