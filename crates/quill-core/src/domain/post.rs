use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PersistenceError;

/// Longest title the `posts.title` column accepts.
pub const TITLE_MAX_LEN: usize = 255;

/// Publication state of a post. No transition rules are enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    #[default]
    Draft,
    PendingModeration,
    Published,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [Self::Draft, Self::PendingModeration, Self::Published];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingModeration => "PENDING_MODERATION",
            Self::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown post status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for PostStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Post entity - a titled piece of content with a publication status.
///
/// `id` and `created_at` stay `None` until the post has been persisted once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new, unpersisted draft.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            status: PostStatus::Draft,
            created_at: None,
        }
    }

    /// Use a caller-chosen identity instead of a store-generated one.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some() && self.created_at.is_some()
    }

    /// Reject posts the `posts` table would not accept.
    pub fn validate(&self) -> Result<(), PersistenceError> {
        if self.title.trim().is_empty() {
            return Err(PersistenceError::ValidationFailure(
                "title must not be blank".to_string(),
            ));
        }

        let len = self.title.chars().count();
        if len > TITLE_MAX_LEN {
            return Err(PersistenceError::ValidationFailure(format!(
                "title is {len} characters, at most {TITLE_MAX_LEN} allowed"
            )));
        }

        // PostgreSQL text columns cannot hold NUL.
        for (field, value) in [("title", &self.title), ("content", &self.content)] {
            if value.contains('\0') {
                return Err(PersistenceError::ValidationFailure(format!(
                    "{field} must not contain NUL bytes"
                )));
            }
        }

        Ok(())
    }

    /// Fill in the identity and creation time every stored post carries.
    ///
    /// Values that are already present are left alone.
    pub fn assign_identity(mut self, now: DateTime<Utc>) -> Self {
        self.id.get_or_insert_with(Uuid::new_v4);
        self.created_at.get_or_insert(now);
        self
    }
}
