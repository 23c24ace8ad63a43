//! Domain entities - the core business objects.

mod post;

pub use post::{ParseStatusError, Post, PostStatus, TITLE_MAX_LEN};
