//! Post entity.

use crate::{Entity, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Post entity representing a single authored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Post {
    /// Unique identifier for the post.
    pub id: PostId,

    /// Post title.
    #[validate(length(min = 1))]
    pub title: String,

    /// Post body.
    #[validate(length(min = 1))]
    pub content: String,

    /// Author display name.
    #[validate(length(min = 1))]
    pub author: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new post with a fresh identifier and timestamps.
    #[must_use]
    pub fn new(title: String, content: String, author: String) -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            title,
            content,
            author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update and refreshes the update timestamp.
    ///
    /// Only the fields present in the patch change; absent fields keep
    /// their current values.
    pub fn apply_patch(&mut self, patch: &PostPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        self.updated_at = Utc::now();
    }
}

impl Entity<PostId> for Post {
    fn id(&self) -> &PostId {
        &self.id
    }
}

/// Partial update for a post.
///
/// The three fields here are the complete set a client may change;
/// identifier and timestamps are never client-writable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    /// New title, if changing.
    pub title: Option<String>,

    /// New body, if changing.
    pub content: Option<String>,

    /// New author, if changing.
    pub author: Option<String>,
}

impl PostPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.author.is_none()
    }
}
