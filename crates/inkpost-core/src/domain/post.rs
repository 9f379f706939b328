use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PostId, UserId};

/// Post entity - a blog post with a cover image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub summary: String,
    pub content: String,
    /// Storage path of the uploaded cover image.
    pub cover: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: UserId, draft: PostDraft, cover: String) -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            author_id,
            title: draft.title,
            summary: draft.summary,
            content: draft.content,
            cover,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    /// Replace the text fields, and the cover when a new one is given.
    pub fn apply(&mut self, draft: PostDraft, cover: Option<String>) {
        self.title = draft.title;
        self.summary = draft.summary;
        self.content = draft.content;
        if let Some(cover) = cover {
            self.cover = cover;
        }
        self.updated_at = Utc::now();
    }
}

/// Text fields supplied when creating or editing a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub summary: String,
    pub content: String,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            content: content.into(),
        }
    }

    /// Names of the fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("summary", &self.summary),
            ("content", &self.content),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Public identity of a post's author, resolved for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub username: String,
}

/// A post joined with its author's username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}
