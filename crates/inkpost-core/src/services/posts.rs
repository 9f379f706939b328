//! Post creation, editing and reads.

use std::sync::Arc;

use crate::domain::{Post, PostDraft, PostId, PostWithAuthor, UserId};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UploadStore, UserRepository};

/// Number of posts returned by a listing when the caller doesn't ask otherwise.
pub const DEFAULT_LIST_LIMIT: u64 = 20;

/// An uploaded cover image that has not been stored yet.
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub bytes: Vec<u8>,
    /// File name as sent by the client, used for the extension.
    pub file_name: String,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    uploads: Arc<dyn UploadStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        uploads: Arc<dyn UploadStore>,
    ) -> Self {
        Self {
            posts,
            users,
            uploads,
        }
    }

    /// Create a post owned by `author_id` with `cover` as its image.
    pub async fn create_post(
        &self,
        author_id: UserId,
        draft: PostDraft,
        cover: CoverUpload,
    ) -> Result<Post, DomainError> {
        validate(&draft)?;

        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(DomainError::not_found("user", author_id));
        }

        let cover_path = self.store_cover(cover).await?;
        let post = self
            .posts
            .insert(Post::new(author_id, draft, cover_path))
            .await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    /// Edit a post. Only its author may do so; the cover changes only when a
    /// new one is uploaded.
    pub async fn update_post(
        &self,
        post_id: PostId,
        author_id: UserId,
        draft: PostDraft,
        cover: Option<CoverUpload>,
    ) -> Result<Post, DomainError> {
        validate(&draft)?;

        let mut post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        if !post.is_authored_by(author_id) {
            tracing::warn!(post_id = %post_id, user_id = %author_id, "Rejected edit by non-author");
            return Err(DomainError::Forbidden(
                "You are not the author of this post".to_string(),
            ));
        }

        let cover_path = match cover {
            Some(cover) => Some(self.store_cover(cover).await?),
            None => None,
        };
        post.apply(draft, cover_path);

        // Last write wins when two edits race.
        let post = self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("post", post_id),
            other => other.into(),
        })?;

        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Newest posts first, with authors resolved.
    pub async fn list_posts(&self, limit: u64) -> Result<Vec<PostWithAuthor>, DomainError> {
        Ok(self.posts.list_recent(limit).await?)
    }

    pub async fn get_post(&self, id: PostId) -> Result<PostWithAuthor, DomainError> {
        self.posts
            .find_with_author(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    async fn store_cover(&self, cover: CoverUpload) -> Result<String, DomainError> {
        self.uploads
            .store(&cover.bytes, &cover.file_name)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
    }
}

fn validate(draft: &PostDraft) -> Result<(), DomainError> {
    let missing = draft.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::ports::BaseRepository;
    use crate::services::testing::{FakePosts, FakeUploads, FakeUsers};

    struct Fixture {
        service: PostService,
        users: Arc<FakeUsers>,
        uploads: Arc<FakeUploads>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(FakeUsers::default());
        let posts = Arc::new(FakePosts::new(users.clone()));
        let uploads = Arc::new(FakeUploads::default());
        Fixture {
            service: PostService::new(posts, users.clone(), uploads.clone()),
            users,
            uploads,
        }
    }

    async fn add_user(users: &FakeUsers, name: &str) -> User {
        users
            .insert(User::new(name.to_string(), "hash".to_string()))
            .await
            .unwrap()
    }

    fn cover(name: &str) -> CoverUpload {
        CoverUpload {
            bytes: vec![1, 2, 3],
            file_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_post_stores_cover_and_owner() {
        let fx = fixture();
        let alice = add_user(&fx.users, "alice").await;

        let post = fx
            .service
            .create_post(alice.id, PostDraft::new("A", "B", "C"), cover("img.png"))
            .await
            .unwrap();

        assert_eq!(post.author_id, alice.id);
        assert_eq!(post.title, "A");
        assert_eq!(post.cover, "uploads/0.png");
        assert_eq!(fx.uploads.stored(), vec!["uploads/0.png".to_string()]);
    }

    #[tokio::test]
    async fn test_create_post_requires_fields() {
        let fx = fixture();
        let alice = add_user(&fx.users, "alice").await;

        let err = fx
            .service
            .create_post(alice.id, PostDraft::new("A", "", "C"), cover("img.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("summary")));
        assert!(fx.uploads.stored().is_empty());
    }

    #[tokio::test]
    async fn test_create_post_for_unknown_author_fails() {
        let fx = fixture();

        let err = fx
            .service
            .create_post(UserId::new(), PostDraft::new("A", "B", "C"), cover("img.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { entity_type: "user", .. }));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden_and_changes_nothing() {
        let fx = fixture();
        let alice = add_user(&fx.users, "alice").await;
        let mallory = add_user(&fx.users, "mallory").await;
        let post = fx
            .service
            .create_post(alice.id, PostDraft::new("A", "B", "C"), cover("img.png"))
            .await
            .unwrap();

        let err = fx
            .service
            .update_post(
                post.id,
                mallory.id,
                PostDraft::new("X", "Y", "Z"),
                Some(cover("evil.gif")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Forbidden(_)));
        let stored = fx.service.get_post(post.id).await.unwrap();
        assert_eq!(stored.post, post);
        assert_eq!(fx.uploads.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_cover_without_new_file() {
        let fx = fixture();
        let alice = add_user(&fx.users, "alice").await;
        let post = fx
            .service
            .create_post(alice.id, PostDraft::new("A", "B", "C"), cover("img.png"))
            .await
            .unwrap();

        let updated = fx
            .service
            .update_post(post.id, alice.id, PostDraft::new("A2", "B2", "C2"), None)
            .await
            .unwrap();

        assert_eq!(updated.title, "A2");
        assert_eq!(updated.cover, post.cover);
        assert_eq!(updated.created_at, post.created_at);

        let with_cover = fx
            .service
            .update_post(post.id, alice.id, PostDraft::new("A3", "B3", "C3"), Some(cover("new.jpg")))
            .await
            .unwrap();
        assert_eq!(with_cover.cover, "uploads/1.jpg");
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let fx = fixture();
        let alice = add_user(&fx.users, "alice").await;

        let err = fx
            .service
            .update_post(PostId::new(), alice.id, PostDraft::new("A", "B", "C"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { entity_type: "post", .. }));
    }

    #[tokio::test]
    async fn test_list_returns_newest_first_capped() {
        let fx = fixture();
        let alice = add_user(&fx.users, "alice").await;
        for i in 0..25 {
            fx.service
                .create_post(
                    alice.id,
                    PostDraft::new(format!("post {i}"), "s", "c"),
                    cover("img.png"),
                )
                .await
                .unwrap();
        }

        let posts = fx.service.list_posts(DEFAULT_LIST_LIMIT).await.unwrap();

        assert_eq!(posts.len(), 20);
        assert_eq!(posts[0].post.title, "post 24");
        assert_eq!(posts[19].post.title, "post 5");
        assert!(posts.iter().all(|p| p.author.username == "alice"));
        assert!(posts.windows(2).all(|w| w[0].post.created_at >= w[1].post.created_at));
    }

    #[tokio::test]
    async fn test_get_post_missing_is_not_found() {
        let fx = fixture();

        let err = fx.service.get_post(PostId::new()).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { entity_type: "post", .. }));
    }
}
