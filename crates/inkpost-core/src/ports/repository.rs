use async_trait::async_trait;

use crate::domain::{Post, PostId, PostWithAuthor, User, UserId};
use crate::error::RepoError;

/// Generic repository trait for the operations every store shares.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Fails with `RepoError::Constraint` on a
    /// uniqueness or foreign key violation.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// Credential store.
#[async_trait]
pub trait UserRepository: BaseRepository<User, UserId> {
    /// Find a user by their (unique) username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post store.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    /// Overwrite a stored post. Fails with `RepoError::NotFound` if absent.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Find one post with its author's username resolved.
    async fn find_with_author(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepoError>;

    /// Most recently created posts first, at most `limit` of them.
    async fn list_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError>;
}
