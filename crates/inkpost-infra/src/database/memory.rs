//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use inkpost_core::domain::{Author, Post, PostId, PostWithAuthor, User, UserId};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, PostRepository, UserRepository};

/// Users keyed by id; usernames are kept unique under the write lock.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn author(&self, id: UserId) -> Option<Author> {
        self.users.read().await.get(&id).map(|u| Author {
            id: u.id,
            username: u.username.clone(),
        })
    }
}

#[async_trait]
impl BaseRepository<User, UserId> for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint on username".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

/// Posts in insertion order, joined against an [`InMemoryUserRepository`].
pub struct InMemoryPostRepository {
    users: Arc<InMemoryUserRepository>,
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            posts: RwLock::new(Vec::new()),
        }
    }

    async fn join(&self, post: Post) -> Result<PostWithAuthor, RepoError> {
        let author = self.users.author(post.author_id).await.ok_or_else(|| {
            RepoError::Query(format!("post {} references a missing author", post.id))
        })?;
        Ok(PostWithAuthor { post, author })
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        if self.users.author(post.author_id).await.is_none() {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        self.posts.write().await.push(post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn find_with_author(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepoError> {
        match self.find_by_id(id).await? {
            Some(post) => self.join(post).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError> {
        // Newest insertions first so that equal timestamps keep creation order.
        let mut recent: Vec<Post> = self.posts.read().await.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit as usize);

        let mut joined = Vec::with_capacity(recent.len());
        for post in recent {
            joined.push(self.join(post).await?);
        }
        Ok(joined)
    }
}
