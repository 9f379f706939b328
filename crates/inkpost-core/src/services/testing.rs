//! Lightweight port fakes for service tests.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Author, Post, PostId, PostWithAuthor, User, UserId};
use crate::error::RepoError;
use crate::ports::{
    AuthError, BaseRepository, PasswordService, PostRepository, StorageError, TokenClaims,
    TokenService, UploadStore, UserRepository,
};

#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<Vec<User>>,
}

impl FakeUsers {
    fn author(&self, id: UserId) -> Option<Author> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .map(|u| Author {
                id: u.id,
                username: u.username.clone(),
            })
    }
}

#[async_trait]
impl BaseRepository<User, UserId> for FakeUsers {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("username".to_string()));
        }
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

pub struct FakePosts {
    users: Arc<FakeUsers>,
    posts: Mutex<Vec<Post>>,
}

impl FakePosts {
    pub fn new(users: Arc<FakeUsers>) -> Self {
        Self {
            users,
            posts: Mutex::new(Vec::new()),
        }
    }

    fn join(&self, post: Post) -> Option<PostWithAuthor> {
        let author = self.users.author(post.author_id)?;
        Some(PostWithAuthor { post, author })
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for FakePosts {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for FakePosts {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn find_with_author(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepoError> {
        let post = self.find_by_id(id).await?;
        Ok(post.and_then(|p| self.join(p)))
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut posts: Vec<Post> = self.posts.lock().unwrap().iter().rev().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts
            .into_iter()
            .take(limit as usize)
            .filter_map(|p| self.join(p))
            .collect())
    }
}

/// Records every stored path; names files `uploads/<n>.<ext>`.
#[derive(Default)]
pub struct FakeUploads {
    stored: Mutex<Vec<String>>,
}

impl FakeUploads {
    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadStore for FakeUploads {
    async fn store(&self, _bytes: &[u8], original_name: &str) -> Result<String, StorageError> {
        let mut stored = self.stored.lock().unwrap();
        let ext = original_name.rsplit('.').next().unwrap_or_default();
        let path = format!("uploads/{}.{}", stored.len(), ext);
        stored.push(path.clone());
        Ok(path)
    }
}

pub struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain${password}"))
    }
}

/// Tokens of the form `<user id>|<username>`.
pub struct FakeTokens;

impl TokenService for FakeTokens {
    fn issue_token(&self, user_id: UserId, username: &str) -> Result<String, AuthError> {
        Ok(format!("{user_id}|{username}"))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let (id, username) = token
            .split_once('|')
            .ok_or_else(|| AuthError::InvalidToken("malformed".to_string()))?;
        let user_id = id
            .parse()
            .map_err(|_| AuthError::InvalidToken("bad subject".to_string()))?;
        Ok(TokenClaims {
            user_id,
            username: username.to_string(),
            issued_at: 0,
        })
    }
}
