//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use inkpost_core::domain::{Author, Post, PostId, PostWithAuthor, User};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, read_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Keep usernames out of debug logs in full.
fn mask(username: &str) -> String {
    match username.chars().next() {
        Some(first) if username.chars().count() > 1 => format!("{first}***"),
        _ => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %mask(username), "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await
            .map_err(read_error)?;

        Ok(result.map(Into::into))
    }
}

fn with_author(
    (post, author): (post::Model, Option<user::Model>),
) -> Result<PostWithAuthor, RepoError> {
    let author = author.ok_or_else(|| {
        RepoError::Query(format!("post {} references a missing author", post.id))
    })?;

    Ok(PostWithAuthor {
        post: post.into(),
        author: Author {
            id: author.id.into(),
            username: author.username,
        },
    })
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.update(&*self.db).await.map_err(write_error)?;

        Ok(model.into())
    }

    async fn find_with_author(&self, id: PostId) -> Result<Option<PostWithAuthor>, RepoError> {
        let row = PostEntity::find_by_id(id.as_uuid())
            .find_also_related(UserEntity)
            .one(&*self.db)
            .await
            .map_err(read_error)?;

        row.map(with_author).transpose()
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db)
            .await
            .map_err(read_error)?;

        rows.into_iter().map(with_author).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_username() {
        assert_eq!(mask("alice"), "a***");
        assert_eq!(mask("a"), "***");
        assert_eq!(mask(""), "***");
    }
}
