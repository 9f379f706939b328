//! Registration, login and session verification.

use std::sync::Arc;

use crate::domain::{MAX_USERNAME_LEN, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthError, PasswordService, TokenClaims, TokenService, UserRepository};

/// A freshly opened session: the user and the token to hand to the client.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Verifies credentials, issues and validates session tokens.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Register a new user under a unique username.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::Validation(format!(
                "Username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Duplicate(
                "Username is already taken".to_string(),
            ));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        // A concurrent registration can still win the race; the store's
        // uniqueness constraint turns that into `Duplicate` as well.
        let user = self
            .users
            .insert(User::new(username.to_string(), password_hash))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => {
                    DomainError::Duplicate("Username is already taken".to_string())
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, DomainError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .tokens
            .issue_token(user.id, &user.username)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(Session { user, token })
    }

    /// Decode the identity embedded in a session token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        self.tokens.validate_token(token).inspect_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{FakeTokens, FakeUsers, PlainPasswords};

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(FakeUsers::default()),
            Arc::new(PlainPasswords),
            Arc::new(FakeTokens),
        )
    }

    #[tokio::test]
    async fn test_register_returns_user_with_hashed_password() {
        let auth = service();

        let user = auth.register("alice", "pw123").await.unwrap();

        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "pw123");
    }

    #[tokio::test]
    async fn test_register_twice_is_duplicate() {
        let auth = service();
        auth.register("alice", "pw123").await.unwrap();

        let err = auth.register("alice", "other").await.unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_register_requires_both_fields() {
        let auth = service();

        assert!(matches!(
            auth.register("  ", "pw").await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            auth.register("bob", "").await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_overlong_username() {
        let auth = service();

        let err = auth
            .register(&"a".repeat(MAX_USERNAME_LEN + 1), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Counted in characters, not bytes.
        let user = auth.register(&"é".repeat(MAX_USERNAME_LEN), "pw").await.unwrap();
        assert_eq!(user.username.chars().count(), MAX_USERNAME_LEN);
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_not_found() {
        let auth = service();

        let err = auth.login("ghost", "pw").await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { entity_type: "user", .. }));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let auth = service();
        auth.register("alice", "pw123").await.unwrap();

        for attempt in ["pw1234", "PW123", "wrong", " pw123"] {
            let err = auth.login("alice", attempt).await.unwrap_err();
            assert!(matches!(err, DomainError::Unauthorized), "{attempt}");
        }
    }

    #[tokio::test]
    async fn test_login_token_verifies_to_same_identity() {
        let auth = service();
        let user = auth.register("alice", "pw123").await.unwrap();

        let session = auth.login("alice", "pw123").await.unwrap();
        let claims = auth.verify(&session.token).unwrap();

        assert_eq!(session.user.id, user.id);
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_verify_rejects_empty_and_garbage() {
        let auth = service();

        assert!(matches!(auth.verify(""), Err(AuthError::MissingToken)));
        assert!(matches!(
            auth.verify("garbage"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
