//! Authentication ports.

use crate::domain::UserId;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub username: String,
    /// Unix timestamp (seconds) the token was issued at.
    pub issued_at: i64,
}

/// Token service trait for signed, stateless session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a signed token for a user. Tokens carry no expiry.
    fn issue_token(&self, user_id: UserId, username: &str) -> Result<String, AuthError>;

    /// Verify a token's signature and decode its claims.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing session token")]
    MissingToken,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}
