//! Session and credential ports used by the login flow.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::User;

/// Who a session belongs to, and until when it is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and checks the token kept in the session cookie.
pub trait SessionTokens: Send + Sync {
    /// Start a session for `user`.
    fn issue(&self, user: &User) -> Result<String, AuthError>;

    /// Decode a token taken from a cookie.
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// How long an issued session stays valid. Also the cookie max-age.
    fn lifetime(&self) -> TimeDelta;
}

/// One-way storage for [`User::password_hash`].
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` on a wrong password. `Err` only when `stored` is unreadable.
    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no session cookie")]
    NoSession,

    #[error("session expired")]
    SessionExpired,

    #[error("session token rejected: {0}")]
    BadToken(String),

    #[error("password hashing failed: {0}")]
    BadHash(String),
}
