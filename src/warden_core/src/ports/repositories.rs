use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ActionToken, ActionType, Email, User, UserId};

// UserStore port trait and errors
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::UserAlreadyExists, Self::UserAlreadyExists)
                | (Self::UserNotFound, Self::UserNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Persistence of the user aggregate.
///
/// Lookups ignore soft-deleted users unless the method name says otherwise.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError>;
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError>;
    async fn find_by_email_including_deleted(&self, email: &Email)
    -> Result<User, UserStoreError>;
    async fn save(&self, user: &User) -> Result<(), UserStoreError>;
    /// Fails with `UserAlreadyExists` if the new email belongs to another user.
    async fn update(&self, user: &User) -> Result<(), UserStoreError>;
    /// Soft delete: the row stays, `deleted_at` is set.
    async fn delete(&self, id: UserId) -> Result<(), UserStoreError>;
    async fn count_admins(&self) -> Result<u64, UserStoreError>;
}

// ActionTokenStore port trait and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenReason {
    NotFound,
    Expired,
}

impl InvalidTokenReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidTokenReason::NotFound => "not found",
            InvalidTokenReason::Expired => "expired",
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionTokenStoreError {
    #[error("Invalid token: {}", .0.as_str())]
    InvalidToken(InvalidTokenReason),
    #[error("Token already exists")]
    DuplicateToken,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for ActionTokenStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidToken(a), Self::InvalidToken(b)) => a == b,
            (Self::DuplicateToken, Self::DuplicateToken) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

#[async_trait]
pub trait ActionTokenStore: Send + Sync {
    async fn create(&self, token: &ActionToken) -> Result<(), ActionTokenStoreError>;

    /// Atomically removes the token matching `(token, action_type)` and returns
    /// what was stored.
    ///
    /// Under concurrent callers at most one observes success; the others get
    /// `InvalidToken(NotFound)`. An expired token is removed as well and
    /// reported as `InvalidToken(Expired)`.
    async fn find_and_consume(
        &self,
        token: &str,
        action_type: ActionType,
    ) -> Result<ActionToken, ActionTokenStoreError>;

    /// Deletes every token past its expiry and returns how many went.
    async fn purge_expired(&self) -> Result<u64, ActionTokenStoreError>;
}
