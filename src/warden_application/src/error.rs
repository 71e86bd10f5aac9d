use warden_core::{ActionTokenStoreError, InvalidTokenReason, UserStoreError};

/// Classification of use-case failures, independent of the concrete error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCredentials,
    InvalidToken(InvalidTokenReason),
    RateLimitExceeded,
    EmailNotVerified,
    UserAlreadyVerified,
    Conflict,
    Forbidden,
    NotFound,
    InvalidInput,
    Storage,
    Enqueue,
    Internal,
}

impl ErrorKind {
    /// Text that is safe to show to the caller.
    ///
    /// Every token failure reads the same, whatever the reason.
    pub fn public_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCredentials => "invalid credentials",
            ErrorKind::InvalidToken(_) => "invalid or expired token",
            ErrorKind::RateLimitExceeded => "too many requests, try again later",
            ErrorKind::EmailNotVerified => "email address is not verified",
            ErrorKind::UserAlreadyVerified => "account is already verified",
            ErrorKind::Conflict => "resource already exists",
            ErrorKind::Forbidden => "not allowed",
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Storage | ErrorKind::Enqueue | ErrorKind::Internal => {
                "internal server error"
            }
        }
    }
}

pub trait ClassifyError {
    fn kind(&self) -> ErrorKind;

    fn public_message(&self) -> &'static str {
        self.kind().public_message()
    }
}

impl ClassifyError for UserStoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            UserStoreError::UserNotFound => ErrorKind::NotFound,
            UserStoreError::UserAlreadyExists => ErrorKind::Conflict,
            UserStoreError::UnexpectedError(_) => ErrorKind::Storage,
        }
    }
}

impl ClassifyError for ActionTokenStoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            ActionTokenStoreError::InvalidToken(reason) => ErrorKind::InvalidToken(*reason),
            ActionTokenStoreError::DuplicateToken | ActionTokenStoreError::UnexpectedError(_) => {
                ErrorKind::Storage
            }
        }
    }
}
