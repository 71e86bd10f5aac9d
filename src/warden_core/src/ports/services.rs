use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use crate::domain::{Email, EmailTemplate, Identity, NotificationJob, Password};

// EmailClient port trait and errors

/// A rendered notification ready to hand to the mail provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub recipient: Email,
    pub subject: String,
    pub html_body: String,
    /// Job type of the notification, used by the provider to group messages.
    pub tag: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailDeliveryError {
    #[error("Email provider rejected the message ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("Email provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailDeliveryError>;
}

// TemplateRenderer port trait and errors
pub type TemplateContext = BTreeMap<&'static str, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Missing template variable '{0}'")]
    MissingVariable(&'static str),
    #[error("Failed to render template: {0}")]
    RenderFailed(String),
}

pub trait TemplateRenderer: Send + Sync {
    fn render(
        &self,
        template: EmailTemplate,
        context: &TemplateContext,
    ) -> Result<String, TemplateError>;
}

// PasswordHasher port trait and errors
#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<Secret<String>, PasswordHasherError>;
    /// `Ok(false)` on mismatch; `Err` only when the comparison could not run.
    async fn compare(
        &self,
        hash: &Secret<String>,
        password: &Password,
    ) -> Result<bool, PasswordHasherError>;
}

// SecureTokenGenerator port trait and errors
#[derive(Debug, Error)]
#[error("Secure random source failed: {0}")]
pub struct TokenGeneratorError(pub String);

pub trait SecureTokenGenerator: Send + Sync {
    /// Hex-encoded token with at least 32 bytes of entropy.
    fn generate(&self) -> Result<String, TokenGeneratorError>;
    /// Fixed-length digit string for short-lived human-entered codes.
    fn generate_numeric(&self, length: usize) -> Result<String, TokenGeneratorError>;
}

// RateLimiter port trait and errors
#[derive(Debug, Error)]
pub enum RateLimiterError {
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Fixed window: returns `true` iff `key` was absent and is now held for `window`.
    async fn allow(&self, key: &str, window: Duration) -> Result<bool, RateLimiterError>;
}

// SessionManager port trait and errors
#[derive(Clone)]
pub struct SessionToken(Secret<String>);

impl SessionToken {
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Failed to issue session token: {0}")]
    IssueFailed(String),
}

pub trait SessionManager: Send + Sync {
    fn generate(&self, identity: &Identity) -> Result<SessionToken, SessionError>;
    fn validate(&self, token: &str) -> Result<Identity, SessionError>;
}

// JobEnqueuer port trait and errors
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("Failed to serialize job: {0}")]
    Serialization(String),
    #[error("Broker rejected job: {0}")]
    Broker(String),
}

#[async_trait]
pub trait JobEnqueuer: Send + Sync {
    /// Returns once the broker has durably accepted the job.
    async fn enqueue(&self, job: NotificationJob) -> Result<(), EnqueueError>;
}

// NotificationHandler port trait and errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid recipient address")]
    InvalidRecipient,
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Failed to send email: {0}")]
    Delivery(#[from] EmailDeliveryError),
}

impl NotificationError {
    /// Only an unavailable provider is worth another attempt.
    pub fn is_permanent(&self) -> bool {
        !matches!(
            self,
            NotificationError::Delivery(EmailDeliveryError::Unavailable(_))
        )
    }
}

#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle(&self, job: &NotificationJob) -> Result<(), NotificationError>;
}
