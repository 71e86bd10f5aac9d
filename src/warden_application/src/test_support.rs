//! In-memory fakes shared by the use-case tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;
use warden_core::{
    ActionLinks, ActionToken, ActionTokenStore, ActionTokenStoreError, ActionType, Email,
    EmailClient, EmailDeliveryError, EmailTemplate, EnqueueError, Identity, InvalidTokenReason,
    JobEnqueuer, NotificationJob, OutgoingEmail, Password, PasswordHasher, PasswordHasherError,
    RateLimiter,
    RateLimiterError, Role, SecureTokenGenerator, SessionError, SessionManager, SessionToken,
    TemplateContext, TemplateError, TemplateRenderer, TokenGeneratorError, User, UserId,
    UserStore, UserStoreError,
};

#[derive(Clone, Default)]
pub struct FakeUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl FakeUserStore {
    pub async fn get(&self, id: UserId) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for FakeUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .filter(|user| !user.is_deleted())
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.email() == email && !user.is_deleted())
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_email_including_deleted(
        &self,
        email: &Email,
    ) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.email() == email)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn save(&self, user: &User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email() == user.email()) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id() != user.id() && u.email() == user.email())
        {
            return Err(UserStoreError::UserAlreadyExists);
        }
        match users.get_mut(&user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserStoreError::UserNotFound),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserStoreError::UserNotFound)?;
        user.mark_as_deleted(Utc::now());
        Ok(())
    }

    async fn count_admins(&self) -> Result<u64, UserStoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.role() == Role::Admin && !u.is_deleted())
            .count() as u64)
    }
}

#[derive(Clone, Default)]
pub struct FakeActionTokenStore {
    tokens: Arc<RwLock<HashMap<String, ActionToken>>>,
    fail_create: Arc<AtomicBool>,
}

impl FakeActionTokenStore {
    pub async fn contains(&self, token: &str) -> bool {
        self.tokens.read().await.contains_key(token)
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn all(&self) -> Vec<ActionToken> {
        self.tokens.read().await.values().cloned().collect()
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActionTokenStore for FakeActionTokenStore {
    async fn create(&self, token: &ActionToken) -> Result<(), ActionTokenStoreError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ActionTokenStoreError::UnexpectedError("db down".to_owned()));
        }
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token) {
            return Err(ActionTokenStoreError::DuplicateToken);
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_and_consume(
        &self,
        token: &str,
        action_type: ActionType,
    ) -> Result<ActionToken, ActionTokenStoreError> {
        let mut tokens = self.tokens.write().await;
        let matches = tokens
            .get(token)
            .is_some_and(|stored| stored.action_type == action_type);
        if !matches {
            return Err(ActionTokenStoreError::InvalidToken(
                InvalidTokenReason::NotFound,
            ));
        }
        let consumed = tokens.remove(token).ok_or(ActionTokenStoreError::InvalidToken(
            InvalidTokenReason::NotFound,
        ))?;
        if consumed.is_expired() {
            return Err(ActionTokenStoreError::InvalidToken(
                InvalidTokenReason::Expired,
            ));
        }
        Ok(consumed)
    }

    async fn purge_expired(&self) -> Result<u64, ActionTokenStoreError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Clone, Default)]
pub struct FakeRateLimiter {
    held: Arc<Mutex<HashSet<String>>>,
}

impl FakeRateLimiter {
    pub fn release_all(&self) {
        self.held.lock().unwrap().clear();
    }
}

#[async_trait]
impl RateLimiter for FakeRateLimiter {
    async fn allow(&self, key: &str, _window: Duration) -> Result<bool, RateLimiterError> {
        Ok(self.held.lock().unwrap().insert(key.to_owned()))
    }
}

#[derive(Clone, Default)]
pub struct FakePasswordHasher;

#[async_trait]
impl PasswordHasher for FakePasswordHasher {
    async fn hash(&self, password: &Password) -> Result<Secret<String>, PasswordHasherError> {
        Ok(Secret::new(format!(
            "hashed:{}",
            password.as_ref().expose_secret()
        )))
    }

    async fn compare(
        &self,
        hash: &Secret<String>,
        password: &Password,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hash.expose_secret() == &format!("hashed:{}", password.as_ref().expose_secret()))
    }
}

#[derive(Clone, Default)]
pub struct SequentialTokenGenerator {
    counter: Arc<AtomicU64>,
}

impl SecureTokenGenerator for SequentialTokenGenerator {
    fn generate(&self) -> Result<String, TokenGeneratorError> {
        let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{next:064x}"))
    }

    fn generate_numeric(&self, length: usize) -> Result<String, TokenGeneratorError> {
        let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{next:0length$}"))
    }
}

#[derive(Clone, Default)]
pub struct FakeSessionManager;

impl SessionManager for FakeSessionManager {
    fn generate(&self, identity: &Identity) -> Result<SessionToken, SessionError> {
        Ok(SessionToken::new(format!(
            "session:{}:{}",
            identity.user_id, identity.role
        )))
    }

    fn validate(&self, token: &str) -> Result<Identity, SessionError> {
        let mut parts = token.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("session"), Some(id), Some(role)) => {
                let user_id = id.parse().map_err(|_| SessionError::Unauthenticated)?;
                let role = role.parse().map_err(|_| SessionError::Unauthenticated)?;
                Ok(Identity::new(user_id, role))
            }
            _ => Err(SessionError::Unauthenticated),
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingEnqueuer {
    jobs: Arc<Mutex<Vec<NotificationJob>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingEnqueuer {
    pub fn failing() -> Self {
        let enqueuer = Self::default();
        enqueuer.failing.store(true, Ordering::SeqCst);
        enqueuer
    }

    pub fn jobs(&self) -> Vec<NotificationJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobEnqueuer for RecordingEnqueuer {
    async fn enqueue(&self, job: NotificationJob) -> Result<(), EnqueueError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EnqueueError::Broker("broker unavailable".to_owned()));
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub content: String,
    pub tag: &'static str,
}

#[derive(Clone, Default)]
pub struct RecordingEmailClient {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    failing: Arc<AtomicBool>,
    rejecting: Arc<AtomicBool>,
}

impl RecordingEmailClient {
    pub fn failing() -> Self {
        let client = Self::default();
        client.failing.store(true, Ordering::SeqCst);
        client
    }

    /// Answers like a provider refusing an inactive recipient.
    pub fn rejecting() -> Self {
        let client = Self::default();
        client.rejecting.store(true, Ordering::SeqCst);
        client
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailClient for RecordingEmailClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailDeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailDeliveryError::Unavailable("smtp timeout".to_owned()));
        }
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(EmailDeliveryError::Rejected {
                code: 406,
                message: "Inactive recipient".to_owned(),
            });
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: email.recipient.as_str().to_owned(),
            subject: email.subject.clone(),
            content: email.html_body.clone(),
            tag: email.tag,
        });
        Ok(())
    }
}

/// Renders `name|key=value|key=value` so tests can assert on the context.
#[derive(Clone, Default)]
pub struct FlatRenderer;

impl TemplateRenderer for FlatRenderer {
    fn render(
        &self,
        template: EmailTemplate,
        context: &TemplateContext,
    ) -> Result<String, TemplateError> {
        let mut out = template.name().to_owned();
        for (key, value) in context {
            out.push_str(&format!("|{key}={value}"));
        }
        Ok(out)
    }
}

pub fn email(address: &str) -> Email {
    Email::try_from(address).unwrap()
}

pub fn password(value: &str) -> Password {
    Password::try_from(value).unwrap()
}

pub fn links() -> ActionLinks {
    ActionLinks {
        password_reset: "https://app.example.com/reset-password".to_owned(),
        email_confirmation: "https://app.example.com/auth/confirm-email".to_owned(),
        account_verification: "https://app.example.com/verify-account".to_owned(),
    }
}

pub async fn seed_user(
    store: &FakeUserStore,
    address: &str,
    plain_password: &str,
    role: Role,
    verified: bool,
) -> User {
    let hash = FakePasswordHasher
        .hash(&password(plain_password))
        .await
        .unwrap();
    let mut user = User::new("Test User".to_owned(), email(address), hash, role).unwrap();
    if verified {
        user.mark_as_verified(Utc::now());
    }
    store.save(&user).await.unwrap();
    user
}
