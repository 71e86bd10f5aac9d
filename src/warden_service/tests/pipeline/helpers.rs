use std::time::Duration;

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use secrecy::Secret;
use warden_adapters::{
    Argon2PasswordHasher, AskamaTemplateRenderer, CryptoTokenGenerator, HashMapActionTokenStore,
    HashMapUserStore, InMemoryJobQueue, InMemoryRateLimiter, JwtSessionManager, MockEmailClient,
    NotificationWorker, SentEmail, WorkerConfig,
};
use warden_application::{NotificationFailurePolicy, NotificationProcessor};
use warden_core::{
    ActionLinks, Email, Identity, Password, PasswordHasher, Role, User, UserStore,
};
use warden_service::{IdentityConfig, IdentityPorts, IdentityService};

pub type InMemoryIdentityService = IdentityService<
    HashMapUserStore,
    HashMapActionTokenStore,
    InMemoryRateLimiter,
    Argon2PasswordHasher,
    CryptoTokenGenerator,
    JwtSessionManager,
    InMemoryJobQueue,
>;

pub struct TestApp {
    pub service: InMemoryIdentityService,
    pub users: HashMapUserStore,
    pub tokens: HashMapActionTokenStore,
    pub queue: InMemoryJobQueue,
    pub mailbox: MockEmailClient,
}

pub fn links() -> ActionLinks {
    ActionLinks {
        password_reset: "https://app.example.com/reset-password".to_owned(),
        email_confirmation: "https://app.example.com/auth/confirm-email".to_owned(),
        account_verification: "https://app.example.com/verify-account".to_owned(),
    }
}

pub fn config() -> IdentityConfig {
    IdentityConfig {
        links: links(),
        action_token_ttl: chrono::Duration::minutes(30),
        resend_verification_window: Duration::from_secs(300),
        failure_policy: NotificationFailurePolicy::RevokeToken,
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: IdentityConfig) -> Self {
        let users = HashMapUserStore::new();
        let tokens = HashMapActionTokenStore::new();
        let queue = InMemoryJobQueue::new();

        let ports = IdentityPorts {
            user_store: users.clone(),
            token_store: tokens.clone(),
            rate_limiter: InMemoryRateLimiter::new(),
            password_hasher: Argon2PasswordHasher::new(),
            token_generator: CryptoTokenGenerator::new(),
            session_manager: JwtSessionManager::new(
                Secret::new("pipeline-test-secret".to_owned()),
                "warden".to_owned(),
                chrono::Duration::hours(24),
            ),
            job_enqueuer: queue.clone(),
        };

        Self {
            service: IdentityService::new(ports, config),
            users,
            tokens,
            queue,
            mailbox: MockEmailClient::new(),
        }
    }

    /// Saves a user directly, bypassing registration.
    pub async fn seed_user(&self, address: &str, password: &str, verified: bool) -> User {
        let hash = Argon2PasswordHasher::new()
            .hash(&Password::try_from(password).unwrap())
            .await
            .unwrap();
        let mut user = User::new(
            Name().fake(),
            Email::try_from(address).unwrap(),
            hash,
            Role::Client,
        )
        .unwrap();
        if verified {
            user.mark_as_verified(chrono::Utc::now());
        }
        self.users.save(&user).await.unwrap();
        user
    }

    pub async fn login(&self, address: &str, password: &str) -> Identity {
        self.service
            .login
            .execute(email(address), Password::try_from(password).unwrap())
            .await
            .unwrap()
            .identity
    }

    /// Runs a worker over everything queued so far and returns the mailbox.
    pub async fn deliver_notifications(&self) -> Vec<SentEmail> {
        let worker = NotificationWorker::new(
            self.queue.clone(),
            NotificationProcessor::new(AskamaTemplateRenderer::new(), self.mailbox.clone()),
            WorkerConfig {
                concurrency: 4,
                poll_interval: Duration::from_millis(10),
                max_attempts: 3,
                heartbeat_interval: Duration::from_secs(1),
                retry_backoff: Duration::from_millis(1),
                max_retry_backoff: Duration::from_millis(10),
            },
        );
        worker.run_until_idle().await.unwrap();
        self.mailbox.sent().await
    }
}

pub fn email(address: &str) -> Email {
    Email::try_from(address).unwrap()
}

pub fn password(raw: &str) -> Password {
    Password::try_from(raw).unwrap()
}

pub fn random_email() -> String {
    SafeEmail().fake()
}

/// Pulls the action token out of a link embedded in an email body.
pub fn token_from(sent: &SentEmail) -> String {
    let start = sent
        .content
        .find("token=")
        .expect("email has no token link")
        + "token=".len();
    sent.content[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}
