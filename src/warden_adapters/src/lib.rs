pub mod config;
pub mod email;
pub mod persistence;
pub mod queue;
pub mod rate_limit;
pub mod security;
pub mod templates;

pub use config::Settings;
pub use email::{MockEmailClient, PostmarkEmailClient, SentEmail};
pub use persistence::{
    HashMapActionTokenStore, HashMapUserStore, PostgresActionTokenStore, PostgresUserStore,
};
pub use queue::{
    BrokerError, Delivery, InMemoryJobQueue, JobBroker, JobEnvelope, NotificationWorker,
    RedisJobQueue, WorkerConfig, WorkerStats,
};
pub use rate_limit::{InMemoryRateLimiter, RedisRateLimiter};
pub use security::{Argon2PasswordHasher, CryptoTokenGenerator, JwtSessionManager};
pub use templates::AskamaTemplateRenderer;
