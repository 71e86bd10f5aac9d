use redis::aio::ConnectionManager;
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use warden_adapters::config::{PostgresSettings, RedisSettings, Settings};
use warden_adapters::{
    Argon2PasswordHasher, CryptoTokenGenerator, JwtSessionManager, PostgresActionTokenStore,
    PostgresUserStore, RedisJobQueue, RedisRateLimiter,
};

use crate::identity_service::{IdentityConfig, IdentityPorts, IdentityService};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Postgres error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Email client error: {0}")]
    EmailClient(String),
}

pub type ProductionIdentityService = IdentityService<
    PostgresUserStore,
    PostgresActionTokenStore,
    RedisRateLimiter,
    Argon2PasswordHasher,
    CryptoTokenGenerator,
    JwtSessionManager,
    RedisJobQueue,
>;

/// Connects to PostgreSQL and applies pending migrations.
pub async fn configure_postgresql(settings: &PostgresSettings) -> Result<PgPool, ServiceError> {
    let pg_pool = get_postgres_pool(settings.url.expose_secret()).await?;

    sqlx::migrate!().run(&pg_pool).await?;

    Ok(pg_pool)
}

/// Opens a reconnecting, cloneable Redis connection.
pub async fn configure_redis(settings: &RedisSettings) -> Result<ConnectionManager, ServiceError> {
    let client = get_redis_client(&settings.host_name)?;
    Ok(client.get_connection_manager().await?)
}

pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}

pub fn get_redis_client(redis_hostname: &str) -> redis::RedisResult<redis::Client> {
    let redis_url = format!("redis://{}/", redis_hostname);
    redis::Client::open(redis_url)
}

/// Wires the production adapters behind every identity use case.
pub async fn build_identity_service(
    settings: &Settings,
) -> Result<ProductionIdentityService, ServiceError> {
    let pg_pool = configure_postgresql(&settings.postgres).await?;
    let redis = configure_redis(&settings.redis).await?;

    let ports = IdentityPorts {
        user_store: PostgresUserStore::new(pg_pool.clone()),
        token_store: PostgresActionTokenStore::new(pg_pool),
        rate_limiter: RedisRateLimiter::new(redis.clone()),
        password_hasher: Argon2PasswordHasher::new(),
        token_generator: CryptoTokenGenerator::new(),
        session_manager: JwtSessionManager::from_settings(&settings.auth.jwt),
        job_enqueuer: RedisJobQueue::new(redis, &settings.worker.queue_name, &settings.worker.id),
    };

    Ok(IdentityService::new(
        ports,
        IdentityConfig::from_settings(&settings.application, &settings.auth),
    ))
}
