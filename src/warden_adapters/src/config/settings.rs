use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, builder::DefaultState};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use warden_application::NotificationFailurePolicy;
use warden_core::ActionLinks;

use super::constants::{defaults, env};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
    pub postgres: PostgresSettings,
    pub redis: RedisSettings,
    pub email_client: EmailClientSettings,
    pub worker: WorkerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub links: ActionLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt: JwtSettings,
    pub action_token_ttl_minutes: i64,
    pub resend_verification_window_seconds: u64,
    pub notification_failure_policy: NotificationFailurePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    pub issuer: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub host_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender: String,
    pub auth_token: Secret<String>,
    pub timeout_millis: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    #[serde(default = "generate_worker_id")]
    pub id: String,
    pub queue_name: String,
    pub concurrency: usize,
    pub poll_interval_millis: u64,
    pub max_attempts: u32,
    /// Liveness is published at this rate and expires after three missed beats.
    pub heartbeat_interval_millis: u64,
    pub retry_backoff_millis: u64,
    pub max_retry_backoff_millis: u64,
    pub token_purge_interval_seconds: u64,
}

fn generate_worker_id() -> String {
    format!("worker-{}", uuid::Uuid::new_v4())
}

impl Settings {
    /// Loads settings from, in increasing priority: built-in defaults,
    /// `<config dir>/base.json`, `<config dir>/local.json` and `WARDEN__*`
    /// environment variables (e.g. `WARDEN__AUTH__JWT__SECRET`).
    ///
    /// The config directory defaults to `./config` and can be moved with
    /// `WARDEN_CONFIG_DIR`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config_dir = std::env::var(env::CONFIG_DIR_ENV_VAR)
            .unwrap_or_else(|_| defaults::CONFIG_DIR.to_owned());
        let config_dir = Path::new(&config_dir);

        let settings: Settings = Self::with_defaults()?
            .add_source(File::from(config_dir.join("base.json")).required(false))
            .add_source(File::from(config_dir.join("local.json")).required(false))
            .add_source(
                Environment::with_prefix(env::ENV_PREFIX)
                    .separator(env::ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overlaid with a single JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Self::with_defaults()?
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("auth.jwt.issuer", defaults::JWT_ISSUER)?
            .set_default("auth.jwt.ttl_seconds", defaults::JWT_TTL_SECONDS)?
            .set_default(
                "auth.action_token_ttl_minutes",
                defaults::ACTION_TOKEN_TTL_MINUTES,
            )?
            .set_default(
                "auth.resend_verification_window_seconds",
                defaults::RESEND_VERIFICATION_WINDOW_SECONDS,
            )?
            .set_default("redis.host_name", defaults::REDIS_HOST_NAME)?
            .set_default(
                "email_client.base_url",
                super::constants::prod::email_client::BASE_URL,
            )?
            .set_default(
                "email_client.timeout_millis",
                super::constants::prod::email_client::TIMEOUT_MILLIS,
            )?
            .set_default("worker.queue_name", defaults::worker::QUEUE_NAME)?
            .set_default("worker.concurrency", defaults::worker::CONCURRENCY as u64)?
            .set_default(
                "worker.poll_interval_millis",
                defaults::worker::POLL_INTERVAL_MILLIS,
            )?
            .set_default("worker.max_attempts", defaults::worker::MAX_ATTEMPTS as u64)?
            .set_default(
                "worker.heartbeat_interval_millis",
                defaults::worker::HEARTBEAT_INTERVAL_MILLIS,
            )?
            .set_default(
                "worker.retry_backoff_millis",
                defaults::worker::RETRY_BACKOFF_MILLIS,
            )?
            .set_default(
                "worker.max_retry_backoff_millis",
                defaults::worker::MAX_RETRY_BACKOFF_MILLIS,
            )?
            .set_default(
                "worker.token_purge_interval_seconds",
                defaults::worker::TOKEN_PURGE_INTERVAL_SECONDS,
            )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt.secret.expose_secret().is_empty() {
            return Err(ConfigError::Message("auth.jwt.secret must not be empty".into()));
        }
        if self.auth.jwt.ttl_seconds <= 0 {
            return Err(ConfigError::Message("auth.jwt.ttl_seconds must be positive".into()));
        }
        if self.auth.action_token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "auth.action_token_ttl_minutes must be positive".into(),
            ));
        }
        if self.auth.resend_verification_window_seconds == 0 {
            return Err(ConfigError::Message(
                "auth.resend_verification_window_seconds must be positive".into(),
            ));
        }
        if self.worker.concurrency == 0 || self.worker.max_attempts == 0 {
            return Err(ConfigError::Message(
                "worker.concurrency and worker.max_attempts must be positive".into(),
            ));
        }
        if self.worker.heartbeat_interval_millis == 0
            || self.worker.token_purge_interval_seconds == 0
        {
            return Err(ConfigError::Message(
                "worker.heartbeat_interval_millis and worker.token_purge_interval_seconds must be positive"
                    .into(),
            ));
        }
        if self.worker.retry_backoff_millis > self.worker.max_retry_backoff_millis {
            return Err(ConfigError::Message(
                "worker.retry_backoff_millis must not exceed worker.max_retry_backoff_millis".into(),
            ));
        }
        Ok(())
    }
}

impl AuthSettings {
    pub fn action_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.action_token_ttl_minutes)
    }

    pub fn resend_verification_window(&self) -> Duration {
        Duration::from_secs(self.resend_verification_window_seconds)
    }
}

impl EmailClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

impl WorkerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_millis)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_millis)
    }

    pub fn max_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.max_retry_backoff_millis)
    }

    pub fn token_purge_interval(&self) -> Duration {
        Duration::from_secs(self.token_purge_interval_seconds)
    }
}
