use std::time::Duration;

use redis::aio::ConnectionManager;
use warden_core::{RateLimiter, RateLimiterError};

/// Fixed-window limiter backed by `SET NX PX`, shared by every process
/// pointing at the same Redis.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: ConnectionManager,
}

impl RedisRateLimiter {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl RateLimiter for RedisRateLimiter {
    #[tracing::instrument(name = "Checking rate limit in Redis", skip_all)]
    async fn allow(&self, key: &str, window: Duration) -> Result<bool, RateLimiterError> {
        let mut conn = self.conn.clone();
        let window_millis = window.as_millis().max(1) as u64;

        let reply: Option<String> = redis::cmd("SET")
            .arg(get_key(key))
            .arg(1)
            .arg("NX")
            .arg("PX")
            .arg(window_millis)
            .query_async(&mut conn)
            .await
            .map_err(|e| RateLimiterError::UnexpectedError(e.to_string()))?;

        Ok(reply.is_some())
    }
}

const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit:";

fn get_key(key: &str) -> String {
    format!("{RATE_LIMIT_KEY_PREFIX}{key}")
}
