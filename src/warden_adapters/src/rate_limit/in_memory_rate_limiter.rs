use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use warden_core::{RateLimiter, RateLimiterError};

/// Process-local fixed-window limiter. Each key remembers when its window
/// closes; the entry API keeps check-and-set atomic per key.
#[derive(Default, Clone)]
pub struct InMemoryRateLimiter {
    windows: Arc<DashMap<String, Instant>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every closed window.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows.retain(|_, closes_at| *closes_at > now);
    }
}

#[async_trait::async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn allow(&self, key: &str, window: Duration) -> Result<bool, RateLimiterError> {
        let now = Instant::now();

        match self.windows.entry(key.to_owned()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    return Ok(false);
                }
                entry.insert(now + window);
                Ok(true)
            }
            Entry::Vacant(entry) => {
                entry.insert(now + window);
                Ok(true)
            }
        }
    }
}
