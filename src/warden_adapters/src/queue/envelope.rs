use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::NotificationJob;

/// What actually travels through the broker: the job plus delivery bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub id: Uuid,
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    pub job: NotificationJob,
}

impl JobEnvelope {
    pub fn new(job: NotificationJob) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempts: 0,
            enqueued_at: Utc::now(),
            job,
        }
    }

    /// The same job, one failed attempt later.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempts: self.attempts.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
