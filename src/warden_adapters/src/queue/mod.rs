pub mod envelope;
pub mod in_memory_job_queue;
pub mod redis_job_queue;
pub mod worker;

pub use envelope::JobEnvelope;
pub use in_memory_job_queue::InMemoryJobQueue;
pub use redis_job_queue::RedisJobQueue;
pub use worker::{ErrorHook, NotificationWorker, WorkerConfig, WorkerStats};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A payload handed to one worker. It stays owned by that worker until it is
/// acknowledged, retried or dead-lettered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    receipt: String,
}

impl Delivery {
    pub fn new(receipt: String) -> Self {
        Self { receipt }
    }

    /// The raw payload exactly as the broker stored it.
    pub fn receipt(&self) -> &str {
        &self.receipt
    }

    pub fn decode(&self) -> Result<JobEnvelope, serde_json::Error> {
        JobEnvelope::decode(&self.receipt)
    }
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Broker unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to encode job: {0}")]
    Encoding(String),
}

/// Consumer side of the notification queue.
///
/// Each broker handle belongs to one worker id. A worker publishes a
/// heartbeat while it runs; processing lists whose owner stopped beating are
/// up for grabs by any other worker.
#[async_trait]
pub trait JobBroker: Send + Sync {
    /// Moves the oldest pending payload into this worker's processing list.
    async fn reserve(&self) -> Result<Option<Delivery>, BrokerError>;
    async fn acknowledge(&self, delivery: &Delivery) -> Result<(), BrokerError>;
    /// Replaces the delivery with `envelope`, held back from the pending list
    /// until `delay` has passed.
    async fn retry(
        &self,
        delivery: &Delivery,
        envelope: &JobEnvelope,
        delay: Duration,
    ) -> Result<(), BrokerError>;
    async fn dead_letter(&self, delivery: &Delivery) -> Result<(), BrokerError>;
    /// Moves retries whose delay has passed onto the pending list.
    async fn promote_due(&self) -> Result<usize, BrokerError>;
    /// Retries still waiting out their delay.
    async fn scheduled_len(&self) -> Result<usize, BrokerError>;
    /// Marks this worker as alive for `ttl`.
    async fn heartbeat(&self, ttl: Duration) -> Result<(), BrokerError>;
    /// Returns deliveries left in this worker's own processing list by a
    /// previous run to the pending list. Returns how many were moved.
    async fn requeue_own(&self) -> Result<usize, BrokerError>;
    /// Same as [`JobBroker::requeue_own`] for every other worker whose
    /// heartbeat has expired.
    async fn requeue_abandoned(&self) -> Result<usize, BrokerError>;
}
