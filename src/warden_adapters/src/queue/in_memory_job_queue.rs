use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use warden_core::{EnqueueError, JobEnqueuer, NotificationJob};

use super::{BrokerError, Delivery, JobBroker, JobEnvelope};

const DEFAULT_WORKER_ID: &str = "local";

#[derive(Debug, Default)]
struct Lists {
    pending: VecDeque<String>,
    processing: HashMap<String, Vec<String>>,
    scheduled: Vec<(Instant, String)>,
    dead: Vec<String>,
    alive_until: HashMap<String, Instant>,
}

impl Lists {
    fn take_processing(&mut self, worker_id: &str, delivery: &Delivery) -> bool {
        let Some(list) = self.processing.get_mut(worker_id) else {
            return false;
        };
        match list.iter().position(|payload| payload == delivery.receipt()) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    fn requeue_from(&mut self, worker_id: &str) -> usize {
        let Some(stalled) = self.processing.remove(worker_id) else {
            return 0;
        };
        let moved = stalled.len();
        for payload in stalled.into_iter().rev() {
            self.pending.push_front(payload);
        }
        moved
    }
}

/// Single-process stand-in for the Redis queue with the same list semantics.
///
/// Handles made with [`InMemoryJobQueue::for_worker`] share the lists and act
/// as separate workers.
#[derive(Debug, Clone)]
pub struct InMemoryJobQueue {
    lists: Arc<Mutex<Lists>>,
    worker_id: String,
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self {
            lists: Arc::default(),
            worker_id: DEFAULT_WORKER_ID.to_owned(),
        }
    }
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_worker(&self, worker_id: &str) -> Self {
        Self {
            lists: Arc::clone(&self.lists),
            worker_id: worker_id.to_owned(),
        }
    }

    /// Pushes a raw payload, bypassing encoding.
    pub async fn push_raw(&self, payload: impl Into<String>) {
        self.lists.lock().await.pending.push_back(payload.into());
    }

    pub async fn pending_jobs(&self) -> Vec<NotificationJob> {
        self.lists
            .lock()
            .await
            .pending
            .iter()
            .filter_map(|payload| JobEnvelope::decode(payload).ok())
            .map(|envelope| envelope.job)
            .collect()
    }

    pub async fn pending_len(&self) -> usize {
        self.lists.lock().await.pending.len()
    }

    /// Deliveries held by any worker.
    pub async fn in_flight_len(&self) -> usize {
        self.lists.lock().await.processing.values().map(Vec::len).sum()
    }

    pub async fn dead_letters(&self) -> Vec<String> {
        self.lists.lock().await.dead.clone()
    }
}

#[async_trait]
impl JobEnqueuer for InMemoryJobQueue {
    async fn enqueue(&self, job: NotificationJob) -> Result<(), EnqueueError> {
        let payload = JobEnvelope::new(job)
            .encode()
            .map_err(|e| EnqueueError::Serialization(e.to_string()))?;
        self.lists.lock().await.pending.push_back(payload);
        Ok(())
    }
}

#[async_trait]
impl JobBroker for InMemoryJobQueue {
    async fn reserve(&self) -> Result<Option<Delivery>, BrokerError> {
        let mut lists = self.lists.lock().await;
        let Some(payload) = lists.pending.pop_front() else {
            return Ok(None);
        };
        lists
            .processing
            .entry(self.worker_id.clone())
            .or_default()
            .push(payload.clone());
        Ok(Some(Delivery::new(payload)))
    }

    async fn acknowledge(&self, delivery: &Delivery) -> Result<(), BrokerError> {
        self.lists
            .lock()
            .await
            .take_processing(&self.worker_id, delivery);
        Ok(())
    }

    async fn retry(
        &self,
        delivery: &Delivery,
        envelope: &JobEnvelope,
        delay: Duration,
    ) -> Result<(), BrokerError> {
        let payload = envelope
            .encode()
            .map_err(|e| BrokerError::Encoding(e.to_string()))?;
        let mut lists = self.lists.lock().await;
        lists.take_processing(&self.worker_id, delivery);
        lists.scheduled.push((Instant::now() + delay, payload));
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery) -> Result<(), BrokerError> {
        let mut lists = self.lists.lock().await;
        lists.take_processing(&self.worker_id, delivery);
        lists.dead.push(delivery.receipt().to_owned());
        Ok(())
    }

    async fn promote_due(&self) -> Result<usize, BrokerError> {
        let now = Instant::now();
        let mut lists = self.lists.lock().await;
        let (mut due, waiting): (Vec<_>, Vec<_>) = lists
            .scheduled
            .drain(..)
            .partition(|(due_at, _)| *due_at <= now);
        lists.scheduled = waiting;

        due.sort_by_key(|(due_at, _)| *due_at);
        let promoted = due.len();
        lists
            .pending
            .extend(due.into_iter().map(|(_, payload)| payload));
        Ok(promoted)
    }

    async fn scheduled_len(&self) -> Result<usize, BrokerError> {
        Ok(self.lists.lock().await.scheduled.len())
    }

    async fn heartbeat(&self, ttl: Duration) -> Result<(), BrokerError> {
        self.lists
            .lock()
            .await
            .alive_until
            .insert(self.worker_id.clone(), Instant::now() + ttl);
        Ok(())
    }

    async fn requeue_own(&self) -> Result<usize, BrokerError> {
        Ok(self.lists.lock().await.requeue_from(&self.worker_id))
    }

    async fn requeue_abandoned(&self) -> Result<usize, BrokerError> {
        let now = Instant::now();
        let mut lists = self.lists.lock().await;
        let abandoned: Vec<String> = lists
            .processing
            .keys()
            .filter(|id| **id != self.worker_id)
            .filter(|id| lists.alive_until.get(*id).is_none_or(|until| *until <= now))
            .cloned()
            .collect();

        let mut moved = 0;
        for worker_id in abandoned {
            moved += lists.requeue_from(&worker_id);
            lists.alive_until.remove(&worker_id);
        }
        Ok(moved)
    }
}
