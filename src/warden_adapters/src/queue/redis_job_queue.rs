use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use warden_core::{EnqueueError, JobEnqueuer, NotificationJob};

use super::{BrokerError, Delivery, JobBroker, JobEnvelope};

/// Moves up to ARGV[2] members of the scheduled set whose score is at most
/// ARGV[1] onto the pending list.
const PROMOTE_DUE_SCRIPT: &str = r"
local due = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', ARGV[1], 'LIMIT', 0, ARGV[2])
for _, payload in ipairs(due) do
    redis.call('ZREM', KEYS[1], payload)
    redis.call('LPUSH', KEYS[2], payload)
end
return #due
";

const PROMOTE_BATCH: usize = 100;
const SCAN_COUNT: usize = 100;

/// Reliable list-based queue.
///
/// Producers `LPUSH` onto `<queue>`. A worker `LMOVE`s the oldest entry into
/// `<queue>:processing:<worker id>` and only removes it from there once the
/// job is settled. While it runs, the worker keeps `<queue>:alive:<worker id>`
/// set with a short expiry; any other worker that finds a processing list
/// without that key moves its entries back to `<queue>`. Retries wait in the
/// `<queue>:scheduled` sorted set, scored by the unix millisecond they are
/// due at. Failed jobs end up in `<queue>:dead`.
#[derive(Clone)]
pub struct RedisJobQueue {
    conn: ConnectionManager,
    queue_name: String,
    worker_id: String,
    pending_key: String,
    processing_key: String,
    scheduled_key: String,
    dead_key: String,
}

impl RedisJobQueue {
    pub fn new(conn: ConnectionManager, queue_name: &str, worker_id: &str) -> Self {
        Self {
            conn,
            queue_name: queue_name.to_owned(),
            worker_id: worker_id.to_owned(),
            pending_key: queue_name.to_owned(),
            processing_key: processing_key(queue_name, worker_id),
            scheduled_key: format!("{queue_name}:scheduled"),
            dead_key: format!("{queue_name}:dead"),
        }
    }

    pub fn dead_letter_key(&self) -> &str {
        &self.dead_key
    }

    fn alive_key(&self, worker_id: &str) -> String {
        format!("{}:alive:{worker_id}", self.queue_name)
    }

    async fn push_pending(&self, payload: String) -> Result<(), redis::RedisError> {
        let mut conn = self.conn.clone();
        redis::cmd("LPUSH")
            .arg(&self.pending_key)
            .arg(payload)
            .query_async::<()>(&mut conn)
            .await
    }

    /// Drains `source` onto the consuming end of the pending list.
    async fn requeue_list(&self, source: &str) -> Result<usize, BrokerError> {
        let mut conn = self.conn.clone();
        let mut moved = 0;

        loop {
            let payload: Option<String> = redis::cmd("LMOVE")
                .arg(source)
                .arg(&self.pending_key)
                .arg("RIGHT")
                .arg("RIGHT")
                .query_async(&mut conn)
                .await
                .map_err(unavailable)?;

            match payload {
                Some(_) => moved += 1,
                None => break,
            }
        }

        Ok(moved)
    }

    async fn processing_lists(&self) -> Result<Vec<String>, BrokerError> {
        let mut conn = self.conn.clone();
        let pattern = processing_key(&self.queue_name, "*");
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(unavailable)?;

            keys.extend(batch);
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        Ok(keys)
    }
}

fn processing_key(queue_name: &str, worker_id: &str) -> String {
    format!("{queue_name}:processing:{worker_id}")
}

fn unavailable(e: redis::RedisError) -> BrokerError {
    BrokerError::Unavailable(e.to_string())
}

fn due_at_millis(delay: Duration) -> i64 {
    let delay = chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::MAX);
    chrono::Utc::now()
        .timestamp_millis()
        .saturating_add(delay.num_milliseconds())
}

#[async_trait]
impl JobEnqueuer for RedisJobQueue {
    #[tracing::instrument(
        name = "Enqueueing notification job in Redis",
        skip_all,
        fields(job_type = job.job_type())
    )]
    async fn enqueue(&self, job: NotificationJob) -> Result<(), EnqueueError> {
        let payload = JobEnvelope::new(job)
            .encode()
            .map_err(|e| EnqueueError::Serialization(e.to_string()))?;

        self.push_pending(payload)
            .await
            .map_err(|e| EnqueueError::Broker(e.to_string()))
    }
}

#[async_trait]
impl JobBroker for RedisJobQueue {
    async fn reserve(&self) -> Result<Option<Delivery>, BrokerError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = redis::cmd("LMOVE")
            .arg(&self.pending_key)
            .arg(&self.processing_key)
            .arg("RIGHT")
            .arg("LEFT")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        Ok(payload.map(Delivery::new))
    }

    async fn acknowledge(&self, delivery: &Delivery) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        redis::cmd("LREM")
            .arg(&self.processing_key)
            .arg(1)
            .arg(delivery.receipt())
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)
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
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .cmd("LREM")
            .arg(&self.processing_key)
            .arg(1)
            .arg(delivery.receipt())
            .ignore()
            .cmd("ZADD")
            .arg(&self.scheduled_key)
            .arg(due_at_millis(delay))
            .arg(payload)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn dead_letter(&self, delivery: &Delivery) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .cmd("LREM")
            .arg(&self.processing_key)
            .arg(1)
            .arg(delivery.receipt())
            .ignore()
            .cmd("LPUSH")
            .arg(&self.dead_key)
            .arg(delivery.receipt())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn promote_due(&self) -> Result<usize, BrokerError> {
        let mut conn = self.conn.clone();
        redis::Script::new(PROMOTE_DUE_SCRIPT)
            .key(&self.scheduled_key)
            .key(&self.pending_key)
            .arg(chrono::Utc::now().timestamp_millis())
            .arg(PROMOTE_BATCH)
            .invoke_async::<usize>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn scheduled_len(&self) -> Result<usize, BrokerError> {
        let mut conn = self.conn.clone();
        redis::cmd("ZCARD")
            .arg(&self.scheduled_key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn heartbeat(&self, ttl: Duration) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        redis::cmd("SET")
            .arg(self.alive_key(&self.worker_id))
            .arg(1)
            .arg("PX")
            .arg(ttl_millis)
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn requeue_own(&self) -> Result<usize, BrokerError> {
        self.requeue_list(&self.processing_key).await
    }

    #[tracing::instrument(name = "RedisJobQueue::requeue_abandoned", skip(self))]
    async fn requeue_abandoned(&self) -> Result<usize, BrokerError> {
        let prefix = processing_key(&self.queue_name, "");
        let mut moved = 0;

        for key in self.processing_lists().await? {
            let Some(owner) = key.strip_prefix(&prefix) else {
                continue;
            };
            if owner == self.worker_id {
                continue;
            }

            let mut conn = self.conn.clone();
            let alive: bool = redis::cmd("EXISTS")
                .arg(self.alive_key(owner))
                .query_async(&mut conn)
                .await
                .map_err(unavailable)?;
            if alive {
                continue;
            }

            let recovered = self.requeue_list(&key).await?;
            if recovered > 0 {
                tracing::warn!(worker_id = owner, recovered, "Recovered jobs of a dead worker");
            }
            moved += recovered;
        }

        Ok(moved)
    }
}
