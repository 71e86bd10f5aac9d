use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use warden_core::{NotificationError, NotificationHandler, NotificationJob};

use super::{BrokerError, Delivery, JobBroker};
use crate::config::WorkerSettings;

/// Called for every failed handler run, before the job is retried or
/// dead-lettered.
pub type ErrorHook = Arc<dyn Fn(&NotificationJob, &NotificationError) + Send + Sync>;

/// A heartbeat stays valid for this many intervals.
const HEARTBEAT_TTL_FACTOR: u32 = 3;
const MAX_BACKOFF_EXPONENT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub heartbeat_interval: Duration,
    pub retry_backoff: Duration,
    pub max_retry_backoff: Duration,
}

impl WorkerConfig {
    /// Delay before the retry that follows the `failed_attempts`-th failure:
    /// `retry_backoff` doubled per earlier failure, capped at
    /// `max_retry_backoff`.
    pub fn retry_delay(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.retry_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_retry_backoff)
    }

    pub fn heartbeat_ttl(&self) -> Duration {
        self.heartbeat_interval.saturating_mul(HEARTBEAT_TTL_FACTOR)
    }
}

impl From<&WorkerSettings> for WorkerConfig {
    fn from(settings: &WorkerSettings) -> Self {
        Self {
            concurrency: settings.concurrency,
            poll_interval: settings.poll_interval(),
            max_attempts: settings.max_attempts,
            heartbeat_interval: settings.heartbeat_interval(),
            retry_backoff: settings.retry_backoff(),
            max_retry_backoff: settings.max_retry_backoff(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: u64,
    pub failed: u64,
    pub retried: u64,
    pub dead_lettered: u64,
}

#[derive(Debug, Default)]
struct Counters {
    processed: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    dead_lettered: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> WorkerStats {
        WorkerStats {
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            dead_lettered: self.dead_lettered.load(Ordering::Relaxed),
        }
    }
}

/// Pulls notification jobs from a broker and runs them through a handler,
/// at most `concurrency` at a time.
///
/// Delivery is at-least-once: a job whose handler failed with a transient
/// error goes back to the queue with its attempt counter bumped, until
/// `max_attempts` is reached and it is dead-lettered. Permanent failures and
/// payloads that cannot be decoded are dead-lettered on the spot.
pub struct NotificationWorker<B, H> {
    broker: Arc<B>,
    handler: Arc<H>,
    config: WorkerConfig,
    on_error: Option<ErrorHook>,
    counters: Arc<Counters>,
}

impl<B, H> NotificationWorker<B, H>
where
    B: JobBroker + 'static,
    H: NotificationHandler + 'static,
{
    pub fn new(broker: B, handler: H, config: WorkerConfig) -> Self {
        Self {
            broker: Arc::new(broker),
            handler: Arc::new(handler),
            config,
            on_error: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_error_hook(
        mut self,
        hook: impl Fn(&NotificationJob, &NotificationError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn stats(&self) -> WorkerStats {
        self.counters.snapshot()
    }

    /// Runs until `shutdown` resolves, then waits for in-flight jobs to
    /// settle.
    ///
    /// Deliveries stalled under this worker's id by a previous run are
    /// requeued first. While running, the worker beats every
    /// `heartbeat_interval` and takes over the jobs of workers that stopped
    /// beating. Due retries are promoted every `poll_interval`.
    #[tracing::instrument(name = "NotificationWorker::run", skip_all)]
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<WorkerStats, BrokerError> {
        let stalled = self.broker.requeue_own().await?;
        if stalled > 0 {
            tracing::warn!(stalled, "Requeued deliveries left over from a previous run");
        }
        self.broker.heartbeat(self.config.heartbeat_ttl()).await?;
        self.recover_abandoned().await;

        tracing::info!(
            concurrency = self.config.concurrency,
            max_attempts = self.config.max_attempts,
            "Notification worker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut in_flight = JoinSet::new();
        let mut heartbeat = ticker(self.config.heartbeat_interval);
        let mut promotion = ticker(self.config.poll_interval);
        tokio::pin!(shutdown);

        loop {
            // Reap finished tasks so the set does not grow without bound.
            while in_flight.try_join_next().is_some() {}

            let permit = tokio::select! {
                _ = &mut shutdown => break,
                _ = heartbeat.tick() => {
                    if let Err(e) = self.broker.heartbeat(self.config.heartbeat_ttl()).await {
                        tracing::error!(error = %e, "Failed to publish worker heartbeat");
                    }
                    self.recover_abandoned().await;
                    continue;
                }
                _ = promotion.tick() => {
                    self.promote_due().await;
                    continue;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            match self.broker.reserve().await {
                Ok(Some(delivery)) => {
                    let task = self.task(delivery);
                    in_flight.spawn(async move {
                        task.await;
                        drop(permit);
                    });
                }
                Ok(None) => {
                    drop(permit);
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
                Err(e) => {
                    drop(permit);
                    tracing::error!(error = %e, "Failed to reserve notification job");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!(in_flight = in_flight.len(), "Shutting down, draining in-flight jobs");
        while in_flight.join_next().await.is_some() {}

        let stats = self.stats();
        tracing::info!(?stats, "Notification worker stopped");
        Ok(stats)
    }

    /// Processes jobs until the queue is empty, nothing is in flight and no
    /// retry is waiting. Returns the number of deliveries taken from the
    /// broker.
    pub async fn run_until_idle(&self) -> Result<usize, BrokerError> {
        self.broker.heartbeat(self.config.heartbeat_ttl()).await?;
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut in_flight = JoinSet::new();
        let mut reserved = 0;

        loop {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };

            match self.broker.reserve().await? {
                Some(delivery) => {
                    reserved += 1;
                    let task = self.task(delivery);
                    in_flight.spawn(async move {
                        task.await;
                        drop(permit);
                    });
                }
                None => {
                    drop(permit);
                    // Running tasks may still schedule retries.
                    if in_flight.join_next().await.is_some() {
                        continue;
                    }
                    if self.broker.promote_due().await? > 0 {
                        continue;
                    }
                    if self.broker.scheduled_len().await? == 0 {
                        break;
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }

        Ok(reserved)
    }

    async fn recover_abandoned(&self) {
        match self.broker.requeue_abandoned().await {
            Ok(0) => {}
            Ok(recovered) => tracing::warn!(recovered, "Took over jobs of workers that stopped"),
            Err(e) => tracing::error!(error = %e, "Failed to recover jobs of stopped workers"),
        }
    }

    async fn promote_due(&self) {
        match self.broker.promote_due().await {
            Ok(0) => {}
            Ok(promoted) => tracing::debug!(promoted, "Promoted due retries"),
            Err(e) => tracing::error!(error = %e, "Failed to promote due retries"),
        }
    }

    fn task(&self, delivery: Delivery) -> impl Future<Output = ()> + Send + 'static {
        let broker = Arc::clone(&self.broker);
        let handler = Arc::clone(&self.handler);
        let counters = Arc::clone(&self.counters);
        let on_error = self.on_error.clone();
        let config = self.config;

        async move {
            let result = process(
                broker.as_ref(),
                handler.as_ref(),
                counters.as_ref(),
                on_error.as_ref(),
                &config,
                &delivery,
            )
            .await;

            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to settle notification job with the broker");
            }
        }
    }
}

/// First tick one `period` from now.
fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn process<B, H>(
    broker: &B,
    handler: &H,
    counters: &Counters,
    on_error: Option<&ErrorHook>,
    config: &WorkerConfig,
    delivery: &Delivery,
) -> Result<(), BrokerError>
where
    B: JobBroker,
    H: NotificationHandler,
{
    let envelope = match delivery.decode() {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(error = %e, "Undecodable notification payload, dead-lettering");
            counters.dead_lettered.fetch_add(1, Ordering::Relaxed);
            return broker.dead_letter(delivery).await;
        }
    };

    let job_type = envelope.job.job_type();
    let attempt = envelope.attempts + 1;

    let error = match handler.handle(&envelope.job).await {
        Ok(()) => {
            tracing::info!(job_id = %envelope.id, job_type, attempt, "Notification delivered");
            counters.processed.fetch_add(1, Ordering::Relaxed);
            return broker.acknowledge(delivery).await;
        }
        Err(error) => error,
    };

    counters.failed.fetch_add(1, Ordering::Relaxed);
    if let Some(hook) = on_error {
        hook(&envelope.job, &error);
    }

    if error.is_permanent() || attempt >= config.max_attempts {
        tracing::error!(
            job_id = %envelope.id,
            job_type,
            attempt,
            error = %error,
            "Notification failed for good, dead-lettering"
        );
        counters.dead_lettered.fetch_add(1, Ordering::Relaxed);
        broker.dead_letter(delivery).await
    } else {
        let delay = config.retry_delay(attempt);
        tracing::warn!(
            job_id = %envelope.id,
            job_type,
            attempt,
            retry_in_ms = delay.as_millis() as u64,
            error = %error,
            "Notification failed, scheduling retry"
        );
        counters.retried.fetch_add(1, Ordering::Relaxed);
        broker
            .retry(delivery, &envelope.next_attempt(), delay)
            .await
    }
}
