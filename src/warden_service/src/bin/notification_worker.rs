use color_eyre::eyre::{Result, eyre};
use warden_adapters::config::Settings;
use warden_adapters::{
    AskamaTemplateRenderer, NotificationWorker, PostgresActionTokenStore, PostmarkEmailClient,
    RedisJobQueue, WorkerConfig,
};
use warden_application::NotificationProcessor;
use warden_service::helpers::{configure_postgresql, configure_redis};
use warden_service::maintenance::run_token_purge;
use warden_service::tracing::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let settings = Settings::load()?;

    let pg_pool = configure_postgresql(&settings.postgres).await?;
    let redis = configure_redis(&settings.redis).await?;
    let queue = RedisJobQueue::new(redis, &settings.worker.queue_name, &settings.worker.id);

    let email_client =
        PostmarkEmailClient::from_settings(&settings.email_client).map_err(|e| eyre!(e))?;
    let processor = NotificationProcessor::new(AskamaTemplateRenderer::new(), email_client);

    let worker = NotificationWorker::new(queue, processor, WorkerConfig::from(&settings.worker))
        .with_error_hook(|job, error| {
            tracing::warn!(
                job_type = job.job_type(),
                error = %error,
                "Notification handler failed"
            );
        });

    tracing::info!(
        worker_id = %settings.worker.id,
        queue = %settings.worker.queue_name,
        "Starting notification worker"
    );

    let (stop_purge, purge_stopped) = tokio::sync::oneshot::channel::<()>();
    let purge = tokio::spawn(run_token_purge(
        PostgresActionTokenStore::new(pg_pool),
        settings.worker.token_purge_interval(),
        async move {
            purge_stopped.await.ok();
        },
    ));

    let stats = worker
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    let _ = stop_purge.send(());
    let purged = purge.await?;

    tracing::info!(
        processed = stats.processed,
        purged_tokens = purged,
        dead_lettered = stats.dead_lettered,
        "Notification worker exited"
    );

    Ok(())
}
