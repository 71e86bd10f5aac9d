use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use warden_core::ActionTokenStore;

/// Deletes expired action tokens once at start and then every `interval`
/// until `shutdown` resolves. Returns how many tokens were purged in total.
///
/// A failed sweep is logged and tried again on the next tick.
#[tracing::instrument(name = "run_token_purge", skip_all)]
pub async fn run_token_purge<A>(
    store: A,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> u64
where
    A: ActionTokenStore,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut purged_total = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => {
                    purged_total += purged;
                    tracing::info!(purged, "Purged expired action tokens");
                }
                Err(e) => tracing::error!(error = %e, "Failed to purge expired action tokens"),
            },
        }
    }

    purged_total
}
