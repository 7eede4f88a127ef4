//! Background task that periodically sweeps the session registry

use super::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run [`SessionRegistry::sweep`] every `interval` until `cancel_token` fires
pub fn spawn_sweeper(
    registry: Arc<Mutex<SessionRegistry>>,
    interval: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs_f64(), "Starting session sweeper");
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("Session sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let report = registry.lock().await.sweep();
                    if !report.is_empty() {
                        tracing::info!(
                            timed_out = report.timed_out.len(),
                            forfeited = report.forfeited.len(),
                            expired = report.expired.len(),
                            "Session sweep complete"
                        );
                    }
                }
            }
        }
    })
}
