// Background collection worker: keeps the summary cache warm on a fixed
// poll interval. The HTTP surface reads through the same collector, so a
// request between polls is served from the cache.

use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::collector::Collector;

/// Collector and shutdown wiring for the worker.
pub struct WorkerDeps {
    pub collector: Arc<Collector>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing config. Stats logging uses its own real-time interval,
/// independent of the poll interval.
pub struct WorkerConfig {
    pub poll_interval_secs: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        collector,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        poll_interval_secs,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(poll_interval_secs));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut rounds_succeeded: u64 = 0;
        let mut rounds_failed: u64 = 0;
        let cancel = CancellationToken::new();

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", poll_interval_secs);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match collector.summary(&cancel).await {
                        Ok(summary) => {
                            rounds_succeeded += 1;
                            tracing::debug!(
                                operation = "collect_summary",
                                groups = summary.groups.len(),
                                "summary refreshed"
                            );
                        }
                        Err(e) => {
                            rounds_failed += 1;
                            tracing::warn!(
                                error = %e,
                                operation = "collect_summary",
                                "collection round failed"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        rounds_succeeded,
                        rounds_failed,
                        "app stats"
                    );
                }
            }
        }
    })
}
