// Collection orchestrator: freshness cache in front of bounded-concurrency,
// fail-fast collection rounds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::aggregate;
use crate::client::{ApiClient, TransportError};
use crate::fetch::{self, FetchError};
use crate::models::{GroupPhase, GroupStats, StatsSummary};
use crate::registry::GroupRegistry;

/// How long a cached summary is served without a new round; also the coarse
/// rate limit on collection work.
pub const DEFAULT_VALIDITY_WINDOW: Duration = Duration::from_secs(60);

/// Cap on simultaneous in-flight fetch pipelines.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("collection cancelled")]
    Cancelled,
    #[error("listing container groups: {0}")]
    Registry(#[source] TransportError),
    #[error("container group {group}: {source}")]
    Group {
        group: String,
        #[source]
        source: FetchError,
    },
    #[error("collection task panicked")]
    TaskPanic,
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub node_name: String,
    pub validity_window: Duration,
    pub max_concurrent_fetches: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            node_name: "fleetmon".to_string(),
            validity_window: DEFAULT_VALIDITY_WINDOW,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Single-slot cache. Replaced only after a fully successful round, so it
/// always holds nothing or a complete snapshot.
#[derive(Default)]
struct CacheSlot {
    summary: Option<Arc<StatsSummary>>,
    refreshed_at: Option<Instant>,
}

pub struct Collector {
    client: Arc<ApiClient>,
    registry: Arc<dyn GroupRegistry>,
    node_name: String,
    validity_window: Duration,
    gate: Arc<Semaphore>,
    cache: Mutex<CacheSlot>,
}

impl Collector {
    pub fn new(
        client: Arc<ApiClient>,
        registry: Arc<dyn GroupRegistry>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            client,
            registry,
            node_name: config.node_name,
            validity_window: config.validity_window,
            gate: Arc::new(Semaphore::new(config.max_concurrent_fetches)),
            cache: Mutex::new(CacheSlot::default()),
        }
    }

    /// Cached-or-fresh usage summary for every running container group.
    ///
    /// The cache lock is held for the whole call, so at most one collection
    /// round runs at a time; concurrent callers queue on the lock and then
    /// hit the refreshed slot. A failed round leaves the slot untouched.
    pub async fn summary(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<StatsSummary>, CollectError> {
        let mut slot = self.cache.lock().await;

        if let Some(summary) = &slot.summary
            && let Some(refreshed_at) = slot.refreshed_at
            && refreshed_at.elapsed() < self.validity_window
        {
            tracing::debug!(
                age_ms = refreshed_at.elapsed().as_millis() as u64,
                "serving cached summary"
            );
            return Ok(summary.clone());
        }

        if cancel.is_cancelled() {
            return Err(CollectError::Cancelled);
        }

        let summary = Arc::new(self.collect(cancel).await?);
        slot.summary = Some(summary.clone());
        slot.refreshed_at = Some(Instant::now());
        Ok(summary)
    }

    /// One collection round: fan out over running groups, bounded by the
    /// admission gate, failing the whole round on the first error.
    async fn collect(&self, cancel: &CancellationToken) -> Result<StatsSummary, CollectError> {
        let groups = self.registry.groups(cancel).await.map_err(|e| {
            if e.is_cancelled() {
                CollectError::Cancelled
            } else {
                CollectError::Registry(e)
            }
        })?;

        let end = Utc::now();
        let round = cancel.child_token();
        let mut tasks: JoinSet<Result<GroupStats, CollectError>> = JoinSet::new();
        let mut spawned = 0usize;

        for group in groups {
            if group.phase != GroupPhase::Running {
                continue;
            }
            spawned += 1;
            let client = self.client.clone();
            let gate = self.gate.clone();
            let cancel = round.clone();
            tasks.spawn(async move {
                let permit = tokio::select! {
                    _ = cancel.cancelled() => return Err(CollectError::Cancelled),
                    permit = gate.acquire_owned() => {
                        permit.map_err(|_| CollectError::Cancelled)?
                    }
                };
                tracing::debug!(group = %group.name, "acquired fetch slot");

                let fetched = fetch::group(&client, &group, end, &cancel).await;
                // release before merging; the gate bounds remote calls only
                drop(permit);

                let (system, network) = fetched.map_err(|source| {
                    if source.is_cancelled() {
                        CollectError::Cancelled
                    } else {
                        CollectError::Group {
                            group: group.name.clone(),
                            source,
                        }
                    }
                })?;
                Ok(aggregate::merge(&group, &system, &network))
            });
        }

        let mut collected = Vec::with_capacity(spawned);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(stats)) => collected.push(stats),
                Ok(Err(err)) => {
                    round.cancel();
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                    return Err(err);
                }
                Err(join_err) if join_err.is_panic() => {
                    round.cancel();
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                    return Err(CollectError::TaskPanic);
                }
                Err(_) => {}
            }
        }

        tracing::debug!(
            groups = collected.len(),
            "collected metrics for running container groups"
        );
        Ok(StatsSummary {
            node_name: self.node_name.clone(),
            groups: collected,
        })
    }
}
