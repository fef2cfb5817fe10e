// Per-group metrics fetch. cpu/mem and network are separate queries because
// the API cannot dimension network metrics by container.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiClient, TransportError};
use crate::models::{AggregationKind, ContainerGroup, MetricKind, MetricsRequest, MetricsResponse};

/// Sample window per round. Matches the summary cache validity window, so a
/// served sample is never staler than the cache guarantees.
pub const METRICS_WINDOW: chrono::Duration = chrono::Duration::seconds(60);

/// Dimension filter selecting every container in the group.
pub const CONTAINER_DIMENSION_FILTER: &str = "containerName eq '*'";

/// Which of the two per-group queries failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFamily {
    Compute,
    Network,
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricFamily::Compute => f.write_str("cpu/mem"),
            MetricFamily::Network => f.write_str("network"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("fetching {family} metrics for container group {group}: {source}")]
pub struct FetchError {
    pub family: MetricFamily,
    pub group: String,
    #[source]
    pub source: TransportError,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}

/// Fetch the raw cpu/mem and network series for one group over
/// `[end - METRICS_WINDOW, end]`. The first failed call aborts the fetch.
pub async fn group(
    client: &ApiClient,
    group: &ContainerGroup,
    end: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<(MetricsResponse, MetricsResponse), FetchError> {
    let start = end - METRICS_WINDOW;

    let system = client
        .group_metrics(
            &group.name,
            &MetricsRequest {
                dimension: Some(CONTAINER_DIMENSION_FILTER.to_string()),
                start,
                end,
                aggregation: AggregationKind::Average,
                types: vec![MetricKind::CpuUsage, MetricKind::MemoryUsage],
            },
            cancel,
        )
        .await
        .map_err(|source| FetchError {
            family: MetricFamily::Compute,
            group: group.name.clone(),
            source,
        })?;
    tracing::debug!(group = %group.name, "got cpu/mem series");

    let network = client
        .group_metrics(
            &group.name,
            &MetricsRequest {
                dimension: None,
                start,
                end,
                aggregation: AggregationKind::Average,
                types: vec![
                    MetricKind::NetworkBytesReceivedPerSecond,
                    MetricKind::NetworkBytesTransmittedPerSecond,
                ],
            },
            cancel,
        )
        .await
        .map_err(|source| FetchError {
            family: MetricFamily::Network,
            group: group.name.clone(),
            source,
        })?;
    tracing::debug!(group = %group.name, "got network series");

    Ok((system, network))
}
