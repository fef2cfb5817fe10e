// Metrics API wire models (request parameters and the value/timeseries/data
// response shape returned by the remote metrics endpoint).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Metric type identifiers understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    CpuUsage,
    MemoryUsage,
    NetworkBytesReceivedPerSecond,
    NetworkBytesTransmittedPerSecond,
}

impl MetricKind {
    /// Wire identifier as sent in `metricnames` and echoed in response names.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "CpuUsage",
            MetricKind::MemoryUsage => "MemoryUsage",
            MetricKind::NetworkBytesReceivedPerSecond => "NetworkBytesReceivedPerSecond",
            MetricKind::NetworkBytesTransmittedPerSecond => "NetworkBytesTransmittedPerSecond",
        }
    }

    /// Parse a response metric name; unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CpuUsage" => Some(MetricKind::CpuUsage),
            "MemoryUsage" => Some(MetricKind::MemoryUsage),
            "NetworkBytesReceivedPerSecond" => Some(MetricKind::NetworkBytesReceivedPerSecond),
            "NetworkBytesTransmittedPerSecond" => {
                Some(MetricKind::NetworkBytesTransmittedPerSecond)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation applied server-side to each time bucket. Only the average is
/// requested by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationKind {
    Average,
}

impl AggregationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationKind::Average => "average",
        }
    }
}

/// Parameters for one metrics query. Built per fetch call and not reused.
#[derive(Debug, Clone)]
pub struct MetricsRequest {
    /// Optional dimension equality filter, e.g. `containerName eq '*'`.
    pub dimension: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub aggregation: AggregationKind,
    pub types: Vec<MetricKind>,
}

impl MetricsRequest {
    /// Comma-joined `metricnames` query value.
    pub fn metric_names(&self) -> String {
        let names: Vec<&str> = self.types.iter().map(|t| t.as_str()).collect();
        names.join(",")
    }

    /// `timespan` query value: ISO start and end joined with `/`.
    pub fn timespan(&self) -> String {
        format!(
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub value: Vec<MetricSeries>,
}

/// One named metric with its per-dimension time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: MetricName,
    #[serde(default)]
    pub timeseries: Vec<TimeSeriesEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricName {
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeriesEntry {
    #[serde(default)]
    pub metadatavalues: Vec<MetadataValue>,
    #[serde(default)]
    pub data: Vec<MetricPoint>,
}

impl TimeSeriesEntry {
    /// Container this entry belongs to, from the `containername` metadata
    /// pair (name matched case-insensitively). `None` means the entry cannot
    /// be attributed.
    pub fn container_name(&self) -> Option<&str> {
        self.metadatavalues
            .iter()
            .find(|m| m.name.value.eq_ignore_ascii_case("containername"))
            .map(|m| m.value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataValue {
    pub name: MetricName,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPoint {
    #[serde(rename = "timeStamp")]
    pub timestamp: DateTime<Utc>,
    pub average: Option<f64>,
}
