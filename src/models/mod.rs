// Domain models: metrics API wire shapes, usage summaries, container groups

mod group;
mod metrics;
mod stats;

pub use group::{ContainerGroup, GroupPhase};
pub use metrics::{
    AggregationKind, MetadataValue, MetricKind, MetricName, MetricPoint, MetricSeries,
    MetricsRequest, MetricsResponse, TimeSeriesEntry,
};
pub use stats::{
    ContainerUsage, CpuSample, GroupRef, GroupStats, MemorySample, NetworkSample, StatsSummary,
};
