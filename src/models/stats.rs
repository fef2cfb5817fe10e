// Usage summary models: per-container samples, group roll-ups, and the
// node-level summary served to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a container group as known to the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

/// Latest CPU sample for a container or group, nanosecond-precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuSample {
    pub time: DateTime<Utc>,
    pub usage_nano_cores: u64,
    pub usage_core_nano_seconds: u64,
}

/// Latest memory sample; working set mirrors usage (the API reports one
/// memory figure per container).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySample {
    pub time: DateTime<Utc>,
    pub usage_bytes: u64,
    pub working_set_bytes: u64,
}

/// Group-level network sample. rx/tx stay `None` when the API returned no
/// series for that direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSample {
    pub time: DateTime<Utc>,
    pub interface_name: String,
    pub rx_bytes: Option<u64>,
    pub tx_bytes: Option<u64>,
}

/// Per-container usage within one group. A container that never appeared in
/// one metric family keeps `None` for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerUsage {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub cpu: Option<CpuSample>,
    pub memory: Option<MemorySample>,
}

/// One group's usage for a round: identity, roll-ups summed over containers,
/// the single network sample, and the per-container breakdown (unordered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub group: GroupRef,
    pub start_time: DateTime<Utc>,
    pub cpu: Option<CpuSample>,
    pub memory: Option<MemorySample>,
    pub network: Option<NetworkSample>,
    pub containers: Vec<ContainerUsage>,
}

/// The unit cached and returned to callers. Published as a read-only
/// snapshot; never mutated after a round completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub node_name: String,
    pub groups: Vec<GroupStats>,
}
