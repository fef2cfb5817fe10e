// Merge raw metric series for one container group into GroupStats.

use std::collections::HashMap;

use crate::models::{
    ContainerGroup, ContainerUsage, CpuSample, GroupStats, MemorySample, MetricKind,
    MetricsResponse, NetworkSample,
};

/// Interface name reported for the group-wide network sample; the API does
/// not expose per-interface detail.
const NET_INTERFACE_NAME: &str = "eth0";

/// Merge the cpu/mem and network responses for `group` into its usage
/// record. Pure; safe to call off the fetch path.
///
/// cpu/mem series carry one timeseries entry per container, attributed via
/// the `containername` metadata pair; entries without attribution or data
/// are skipped. Only the last (most recent) point of each entry is used.
/// Group roll-ups are absolute sums over this round's containers.
pub fn merge(
    group: &ContainerGroup,
    system: &MetricsResponse,
    network: &MetricsResponse,
) -> GroupStats {
    let mut containers: HashMap<String, ContainerUsage> = HashMap::new();
    let mut group_cpu: Option<CpuSample> = None;
    let mut group_memory: Option<MemorySample> = None;

    for series in &system.value {
        let Some(kind) = MetricKind::parse(&series.name.value) else {
            continue;
        };
        for entry in &series.timeseries {
            let Some(point) = entry.data.last() else {
                continue;
            };
            let Some(name) = entry.container_name() else {
                continue;
            };
            let container = containers
                .entry(name.to_string())
                .or_insert_with(|| ContainerUsage {
                    name: name.to_string(),
                    start_time: group.created_at,
                    cpu: None,
                    memory: None,
                });
            let average = point.average.unwrap_or(0.0);
            match kind {
                MetricKind::CpuUsage => {
                    // average millicores over the window; extrapolate the
                    // cumulative nanosecond count across the full minute
                    let usage_nano_cores = (average * 1_000_000.0) as u64;
                    let usage_core_nano_seconds = usage_nano_cores * 60;
                    container.cpu = Some(CpuSample {
                        time: point.timestamp,
                        usage_nano_cores,
                        usage_core_nano_seconds,
                    });
                    let total = group_cpu.get_or_insert(CpuSample {
                        time: point.timestamp,
                        usage_nano_cores: 0,
                        usage_core_nano_seconds: 0,
                    });
                    total.usage_nano_cores += usage_nano_cores;
                    total.usage_core_nano_seconds += usage_core_nano_seconds;
                }
                MetricKind::MemoryUsage => {
                    let usage_bytes = average as u64;
                    container.memory = Some(MemorySample {
                        time: point.timestamp,
                        usage_bytes,
                        working_set_bytes: usage_bytes,
                    });
                    let total = group_memory.get_or_insert(MemorySample {
                        time: point.timestamp,
                        usage_bytes: 0,
                        working_set_bytes: 0,
                    });
                    total.usage_bytes += usage_bytes;
                    total.working_set_bytes += usage_bytes;
                }
                _ => {}
            }
        }
    }

    let mut group_network: Option<NetworkSample> = None;
    for series in &network.value {
        let Some(kind) = MetricKind::parse(&series.name.value) else {
            continue;
        };
        // network series are group-wide; only the first entry is meaningful
        let Some(entry) = series.timeseries.first() else {
            continue;
        };
        let Some(point) = entry.data.last() else {
            continue;
        };
        let sample = group_network.get_or_insert(NetworkSample {
            time: point.timestamp,
            interface_name: NET_INTERFACE_NAME.to_string(),
            rx_bytes: None,
            tx_bytes: None,
        });
        let bytes = point.average.unwrap_or(0.0) as u64;
        match kind {
            MetricKind::NetworkBytesReceivedPerSecond => sample.rx_bytes = Some(bytes),
            MetricKind::NetworkBytesTransmittedPerSecond => sample.tx_bytes = Some(bytes),
            _ => {}
        }
        sample.time = point.timestamp;
    }

    GroupStats {
        group: group.to_ref(),
        start_time: group.created_at,
        cpu: group_cpu,
        memory: group_memory,
        network: group_network,
        containers: containers.into_values().collect(),
    }
}
