// Shared test helpers: fake metrics API on a local listener, static registry

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use fleetmon::client::{ApiClient, RetryPolicy, TransportError};
use fleetmon::models::{ContainerGroup, GroupPhase};
use fleetmon::registry::GroupRegistry;

pub const SUBSCRIPTION: &str = "sub-0000";
pub const RESOURCE_GROUP: &str = "rg-test";

/// Serve `app` on an ephemeral local port; returns the base url. The server
/// task runs for the rest of the test process.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Client with millisecond backoff so retry paths stay fast in tests.
pub fn fast_client(base_url: &str) -> ApiClient {
    ApiClient::new(
        base_url,
        SUBSCRIPTION,
        RESOURCE_GROUP,
        None,
        RetryPolicy {
            wait_min: Duration::from_millis(10),
            wait_max: Duration::from_millis(40),
            max_attempts: 4,
        },
    )
    .unwrap()
}

pub fn group_with_phase(name: &str, phase: GroupPhase) -> ContainerGroup {
    ContainerGroup {
        name: name.into(),
        namespace: "default".into(),
        uid: format!("uid-{name}"),
        phase,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap(),
    }
}

pub fn running_group(name: &str) -> ContainerGroup {
    group_with_phase(name, GroupPhase::Running)
}

/// Registry serving a fixed, in-memory group list.
pub struct StaticRegistry {
    pub groups: Vec<ContainerGroup>,
}

impl GroupRegistry for StaticRegistry {
    fn groups<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContainerGroup>, TransportError>> + Send + 'a>>
    {
        let groups = self.groups.clone();
        Box::pin(async move { Ok(groups) })
    }
}

/// Knobs and counters for the fake metrics API.
#[derive(Clone, Default)]
pub struct FakeApiState {
    /// Total metrics requests observed (both families).
    pub metrics_requests: Arc<AtomicUsize>,
    /// All metrics requests return 500 while set.
    pub fail_all: Arc<AtomicBool>,
    /// Metrics requests for this group return 500.
    pub fail_group: Arc<Mutex<Option<String>>>,
    /// Handler sleep per request, to widen the concurrency window.
    pub delay_ms: Arc<AtomicU64>,
    /// Concurrently executing metrics requests, and the high-water mark.
    pub in_flight: Arc<AtomicI64>,
    pub max_in_flight: Arc<AtomicI64>,
    /// Body served by the group-list endpoint.
    pub groups_body: Arc<Mutex<serde_json::Value>>,
}

impl FakeApiState {
    pub fn new() -> Self {
        let state = Self::default();
        *state.groups_body.lock().unwrap() = serde_json::json!({ "value": [] });
        state
    }
}

pub fn cpu_mem_body(container: &str, cpu_avg: f64, mem_avg: f64) -> serde_json::Value {
    serde_json::json!({
        "value": [
            {
                "name": { "value": "CpuUsage" },
                "timeseries": [{
                    "metadatavalues": [
                        { "name": { "value": "containername" }, "value": container }
                    ],
                    "data": [
                        { "timeStamp": "2024-05-01T12:00:30Z", "average": cpu_avg }
                    ]
                }]
            },
            {
                "name": { "value": "MemoryUsage" },
                "timeseries": [{
                    "metadatavalues": [
                        { "name": { "value": "containername" }, "value": container }
                    ],
                    "data": [
                        { "timeStamp": "2024-05-01T12:00:30Z", "average": mem_avg }
                    ]
                }]
            }
        ]
    })
}

pub fn network_body(rx_avg: f64, tx_avg: f64) -> serde_json::Value {
    serde_json::json!({
        "value": [
            {
                "name": { "value": "NetworkBytesReceivedPerSecond" },
                "timeseries": [{
                    "metadatavalues": [],
                    "data": [
                        { "timeStamp": "2024-05-01T12:00:30Z", "average": rx_avg }
                    ]
                }]
            },
            {
                "name": { "value": "NetworkBytesTransmittedPerSecond" },
                "timeseries": [{
                    "metadatavalues": [],
                    "data": [
                        { "timeStamp": "2024-05-01T12:00:30Z", "average": tx_avg }
                    ]
                }]
            }
        ]
    })
}

async fn metrics_handler(
    State(state): State<FakeApiState>,
    Path((_sub, _rg, name)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.metrics_requests.fetch_add(1, Ordering::SeqCst);
    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(current, Ordering::SeqCst);

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    let failing = state.fail_all.load(Ordering::SeqCst)
        || state.fail_group.lock().unwrap().as_deref() == Some(name.as_str());
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    let names = params.get("metricnames").cloned().unwrap_or_default();
    let body = if names.contains("CpuUsage") {
        cpu_mem_body(&format!("{name}-ctr"), 12.0, 1024.0)
    } else {
        network_body(2048.0, 512.0)
    };
    axum::Json(body).into_response()
}

async fn list_handler(State(state): State<FakeApiState>) -> Response {
    let body = state.groups_body.lock().unwrap().clone();
    axum::Json(body).into_response()
}

/// Fake metrics API: group-list endpoint plus a metrics endpoint serving
/// canned cpu/mem and network bodies for any group.
pub fn fake_metrics_api(state: FakeApiState) -> Router {
    Router::new()
        .route(
            "/subscriptions/{sub}/resourceGroups/{rg}/containerGroups",
            get(list_handler),
        )
        .route(
            "/subscriptions/{sub}/resourceGroups/{rg}/containerGroups/{name}/metrics",
            get(metrics_handler),
        )
        .with_state(state)
}
