// HTTP routes serving the collected summary

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::collector::Collector;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) collector: Arc<Collector>,
}

pub fn app(collector: Arc<Collector>) -> Router {
    let state = AppState { collector };
    Router::new()
        .route("/", get(|| async { "fleetmon: container-group metrics collector" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/stats/summary", get(http::stats_summary_handler)) // GET /api/stats/summary
        .with_state(state)
}
