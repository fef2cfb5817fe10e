// GET handlers: version, api/stats/summary

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tokio_util::sync::CancellationToken;

use super::AppState;

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/stats/summary — cached-or-fresh usage summary for every running
/// container group. A failed collection round maps to 502; the previous
/// summary stays cached until it ages out.
pub(super) async fn stats_summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cancel = CancellationToken::new();
    match state.collector.summary(&cancel).await {
        Ok(summary) => axum::Json(summary.as_ref().clone()).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "stats_summary", "collection failed");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}
