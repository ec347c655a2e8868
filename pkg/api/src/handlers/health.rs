use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::AppState;

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// GET /readyz: ready once the cache finished its initial list.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.cache.has_synced() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "cache not synced")
    }
}
