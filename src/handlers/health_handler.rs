use axum::{Json, extract::State, http::StatusCode};

use crate::state::AppState;
use crate::utils::response::HealthBody;

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthBody::healthy())),
        Err(e) => {
            tracing::error!(error = %e, "health check: store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthBody::unhealthy()))
        }
    }
}
