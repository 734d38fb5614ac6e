use axum::{extract::State, http::StatusCode, response::Json};

use crate::app::state::AppState;
use crate::services::atomic_metrics::MetricsSnapshot;

pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}
