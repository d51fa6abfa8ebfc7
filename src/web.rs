//! HTTP front-end.
//!
//! The liveness endpoint backs the external supervisor's probe; the deploy
//! endpoint lets operators trigger a reconciliation without going through
//! the event stream.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::domain::{AppSpec, DeployRequest, TriggerReason};
use crate::health::HealthCheck;
use crate::queue::DeployQueue;

pub struct WebState {
    pub health: HealthCheck,
    pub queue: Arc<DeployQueue>,
}

pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/deploy", post(deploy))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<WebState>>) -> impl IntoResponse {
    if state.health.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    }
}

async fn deploy(
    State(state): State<Arc<WebState>>,
    Json(spec): Json<AppSpec>,
) -> impl IntoResponse {
    let app = spec.app_id();
    info!(app = %app, deployment_id = %spec.deployment_id, "Manual deploy trigger");
    state
        .queue
        .enqueue(DeployRequest::new(spec, TriggerReason::Event))
        .await;
    (
        StatusCode::ACCEPTED,
        Json(json!({ "app": app.to_string() })),
    )
}
