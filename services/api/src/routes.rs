use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use isf_assess::workflows::assessment::{assessment_router, AssessmentApi};
use isf_assess::workflows::companies_house::{relay_router, RegistryRelay};
use isf_assess::workflows::forecast::forecast_router;
use serde_json::json;
use std::sync::Arc;

/// Operational endpoints plus every workflow router; the relay is mounted only when configured.
pub(crate) fn with_application_routes(
    api: Arc<AssessmentApi>,
    relay: Option<Arc<RegistryRelay>>,
) -> axum::Router {
    let router = assessment_router(api)
        .merge(forecast_router())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint));

    match relay {
        Some(relay) => router.merge(relay_router(relay)),
        None => router,
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
