use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::relay::{RegistryRelay, RelayError};

/// Cache policy attached to every relayed registry response.
pub const RELAY_CACHE_CONTROL: &str = "public, max-age=86400";

pub fn relay_router(relay: Arc<RegistryRelay>) -> Router {
    Router::new()
        .route("/ch", get(relay_handler))
        .with_state(relay)
}

pub(crate) async fn relay_handler(
    State(relay): State<Arc<RegistryRelay>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    match relay.forward(&params).await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                [(header::CACHE_CONTROL, RELAY_CACHE_CONTROL)],
                Json(upstream.body),
            )
                .into_response()
        }
        Err(error) => {
            let status = match error {
                RelayError::MissingPath | RelayError::PathNotAllowed => StatusCode::BAD_REQUEST,
                RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            };
            let payload = json!({ "error": error.to_string() });
            (status, Json(payload)).into_response()
        }
    }
}
