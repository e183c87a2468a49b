use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::ForecastRequest;
use crate::error::AppError;
use crate::workflows::parse_body;

pub fn forecast_router() -> Router {
    Router::new().route("/api/v1/forecast", post(forecast_handler))
}

pub(crate) async fn forecast_handler(body: Bytes) -> Result<Response, AppError> {
    let request: ForecastRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return Ok(response),
    };
    let result = request.run()?;
    Ok((StatusCode::OK, Json(result)).into_response())
}
