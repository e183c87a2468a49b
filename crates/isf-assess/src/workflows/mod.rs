use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

pub mod assessment;
pub mod companies_house;
pub mod forecast;

/// Decodes a JSON request body, answering 400 with `{"error": ...}` when it
/// does not parse. An empty body yields the request defaults.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        let payload = json!({ "error": format!("invalid request body: {err}") });
        (StatusCode::BAD_REQUEST, Json(payload)).into_response()
    })
}
