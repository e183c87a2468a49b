use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::assessment::domain::Urn;
use crate::workflows::assessment::report::ReportStoreError;
use crate::workflows::forecast::ForecastRequestError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Forecast(ForecastRequestError),
    Reports(ReportStoreError),
    Relay(regex::Error),
    Output(serde_json::Error),
    SchoolNotFound(Urn),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Forecast(err) => write!(f, "forecast error: {}", err),
            AppError::Reports(err) => write!(f, "report error: {}", err),
            AppError::Relay(err) => write!(f, "relay setup error: {}", err),
            AppError::Output(err) => write!(f, "output error: {}", err),
            AppError::SchoolNotFound(urn) => write!(f, "school {} not found in database", urn),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Forecast(err) => Some(err),
            AppError::Reports(err) => Some(err),
            AppError::Relay(err) => Some(err),
            AppError::Output(err) => Some(err),
            AppError::SchoolNotFound(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Forecast(_) => StatusCode::BAD_REQUEST,
            AppError::SchoolNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Reports(ReportStoreError::Conflict) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Reports(_)
            | AppError::Relay(_)
            | AppError::Output(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ForecastRequestError> for AppError {
    fn from(value: ForecastRequestError) -> Self {
        Self::Forecast(value)
    }
}

impl From<ReportStoreError> for AppError {
    fn from(value: ReportStoreError) -> Self {
        Self::Reports(value)
    }
}

impl From<regex::Error> for AppError {
    fn from(value: regex::Error) -> Self {
        Self::Relay(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}
