use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ScoreOverrides, Urn};
use super::report::{next_report_id, AssessmentReport, ReportId, ReportStore};
use super::service::AssessmentService;
use crate::error::AppError;
use crate::workflows::forecast::ForecastRequest;
use crate::workflows::parse_body;

/// Shared state for the assessment and report endpoints.
#[derive(Clone)]
pub struct AssessmentApi {
    pub service: AssessmentService,
    pub reports: Arc<dyn ReportStore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssessmentRequest {
    pub overrides: ScoreOverrides,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub overrides: ScoreOverrides,
    pub today: Option<NaiveDate>,
    pub forecast: Option<ForecastRequest>,
}

pub fn assessment_router(api: Arc<AssessmentApi>) -> Router {
    Router::new()
        .route("/api/v1/assessments/:urn", post(assess_handler))
        .route("/api/v1/assessments/:urn/reports", post(create_report_handler))
        .route("/api/v1/reports", get(list_reports_handler))
        .route("/api/v1/reports/:report_id", get(report_handler))
        .with_state(api)
}

fn school_not_found(urn: &Urn) -> Response {
    let payload = json!({
        "urn": urn,
        "error": "School not found in database",
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

pub(crate) async fn assess_handler(
    State(api): State<Arc<AssessmentApi>>,
    Path(urn): Path<String>,
    body: Bytes,
) -> Response {
    let request: AssessmentRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let urn = Urn(urn);
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let assessment = api.service.assess(&urn, request.overrides, today).await;

    let status = if assessment.outcome.school.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(assessment)).into_response()
}

pub(crate) async fn create_report_handler(
    State(api): State<Arc<AssessmentApi>>,
    Path(urn): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: ReportRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return Ok(response),
    };

    let urn = Urn(urn);
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let assessment = api.service.assess(&urn, request.overrides, today).await;
    if assessment.outcome.school.is_none() {
        return Ok(school_not_found(&urn));
    }

    let forecast = request.forecast.map(ForecastRequest::run).transpose()?;
    let report = AssessmentReport::compose(next_report_id(), &assessment, forecast, Utc::now());
    let stored = api.reports.save(report)?;

    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub(crate) async fn list_reports_handler(
    State(api): State<Arc<AssessmentApi>>,
) -> Result<Response, AppError> {
    let summaries = api.reports.list()?;
    Ok((StatusCode::OK, Json(summaries)).into_response())
}

pub(crate) async fn report_handler(
    State(api): State<Arc<AssessmentApi>>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError> {
    let id = ReportId(report_id);
    match api.reports.fetch(&id)? {
        Some(report) => Ok((StatusCode::OK, Json(report)).into_response()),
        None => {
            let payload = json!({
                "report_id": id.0,
                "error": "report not found",
            });
            Ok((StatusCode::NOT_FOUND, Json(payload)).into_response())
        }
    }
}
