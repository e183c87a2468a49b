//! Persisted assessment reports and their markdown rendering.

mod markdown;
mod store;

pub use markdown::{due_diligence_flags, render_markdown};
pub use store::{ReportStore, ReportStoreError};

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AutoScores, CompanyRecord, LocalAuthorityRecord, ScoreOverrides, Urn};
use super::scoring::{Decision, ScoringResult};
use super::service::ScoredAssessment;
use crate::workflows::forecast::ForecastResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("report-{id:06}"))
}

/// Condensed local-authority facts kept with a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaSnapshot {
    pub la_name: String,
    pub pool: Option<u8>,
    pub awaiting_provision: Option<u32>,
    pub total_ehcps: Option<u32>,
    pub timeliness_pct: Option<f64>,
}

impl From<&LocalAuthorityRecord> for LaSnapshot {
    fn from(la: &LocalAuthorityRecord) -> Self {
        let operational = la.metrics.operational.as_ref();
        Self {
            la_name: la.la_name.clone(),
            pool: la.pool().map(|pool| pool.get()),
            awaiting_provision: la.awaiting_provision(),
            total_ehcps: operational.and_then(|ops| ops.total_ehcps),
            timeliness_pct: operational.and_then(|ops| ops.timeliness_pct),
        }
    }
}

/// Condensed company facts kept with a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub company_name: String,
    pub company_number: String,
    pub company_status: String,
    pub company_type: String,
    pub has_charges: bool,
    pub has_insolvency_history: bool,
    pub officers_total: Option<u32>,
}

impl CompanySnapshot {
    fn new(company: &CompanyRecord, officers_total: Option<u32>) -> Self {
        Self {
            company_name: company.company_name.clone(),
            company_number: company.company_number.clone(),
            company_status: company.company_status.clone(),
            company_type: company.company_type.clone(),
            has_charges: company.has_charges,
            has_insolvency_history: company.has_insolvency_history,
            officers_total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub id: ReportId,
    pub urn: Urn,
    pub school_name: String,
    pub created_at: DateTime<Utc>,
    pub score: ScoringResult,
    pub auto_scores: AutoScores,
    pub overrides: ScoreOverrides,
    pub la_snapshot: Option<LaSnapshot>,
    pub company_snapshot: Option<CompanySnapshot>,
    pub forecast: Option<ForecastResult>,
    pub markdown: String,
}

impl AssessmentReport {
    pub fn compose(
        id: ReportId,
        assessment: &ScoredAssessment,
        forecast: Option<ForecastResult>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let outcome = &assessment.outcome;
        let school_name = outcome
            .school
            .as_ref()
            .map(|school| school.display_name().to_string())
            .unwrap_or_else(|| outcome.urn.to_string());

        let markdown = render_markdown(assessment, forecast.as_ref(), created_at);

        Self {
            id,
            urn: outcome.urn.clone(),
            school_name,
            created_at,
            score: assessment.result.clone(),
            auto_scores: outcome.scores.clone(),
            overrides: assessment.overrides.clone(),
            la_snapshot: outcome.local_authority.as_ref().map(LaSnapshot::from),
            company_snapshot: outcome.company.as_ref().map(|company| {
                CompanySnapshot::new(
                    company,
                    outcome.officers.as_ref().map(|officers| officers.total_results),
                )
            }),
            forecast,
            markdown,
        }
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id.clone(),
            urn: self.urn.clone(),
            school_name: self.school_name.clone(),
            created_at: self.created_at,
            decision: self.score.decision,
            percentage: self.score.percentage,
        }
    }
}

/// Listing view of a stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: ReportId,
    pub urn: Urn,
    pub school_name: String,
    pub created_at: DateTime<Utc>,
    pub decision: Decision,
    pub percentage: f64,
}
