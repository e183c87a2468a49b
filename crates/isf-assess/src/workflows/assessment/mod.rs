//! School assessment: criterion scoring, weighted aggregation, collaborator
//! orchestration, and persisted reports.

pub mod criteria;
pub mod domain;
mod lenient;
pub mod report;
pub mod router;
pub mod scoring;
pub mod service;
pub mod sources;

pub use domain::{
    effective_scores, empty_scores, parse_inspection_date, AutoScore, AutoScores,
    CommissioningPool, CompanyRecord, Confidence, Criterion, EffectiveScores, ExternalRating,
    Grade, LocalAuthorityRecord, Officer, OfficerList, SchoolRecord, Score, ScoreOverrides, Urn,
};
pub use report::{
    AssessmentReport, CompanySnapshot, LaSnapshot, ReportId, ReportStore, ReportStoreError,
    ReportSummary,
};
pub use router::{assessment_router, AssessmentApi, AssessmentRequest, ReportRequest};
pub use scoring::{calculate_score, Decision, ScoringEngine, ScoringResult, WeightTable};
pub use service::{AssessmentOutcome, AssessmentService, AssessmentSources, ScoredAssessment};
pub use sources::{
    CompanyProfiles, LocalAuthorityDirectory, RatingRegistry, SchoolRegistry, SourceError,
};
