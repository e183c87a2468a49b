use super::{AssessmentReport, ReportId, ReportSummary};

/// Storage abstraction for generated reports.
pub trait ReportStore: Send + Sync {
    fn save(&self, report: AssessmentReport) -> Result<AssessmentReport, ReportStoreError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<AssessmentReport>, ReportStoreError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<ReportSummary>, ReportStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportStoreError {
    #[error("report already exists")]
    Conflict,
    #[error("report store unavailable: {0}")]
    Unavailable(String),
}
