use async_trait::async_trait;
use chrono::NaiveDate;
use isf_assess::config::DataConfig;
use isf_assess::workflows::assessment::{
    AssessmentReport, AssessmentSources, Criterion, ExternalRating, Grade,
    LocalAuthorityDirectory, LocalAuthorityRecord, RatingRegistry, ReportId, ReportStore,
    ReportStoreError, ReportSummary, SchoolRecord, SchoolRegistry, Score, SourceError, Urn,
};
use isf_assess::workflows::companies_house::CompanyCache;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type Loaded<T> = Result<HashMap<String, T>, SourceError>;

/// JSON export read on first lookup and kept for the life of the process.
/// Exports are either an object keyed by lookup key, or an array keyed by `key`.
struct JsonExport<T> {
    path: PathBuf,
    key: Option<fn(&T) -> String>,
    rows: OnceCell<Loaded<T>>,
}

impl<T: DeserializeOwned> JsonExport<T> {
    fn keyed(path: PathBuf, key: fn(&T) -> String) -> Self {
        Self {
            path,
            key: Some(key),
            rows: OnceCell::new(),
        }
    }

    fn by_urn(path: PathBuf) -> Self {
        Self {
            path,
            key: None,
            rows: OnceCell::new(),
        }
    }

    async fn rows(&self) -> &Loaded<T> {
        self.rows
            .get_or_init(|| load_export(&self.path, self.key))
            .await
    }
}

async fn load_export<T: DeserializeOwned>(
    path: &Path,
    key: Option<fn(&T) -> String>,
) -> Loaded<T> {
    let malformed =
        |detail: String| SourceError::Malformed(format!("{}: {detail}", path.display()));

    let raw = tokio::fs::read(path).await.map_err(|err| {
        warn!(path = %path.display(), error = %err, "data export unavailable");
        SourceError::Unavailable(format!("{}: {err}", path.display()))
    })?;
    let value: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|err| malformed(err.to_string()))?;

    let entries: Vec<(Option<String>, serde_json::Value)> = match (value, key) {
        (serde_json::Value::Array(items), Some(_)) => {
            items.into_iter().map(|item| (None, item)).collect()
        }
        (serde_json::Value::Array(_), None) => {
            return Err(malformed("expected an object keyed by URN".to_string()));
        }
        (serde_json::Value::Object(map), _) => map
            .into_iter()
            .map(|(name, item)| (Some(name), item))
            .collect(),
        (_, _) => return Err(malformed("expected an array or object".to_string())),
    };

    let mut rows = HashMap::with_capacity(entries.len());
    let mut skipped = 0usize;
    for (index, (name, item)) in entries.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(row) => {
                if let Some(row_key) = name.or_else(|| key.map(|key| key(&row))) {
                    rows.insert(row_key, row);
                }
            }
            Err(err) => {
                skipped += 1;
                warn!(
                    path = %path.display(),
                    row = index,
                    error = %err,
                    "skipping unreadable export row"
                );
            }
        }
    }

    info!(path = %path.display(), rows = rows.len(), skipped, "data export loaded");
    Ok(rows)
}

fn lookup<T: Clone>(rows: &Loaded<T>, key: &str) -> Result<Option<T>, SourceError> {
    match rows {
        Ok(rows) => Ok(rows.get(key).cloned()),
        Err(err) => Err(err.clone()),
    }
}

/// School registry, local-authority directory, and rating registry backed by
/// the exports under the data directory.
pub(crate) struct FileRegistry {
    schools: JsonExport<SchoolRecord>,
    local_authorities: JsonExport<LocalAuthorityRecord>,
    ratings: JsonExport<ExternalRating>,
}

impl FileRegistry {
    pub(crate) fn new(data: &DataConfig) -> Self {
        Self {
            schools: JsonExport::keyed(data.schools_path(), |school| {
                school.urn.trim().to_string()
            }),
            local_authorities: JsonExport::keyed(data.local_authorities_path(), |la| {
                la.la_name.trim().to_string()
            }),
            ratings: JsonExport::by_urn(data.ratings_path()),
        }
    }
}

#[async_trait]
impl SchoolRegistry for FileRegistry {
    async fn school_record(&self, urn: &Urn) -> Result<Option<SchoolRecord>, SourceError> {
        lookup(self.schools.rows().await, urn.0.trim())
    }
}

#[async_trait]
impl LocalAuthorityDirectory for FileRegistry {
    async fn local_authority(
        &self,
        name: &str,
    ) -> Result<Option<LocalAuthorityRecord>, SourceError> {
        lookup(self.local_authorities.rows().await, name.trim())
    }
}

#[async_trait]
impl RatingRegistry for FileRegistry {
    async fn external_rating(&self, urn: &Urn) -> Result<Option<ExternalRating>, SourceError> {
        lookup(self.ratings.rows().await, urn.0.trim())
    }
}

pub(crate) fn file_sources(data: &DataConfig) -> AssessmentSources {
    let registry = Arc::new(FileRegistry::new(data));
    AssessmentSources {
        schools: registry.clone(),
        local_authorities: registry.clone(),
        companies: Arc::new(CompanyCache::from_path(data.company_cache_path())),
        ratings: registry,
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportStore {
    reports: Arc<Mutex<Vec<AssessmentReport>>>,
}

impl ReportStore for InMemoryReportStore {
    fn save(&self, report: AssessmentReport) -> Result<AssessmentReport, ReportStoreError> {
        let mut guard = self.reports.lock().expect("report store mutex poisoned");
        if guard.iter().any(|existing| existing.id == report.id) {
            return Err(ReportStoreError::Conflict);
        }
        guard.push(report.clone());
        Ok(report)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<AssessmentReport>, ReportStoreError> {
        let guard = self.reports.lock().expect("report store mutex poisoned");
        Ok(guard.iter().find(|report| &report.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<ReportSummary>, ReportStoreError> {
        let guard = self.reports.lock().expect("report store mutex poisoned");
        let mut summaries: Vec<ReportSummary> =
            guard.iter().map(AssessmentReport::summary).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(summaries)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Parses `criterion=score`, where score is 1-5 or `tbc` to clear the auto-score.
pub(crate) fn parse_override(raw: &str) -> Result<(Criterion, Score), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected criterion=score, got '{raw}'"))?;
    let criterion =
        Criterion::parse(name).ok_or_else(|| format!("unknown criterion '{}'", name.trim()))?;

    let value = value.trim();
    if value.eq_ignore_ascii_case("tbc") {
        return Ok((criterion, Score::NotComputable));
    }
    let grade = value
        .parse::<u8>()
        .ok()
        .and_then(Grade::new)
        .ok_or_else(|| format!("score for {} must be 1-5 or tbc, got '{value}'", criterion.key()))?;
    Ok((criterion, Score::Present(grade)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("isf-assess-api-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create data dir");
        dir
    }

    #[test]
    fn parse_override_accepts_scores_and_tbc() {
        assert_eq!(
            parse_override("synergy=4"),
            Ok((Criterion::Synergy, Score::Present(Grade::new(4).expect("grade"))))
        );
        assert_eq!(
            parse_override("Legals/Compliance = TBC"),
            Ok((Criterion::LegalsCompliance, Score::NotComputable))
        );
        assert!(parse_override("synergy=6").is_err());
        assert!(parse_override("vibes=3").is_err());
        assert!(parse_override("synergy").is_err());
    }

    #[test]
    fn parse_date_rejects_other_layouts() {
        assert!(parse_date("2026-06-01").is_ok());
        assert!(parse_date("01/06/2026").is_err());
    }

    #[tokio::test]
    async fn file_registry_reads_arrays_and_keyed_objects() {
        let dir = export_dir("registry");
        std::fs::write(
            dir.join("schools.json"),
            r#"[{"urn": "100001", "name": "Meadow View School", "la_name": "Kent"}]"#,
        )
        .expect("write schools");
        std::fs::write(
            dir.join("local_authorities.json"),
            r#"[{"la_name": "Kent", "safetyValvePool": {"pool": 1}}]"#,
        )
        .expect("write authorities");
        std::fs::write(
            dir.join("ratings.json"),
            r#"{"100001": {"rating": "Good", "inspectorate_name": "Ofsted"}}"#,
        )
        .expect("write ratings");

        let registry = FileRegistry::new(&DataConfig { directory: dir.clone() });
        let urn = Urn("100001".to_string());

        let school = registry.school_record(&urn).await.expect("schools load");
        assert_eq!(school.map(|s| s.display_name().to_string()), Some("Meadow View School".to_string()));
        let la = registry.local_authority("Kent").await.expect("authorities load");
        assert_eq!(la.and_then(|la| la.pool()).map(|pool| pool.get()), Some(1));
        let rating = registry.external_rating(&urn).await.expect("ratings load");
        assert_eq!(rating.and_then(|r| r.rating), Some("Good".to_string()));
        assert_eq!(
            registry
                .school_record(&Urn("999999".to_string()))
                .await
                .expect("schools load"),
            None
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn unreadable_rows_leave_siblings_assessable() {
        use isf_assess::workflows::assessment::{
            AssessmentService, ScoreOverrides, ScoringEngine, WeightTable,
        };

        let dir = export_dir("loose-rows");
        std::fs::write(
            dir.join("schools.json"),
            r#"[
                {"urn": "100001", "name": "Meadow View School", "metrics": {"pupil_count": 120.0, "school_capacity": 200}},
                {"urn": "100002", "pillar_details": {"pillar5": {"lease_data_unavailable": null}}},
                "not a school"
            ]"#,
        )
        .expect("write schools");

        let data = DataConfig { directory: dir.clone() };
        let registry = FileRegistry::new(&data);
        let loose = registry
            .school_record(&Urn("100002".to_string()))
            .await
            .expect("schools load")
            .expect("sibling kept");
        let assets = loose
            .pillar_details
            .and_then(|details| details.pillar5)
            .expect("asset pillar kept");
        assert!(!assets.lease_data_unavailable);

        let service = AssessmentService::new(
            file_sources(&data),
            ScoringEngine::new(WeightTable::default()),
        );
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date");
        let assessment = service
            .assess(&Urn("100001".to_string()), ScoreOverrides::new(), today)
            .await;

        let school = assessment.outcome.school.as_ref().expect("school found");
        assert_eq!(school.metrics.as_ref().and_then(|m| m.pupil_count), Some(120));
        assert!(!assessment
            .outcome
            .errors
            .iter()
            .any(|error| error.starts_with("School fetch error")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_export_is_unavailable() {
        let dir = export_dir("empty");
        let registry = FileRegistry::new(&DataConfig { directory: dir.clone() });

        let result = registry.school_record(&Urn("100001".to_string())).await;
        assert!(matches!(result, Err(SourceError::Unavailable(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn report_store_rejects_duplicate_ids() {
        use chrono::Utc;
        use isf_assess::workflows::assessment::{
            empty_scores, AssessmentOutcome, ScoreOverrides, ScoredAssessment, ScoringEngine,
            WeightTable,
        };

        let engine = ScoringEngine::new(WeightTable::default());
        let outcome = AssessmentOutcome {
            urn: Urn("100001".to_string()),
            school: Some(SchoolRecord::default()),
            rating: None,
            local_authority: None,
            company: None,
            officers: None,
            scores: empty_scores(),
            errors: Vec::new(),
        };
        let effective = isf_assess::workflows::assessment::effective_scores(
            &outcome.scores,
            &ScoreOverrides::new(),
        );
        let assessment = ScoredAssessment {
            result: engine.score(&effective),
            outcome,
            overrides: ScoreOverrides::new(),
            effective_scores: effective,
        };

        let store = InMemoryReportStore::default();
        let id = ReportId("report-000042".to_string());
        let report = AssessmentReport::compose(id.clone(), &assessment, None, Utc::now());

        store.save(report.clone()).expect("first save");
        assert!(matches!(store.save(report), Err(ReportStoreError::Conflict)));
        assert_eq!(store.list().expect("list").len(), 1);
        assert!(store.fetch(&id).expect("fetch").is_some());
    }
}
