use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::criteria::{score_all, CriterionInputs};
use super::domain::{
    effective_scores, empty_scores, AutoScores, CompanyRecord, EffectiveScores, ExternalRating,
    LocalAuthorityRecord, OfficerList, SchoolRecord, ScoreOverrides, Urn,
};
use super::scoring::{ScoringEngine, ScoringResult};
use super::sources::{CompanyProfiles, LocalAuthorityDirectory, RatingRegistry, SchoolRegistry};

/// Collaborators the orchestrator fans out to.
#[derive(Clone)]
pub struct AssessmentSources {
    pub schools: Arc<dyn SchoolRegistry>,
    pub local_authorities: Arc<dyn LocalAuthorityDirectory>,
    pub companies: Arc<dyn CompanyProfiles>,
    pub ratings: Arc<dyn RatingRegistry>,
}

/// Everything gathered for one school plus the warnings raised along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub urn: Urn,
    pub school: Option<SchoolRecord>,
    pub rating: Option<ExternalRating>,
    pub local_authority: Option<LocalAuthorityRecord>,
    pub company: Option<CompanyRecord>,
    pub officers: Option<OfficerList>,
    pub scores: AutoScores,
    pub errors: Vec<String>,
}

impl AssessmentOutcome {
    fn terminal(urn: Urn, error: String) -> Self {
        Self {
            urn,
            school: None,
            rating: None,
            local_authority: None,
            company: None,
            officers: None,
            scores: empty_scores(),
            errors: vec![error],
        }
    }
}

/// Outcome with overrides applied and the weighted decision computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAssessment {
    pub outcome: AssessmentOutcome,
    pub overrides: ScoreOverrides,
    pub effective_scores: EffectiveScores,
    pub result: ScoringResult,
}

/// Orchestrates collaborator lookups, criterion scoring, and aggregation.
#[derive(Clone)]
pub struct AssessmentService {
    sources: AssessmentSources,
    engine: Arc<ScoringEngine>,
}

impl AssessmentService {
    pub fn new(sources: AssessmentSources, engine: ScoringEngine) -> Self {
        Self {
            sources,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Best-effort gather and auto-score. Only a missing or unreadable primary
    /// record stops the run; every other failure lands in `errors`.
    pub async fn run(&self, urn: &Urn, today: NaiveDate) -> AssessmentOutcome {
        let school = match self.sources.schools.school_record(urn).await {
            Ok(Some(school)) => school,
            Ok(None) => {
                info!(%urn, "school not found");
                return AssessmentOutcome::terminal(
                    urn.clone(),
                    "School not found in database".to_string(),
                );
            }
            Err(err) => {
                warn!(%urn, error = %err, "school lookup failed");
                return AssessmentOutcome::terminal(urn.clone(), format!("School fetch error: {err}"));
            }
        };

        let la_name = school
            .la_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let rating = async {
            match self.sources.ratings.external_rating(urn).await {
                Ok(rating) => (rating, None),
                Err(err) => (None, Some(format!("GIAS fetch error: {err}"))),
            }
        };
        let local_authority = async {
            let Some(name) = la_name else {
                return (None, None);
            };
            match self.sources.local_authorities.local_authority(name).await {
                Ok(Some(record)) => (Some(record), None),
                Ok(None) => (None, Some(format!("LA \"{name}\" not found in database"))),
                Err(err) => (None, Some(format!("LA fetch error: {err}"))),
            }
        };
        let company = async {
            match self.sources.companies.company_profile(urn).await {
                Ok(record) => (record, None),
                Err(err) => (None, Some(format!("Companies House error: {err}"))),
            }
        };
        let officers = async {
            match self.sources.companies.officers(urn).await {
                Ok(list) => (list, None),
                Err(err) => (None, Some(format!("Officers fetch error: {err}"))),
            }
        };

        let (
            (rating, rating_error),
            (local_authority, la_error),
            (company, company_error),
            (officers, officers_error),
        ) = tokio::join!(rating, local_authority, company, officers);

        let errors: Vec<String> = [rating_error, la_error, company_error, officers_error]
            .into_iter()
            .flatten()
            .collect();
        for error in &errors {
            warn!(%urn, %error, "optional source degraded");
        }

        let inputs = CriterionInputs {
            school: &school,
            local_authority: local_authority.as_ref(),
            rating: rating.as_ref(),
            company: company.as_ref(),
        };
        let scores = score_all(&inputs, today);
        debug!(
            %urn,
            scored = scores.values().filter(|auto| auto.score.is_present()).count(),
            "auto-scoring complete"
        );

        AssessmentOutcome {
            urn: urn.clone(),
            school: Some(school),
            rating,
            local_authority,
            company,
            officers,
            scores,
            errors,
        }
    }

    /// Runs the assessment then applies overrides and the weight table.
    pub async fn assess(
        &self,
        urn: &Urn,
        overrides: ScoreOverrides,
        today: NaiveDate,
    ) -> ScoredAssessment {
        let outcome = self.run(urn, today).await;
        self.score(outcome, overrides)
    }

    /// Re-aggregates an existing outcome, e.g. after an override changes.
    pub fn score(&self, outcome: AssessmentOutcome, overrides: ScoreOverrides) -> ScoredAssessment {
        let effective = effective_scores(&outcome.scores, &overrides);
        let result = self.engine.score(&effective);
        info!(
            urn = %outcome.urn,
            decision = result.decision.label(),
            percentage = result.percentage,
            "assessment scored"
        );

        ScoredAssessment {
            outcome,
            overrides,
            effective_scores: effective,
            result,
        }
    }
}
