//! Per-criterion heuristics. Every scorer is total: missing inputs produce a
//! `NotComputable` score with `MANUAL` confidence instead of an error.

mod compliance;
mod demand;
mod financial;
mod narrative;
mod premises;
mod regulatory;

pub use compliance::score_legals_compliance;
pub use demand::score_commissioning_demand;
pub use financial::{score_financial_health, LIQUIDITY_CRISIS_THRESHOLD};
pub use narrative::{score_reputation, score_staffing_leadership, score_synergy};
pub use premises::{score_building_condition, score_location_access, UTILISATION_BANDS};
pub use regulatory::{score_regulatory_rating, STALE_INSPECTION_YEARS};

use chrono::NaiveDate;

use super::domain::{
    AutoScores, CompanyRecord, Criterion, ExternalRating, Grade, LocalAuthorityRecord,
    SchoolRecord,
};

pub(crate) const WARNING_MARKER: &str = "⚠️";
pub(crate) const ALERT_MARKER: &str = "🚨";

/// Borrowed view over everything gathered for one assessment run.
#[derive(Debug, Clone, Copy)]
pub struct CriterionInputs<'a> {
    pub school: &'a SchoolRecord,
    pub local_authority: Option<&'a LocalAuthorityRecord>,
    pub rating: Option<&'a ExternalRating>,
    pub company: Option<&'a CompanyRecord>,
}

impl<'a> CriterionInputs<'a> {
    pub fn for_school(school: &'a SchoolRecord) -> Self {
        Self {
            school,
            local_authority: None,
            rating: None,
            company: None,
        }
    }
}

/// Runs every scorer. `today` anchors inspection-age checks.
pub fn score_all(inputs: &CriterionInputs<'_>, today: NaiveDate) -> AutoScores {
    let school = inputs.school;
    Criterion::ordered()
        .into_iter()
        .map(|criterion| {
            let score = match criterion {
                Criterion::CommissioningDemand => {
                    score_commissioning_demand(inputs.local_authority)
                }
                Criterion::OfstedRating => score_regulatory_rating(school, inputs.rating, today),
                Criterion::FinancialHealth => score_financial_health(school, inputs.company),
                Criterion::BuildingCondition => score_building_condition(school),
                Criterion::StaffingLeadership => score_staffing_leadership(school),
                Criterion::LegalsCompliance => score_legals_compliance(school),
                Criterion::LocationAccess => score_location_access(school),
                Criterion::Reputation => score_reputation(school),
                Criterion::Synergy => score_synergy(),
            };
            (criterion, score)
        })
        .collect()
}

/// First band whose inclusive upper bound admits `value`, else `otherwise`.
pub(crate) fn grade_up_to(value: f64, bands: &[(f64, u8)], otherwise: u8) -> Grade {
    let grade = bands
        .iter()
        .find(|(upper, _)| value <= *upper)
        .map(|(_, grade)| *grade)
        .unwrap_or(otherwise);
    Grade::of(grade)
}

/// First band whose exclusive upper bound admits `value`, else `otherwise`.
pub(crate) fn grade_below(value: f64, bands: &[(f64, u8)], otherwise: u8) -> Grade {
    let grade = bands
        .iter()
        .find(|(upper, _)| value < *upper)
        .map(|(_, grade)| *grade)
        .unwrap_or(otherwise);
    Grade::of(grade)
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
