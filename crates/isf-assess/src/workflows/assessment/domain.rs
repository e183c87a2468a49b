use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Unique reference number identifying a school in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(pub String);

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry record for a single school as exported from the schools collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolRecord {
    #[serde(deserialize_with = "lenient::key")]
    pub urn: String,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub school_type: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub la_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub group_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub target_status: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub rationale: Option<String>,
    #[serde(deserialize_with = "lenient::value")]
    pub metrics: Option<CapacityMetrics>,
    #[serde(deserialize_with = "lenient::value")]
    pub location: Option<SchoolLocation>,
    #[serde(deserialize_with = "lenient::value")]
    pub vulnerability_score: Option<VulnerabilityScore>,
    #[serde(deserialize_with = "lenient::value")]
    pub pillar_details: Option<PillarDetails>,
    #[serde(deserialize_with = "lenient::value")]
    pub headteacher: Option<HeadTeacher>,
    #[serde(deserialize_with = "lenient::text")]
    pub ofsted_rating: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub last_inspection_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub inspectorate: Option<String>,
}

impl SchoolRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.urn)
    }

    pub(crate) fn pillar3(&self) -> Option<&RegulatoryPillar> {
        self.pillar_details.as_ref().and_then(|details| details.pillar3.as_ref())
    }

    pub(crate) fn pillar4(&self) -> Option<&GovernancePillar> {
        self.pillar_details.as_ref().and_then(|details| details.pillar4.as_ref())
    }

    pub(crate) fn pillar5(&self) -> Option<&AssetPillar> {
        self.pillar_details.as_ref().and_then(|details| details.pillar5.as_ref())
    }

    pub(crate) fn pillar6(&self) -> Option<&BoardingPillar> {
        self.pillar_details.as_ref().and_then(|details| details.pillar6.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityMetrics {
    #[serde(deserialize_with = "lenient::count")]
    pub school_capacity: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub pupil_count: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub boarders: Option<u32>,
    #[serde(deserialize_with = "lenient::number")]
    pub capacity_utilization: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub age_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolLocation {
    #[serde(deserialize_with = "lenient::text")]
    pub town: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub county: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub postcode: Option<String>,
}

/// Seven-pillar operational risk composite. Each pillar is 0-5, the total 0-35.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityScore {
    #[serde(deserialize_with = "lenient::number")]
    pub total: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pillar1_size: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pillar2_liquidity: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pillar3_regulatory: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pillar4_governance: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pillar5_assets: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pillar6_boarding: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pillar7_resilience: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PillarDetails {
    #[serde(deserialize_with = "lenient::value")]
    pub pillar3: Option<RegulatoryPillar>,
    #[serde(deserialize_with = "lenient::value")]
    pub pillar4: Option<GovernancePillar>,
    #[serde(deserialize_with = "lenient::value")]
    pub pillar5: Option<AssetPillar>,
    #[serde(deserialize_with = "lenient::value")]
    pub pillar6: Option<BoardingPillar>,
}

/// Flag attached to a pillar by the vulnerability model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PillarFlag {
    #[serde(deserialize_with = "lenient::text")]
    pub flag: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatoryPillar {
    #[serde(deserialize_with = "lenient::value")]
    pub no_ofsted_data: Option<PillarFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernancePillar {
    #[serde(deserialize_with = "lenient::text")]
    pub company_number: Option<String>,
    #[serde(deserialize_with = "lenient::value")]
    pub trustee_benefits: Option<PillarFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPillar {
    #[serde(deserialize_with = "lenient::value")]
    pub rural_isolation: Option<PillarFlag>,
    #[serde(deserialize_with = "lenient::truthy")]
    pub lease_data_unavailable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardingPillar {
    #[serde(deserialize_with = "lenient::value")]
    pub has_boarding: Option<PillarFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadTeacher {
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub preferred_job_title: Option<String>,
}

impl HeadTeacher {
    pub fn full_name(&self) -> String {
        [&self.title, &self.first_name, &self.last_name]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Local-authority SEND metrics, read-only reference data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalAuthorityRecord {
    #[serde(deserialize_with = "lenient::key")]
    pub la_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub la_id: Option<String>,
    #[serde(deserialize_with = "lenient::value")]
    pub metrics: LocalAuthorityMetrics,
    #[serde(
        rename = "safetyValvePool",
        alias = "safety_valve_pool",
        deserialize_with = "lenient::value"
    )]
    pub safety_valve_pool: Option<SafetyValvePool>,
}

impl LocalAuthorityRecord {
    pub fn awaiting_provision(&self) -> Option<u32> {
        self.metrics
            .placements
            .as_ref()
            .and_then(|placements| placements.awaiting_provision)
    }

    pub fn pool(&self) -> Option<CommissioningPool> {
        self.safety_valve_pool
            .as_ref()
            .and_then(|svp| svp.pool)
            .and_then(CommissioningPool::new)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalAuthorityMetrics {
    #[serde(deserialize_with = "lenient::value")]
    pub operational: Option<OperationalMetrics>,
    #[serde(deserialize_with = "lenient::value")]
    pub placements: Option<PlacementMetrics>,
    #[serde(deserialize_with = "lenient::value")]
    pub financial: Option<FinancialMetrics>,
    #[serde(deserialize_with = "lenient::value")]
    pub legal: Option<LegalMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationalMetrics {
    #[serde(deserialize_with = "lenient::count")]
    pub total_ehcps: Option<u32>,
    #[serde(deserialize_with = "lenient::number")]
    pub timeliness_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementMetrics {
    #[serde(deserialize_with = "lenient::count")]
    pub awaiting_provision: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialMetrics {
    #[serde(deserialize_with = "lenient::number")]
    pub high_needs_funding: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalMetrics {
    #[serde(deserialize_with = "lenient::count")]
    pub appeals: Option<u32>,
}

/// Raw pool classification as stored; out-of-range values are treated as unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyValvePool {
    #[serde(deserialize_with = "lenient::count")]
    pub pool: Option<u8>,
}

/// Commissioning pool 1-4; lower pools commission new provision faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CommissioningPool(u8);

impl CommissioningPool {
    pub const fn new(value: u8) -> Option<Self> {
        match value {
            1..=4 => Some(Self(value)),
            _ => None,
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "fastest commissioning",
            2 => "good",
            3 => "slower",
            _ => "difficult",
        }
    }
}

impl TryFrom<u8> for CommissioningPool {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("pool must be between 1 and 4, got {value}"))
    }
}

impl From<CommissioningPool> for u8 {
    fn from(value: CommissioningPool) -> Self {
        value.0
    }
}

/// Company registration facts sourced from the pre-built registry cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: String,
    pub company_number: String,
    pub company_status: String,
    pub company_type: String,
    pub date_of_creation: Option<String>,
    pub has_charges: bool,
    pub has_insolvency_history: bool,
    pub sic_codes: Vec<String>,
    pub registered_office_address: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub name: String,
    pub officer_role: String,
    pub appointed_on: Option<String>,
    pub resigned_on: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerList {
    pub items: Vec<Officer>,
    pub total_results: u32,
}

/// Regulatory rating as published by the establishments registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalRating {
    #[serde(deserialize_with = "lenient::text")]
    pub rating: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub last_inspection_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub inspectorate_name: Option<String>,
}

/// Parses the date layouts found across registry exports.
pub fn parse_inspection_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"]
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Integer criterion score in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MAX: u8 = 5;

    pub const fn new(value: u8) -> Option<Self> {
        match value {
            1..=5 => Some(Self(value)),
            _ => None,
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Lowers the grade by one step without dropping below 1.
    pub const fn lowered(self) -> Self {
        if self.0 > 1 {
            Self(self.0 - 1)
        } else {
            self
        }
    }

    pub(crate) const fn of(value: u8) -> Self {
        match Self::new(value) {
            Some(grade) => grade,
            None => Self(1),
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("score must be between 1 and 5, got {value}"))
    }
}

impl From<Grade> for u8 {
    fn from(value: Grade) -> Self {
        value.0
    }
}

/// A criterion score, or the explicit absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Grade>", into = "Option<Grade>")]
pub enum Score {
    Present(Grade),
    NotComputable,
}

impl Score {
    pub fn grade(self) -> Option<Grade> {
        match self {
            Score::Present(grade) => Some(grade),
            Score::NotComputable => None,
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Score::Present(_))
    }
}

impl From<Option<Grade>> for Score {
    fn from(value: Option<Grade>) -> Self {
        match value {
            Some(grade) => Score::Present(grade),
            None => Score::NotComputable,
        }
    }
}

impl From<Score> for Option<Grade> {
    fn from(value: Score) -> Self {
        value.grade()
    }
}

impl From<Grade> for Score {
    fn from(value: Grade) -> Self {
        Score::Present(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Manual,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Manual => "MANUAL",
        }
    }
}

/// The nine assessment criteria in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    CommissioningDemand,
    OfstedRating,
    FinancialHealth,
    BuildingCondition,
    StaffingLeadership,
    LegalsCompliance,
    LocationAccess,
    Reputation,
    Synergy,
}

impl Criterion {
    pub const fn ordered() -> [Criterion; 9] {
        [
            Criterion::CommissioningDemand,
            Criterion::OfstedRating,
            Criterion::FinancialHealth,
            Criterion::BuildingCondition,
            Criterion::StaffingLeadership,
            Criterion::LegalsCompliance,
            Criterion::LocationAccess,
            Criterion::Reputation,
            Criterion::Synergy,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Criterion::CommissioningDemand => "Commissioning Demand",
            Criterion::OfstedRating => "Ofsted Rating",
            Criterion::FinancialHealth => "Financial Health",
            Criterion::BuildingCondition => "Building Condition",
            Criterion::StaffingLeadership => "Staffing/Leadership",
            Criterion::LegalsCompliance => "Legals/Compliance",
            Criterion::LocationAccess => "Location/Access",
            Criterion::Reputation => "Reputation",
            Criterion::Synergy => "Synergy",
        }
    }

    pub const fn default_weight(self) -> u8 {
        match self {
            Criterion::CommissioningDemand => 3,
            Criterion::OfstedRating
            | Criterion::FinancialHealth
            | Criterion::BuildingCondition
            | Criterion::StaffingLeadership => 2,
            Criterion::LegalsCompliance
            | Criterion::LocationAccess
            | Criterion::Reputation
            | Criterion::Synergy => 1,
        }
    }

    /// Accepts snake_case keys or display labels, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ordered().into_iter().find(|criterion| {
            criterion.label().eq_ignore_ascii_case(needle)
                || criterion.key().eq_ignore_ascii_case(needle)
        })
    }

    pub const fn key(self) -> &'static str {
        match self {
            Criterion::CommissioningDemand => "commissioning_demand",
            Criterion::OfstedRating => "ofsted_rating",
            Criterion::FinancialHealth => "financial_health",
            Criterion::BuildingCondition => "building_condition",
            Criterion::StaffingLeadership => "staffing_leadership",
            Criterion::LegalsCompliance => "legals_compliance",
            Criterion::LocationAccess => "location_access",
            Criterion::Reputation => "reputation",
            Criterion::Synergy => "synergy",
        }
    }
}

/// Heuristic score for one criterion with the evidence it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScore {
    pub score: Score,
    pub confidence: Confidence,
    pub rationale: String,
    pub data_points: Vec<String>,
}

impl AutoScore {
    pub fn scored(
        grade: Grade,
        confidence: Confidence,
        rationale: impl Into<String>,
        data_points: Vec<String>,
    ) -> Self {
        Self {
            score: Score::Present(grade),
            confidence,
            rationale: rationale.into(),
            data_points,
        }
    }

    pub fn manual(rationale: impl Into<String>, data_points: Vec<String>) -> Self {
        Self {
            score: Score::NotComputable,
            confidence: Confidence::Manual,
            rationale: rationale.into(),
            data_points,
        }
    }

    pub fn awaiting_data() -> Self {
        Self::manual("Awaiting data", Vec::new())
    }
}

/// Auto-scores for every criterion, keyed in display order.
pub type AutoScores = BTreeMap<Criterion, AutoScore>;

pub fn empty_scores() -> AutoScores {
    Criterion::ordered()
        .into_iter()
        .map(|criterion| (criterion, AutoScore::awaiting_data()))
        .collect()
}

/// Manual overrides; a present key replaces the auto-score, including with `NotComputable`.
pub type ScoreOverrides = BTreeMap<Criterion, Score>;

/// Effective score per criterion after overrides are applied.
pub type EffectiveScores = BTreeMap<Criterion, Score>;

pub fn effective_scores(auto: &AutoScores, overrides: &ScoreOverrides) -> EffectiveScores {
    Criterion::ordered()
        .into_iter()
        .map(|criterion| {
            let score = overrides
                .get(&criterion)
                .copied()
                .or_else(|| auto.get(&criterion).map(|auto| auto.score))
                .unwrap_or(Score::NotComputable);
            (criterion, score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_rejects_out_of_range_values() {
        assert!(Grade::new(0).is_none());
        assert!(Grade::new(6).is_none());
        assert_eq!(Grade::new(5).map(Grade::get), Some(5));
        assert_eq!(Grade::of(1).lowered().get(), 1);
    }

    #[test]
    fn score_serialises_as_number_or_null() {
        let present = serde_json::to_string(&Score::Present(Grade::of(4))).expect("serialises");
        let absent = serde_json::to_string(&Score::NotComputable).expect("serialises");
        assert_eq!(present, "4");
        assert_eq!(absent, "null");

        let parsed: Score = serde_json::from_str("3").expect("parses");
        assert_eq!(parsed, Score::Present(Grade::of(3)));
        assert!(serde_json::from_str::<Score>("9").is_err());
    }

    #[test]
    fn overrides_take_precedence_including_explicit_clears() {
        let mut auto = empty_scores();
        auto.insert(
            Criterion::FinancialHealth,
            AutoScore::scored(Grade::of(4), Confidence::High, "ok", Vec::new()),
        );
        auto.insert(
            Criterion::LegalsCompliance,
            AutoScore::scored(Grade::of(5), Confidence::Medium, "ok", Vec::new()),
        );

        let mut overrides = ScoreOverrides::new();
        overrides.insert(Criterion::FinancialHealth, Score::Present(Grade::of(2)));
        overrides.insert(Criterion::LegalsCompliance, Score::NotComputable);

        let effective = effective_scores(&auto, &overrides);
        assert_eq!(
            effective[&Criterion::FinancialHealth],
            Score::Present(Grade::of(2))
        );
        assert_eq!(effective[&Criterion::LegalsCompliance], Score::NotComputable);
        assert_eq!(effective[&Criterion::Synergy], Score::NotComputable);
        assert_eq!(effective.len(), 9);
    }

    #[test]
    fn criterion_parse_accepts_keys_and_labels() {
        assert_eq!(
            Criterion::parse("Staffing/Leadership"),
            Some(Criterion::StaffingLeadership)
        );
        assert_eq!(
            Criterion::parse("commissioning_demand"),
            Some(Criterion::CommissioningDemand)
        );
        assert_eq!(Criterion::parse("vibes"), None);
    }

    #[test]
    fn malformed_sub_fields_read_as_absent() {
        let school: SchoolRecord = serde_json::from_str(
            r#"{
                "urn": 100002,
                "metrics": {"school_capacity": "200", "pupil_count": 120.0, "boarders": null},
                "vulnerability_score": {"total": "5", "pillar2_liquidity": []},
                "pillar_details": {
                    "pillar3": "n/a",
                    "pillar5": {"lease_data_unavailable": null, "rural_isolation": 3}
                },
                "headteacher": {"first_name": 7}
            }"#,
        )
        .expect("record reads");

        assert_eq!(school.urn, "100002");
        let metrics = school.metrics.as_ref().expect("metrics");
        assert_eq!(metrics.school_capacity, Some(200));
        assert_eq!(metrics.pupil_count, Some(120));
        assert_eq!(metrics.boarders, None);
        let vulnerability = school.vulnerability_score.as_ref().expect("vulnerability");
        assert_eq!(vulnerability.total, Some(5.0));
        assert_eq!(vulnerability.pillar2_liquidity, None);
        assert!(school.pillar3().is_none());
        let assets = school.pillar5().expect("asset pillar");
        assert!(!assets.lease_data_unavailable);
        assert!(assets.rural_isolation.is_none());
        assert_eq!(
            school.headteacher.and_then(|head| head.first_name),
            Some("7".to_string())
        );
    }

    #[test]
    fn local_authority_tolerates_loose_counts_and_pools() {
        let la: LocalAuthorityRecord = serde_json::from_str(
            r#"{
                "la_name": "Kent",
                "metrics": {"placements": {"awaiting_provision": 220.0}},
                "safetyValvePool": {"pool": "2"}
            }"#,
        )
        .expect("record reads");
        assert_eq!(la.awaiting_provision(), Some(220));
        assert_eq!(la.pool().map(CommissioningPool::get), Some(2));

        let broken: LocalAuthorityRecord =
            serde_json::from_str(r#"{"la_name": "Kent", "metrics": null, "safetyValvePool": 4}"#)
                .expect("record reads");
        assert_eq!(broken.awaiting_provision(), None);
        assert_eq!(broken.pool(), None);
    }

    #[test]
    fn inspection_dates_accept_registry_layouts() {
        let expected = NaiveDate::from_ymd_opt(2019, 3, 14);
        assert_eq!(parse_inspection_date("2019-03-14"), expected);
        assert_eq!(parse_inspection_date("14-03-2019"), expected);
        assert_eq!(parse_inspection_date("14/03/2019"), expected);
        assert_eq!(parse_inspection_date("2019-03-14T09:00:00Z"), expected);
        assert_eq!(parse_inspection_date("spring 2019"), None);
    }
}
