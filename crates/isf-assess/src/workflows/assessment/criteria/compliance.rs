use super::super::domain::{AutoScore, Confidence, SchoolRecord};
use super::{grade_up_to, non_empty, WARNING_MARKER};

/// Combined regulatory + governance points mapped to grades; above 6 scores 1.
const COMBINED_RISK_BANDS: [(f64, u8); 4] = [(0.0, 5), (2.0, 4), (4.0, 3), (6.0, 2)];

/// Scores legal and compliance exposure from the regulatory and governance pillars.
pub fn score_legals_compliance(school: &SchoolRecord) -> AutoScore {
    let Some(vulnerability) = school.vulnerability_score.as_ref() else {
        return AutoScore::manual(
            "No compliance risk data available. Manual review required.",
            Vec::new(),
        );
    };

    let regulatory = vulnerability.pillar3_regulatory.unwrap_or(0.0);
    let governance = vulnerability.pillar4_governance.unwrap_or(0.0);
    let combined = regulatory + governance;

    let mut data_points = vec![
        format!("Regulatory risk: {regulatory} points"),
        format!("Governance risk: {governance} points"),
    ];

    if let Some(missing) = school.pillar3().and_then(|p| p.no_ofsted_data.as_ref()) {
        let detail = non_empty(missing.flag.as_deref()).unwrap_or("No Ofsted data (likely ISI)");
        data_points.push(detail.to_string());
    }

    if let Some(benefits) = school.pillar4().and_then(|p| p.trustee_benefits.as_ref()) {
        let detail = non_empty(benefits.flag.as_deref()).unwrap_or("flagged");
        data_points.push(format!("{WARNING_MARKER} Trustee benefits: {detail}"));
    }

    AutoScore::scored(
        grade_up_to(combined, &COMBINED_RISK_BANDS, 1),
        Confidence::Medium,
        format!("Combined regulatory + governance risk: {combined} points."),
        data_points,
    )
}
