use super::super::domain::{AutoScore, CompanyRecord, Confidence, SchoolRecord};
use super::{grade_up_to, WARNING_MARKER};

/// Liquidity pillar score at which the grade is lowered one step.
///
/// Policy constant with no documented derivation; kept exactly as historically scored.
pub const LIQUIDITY_CRISIS_THRESHOLD: f64 = 4.0;

/// Vulnerability total (0-35) upper bounds mapped to grades; anything above scores 1.
const VULNERABILITY_BANDS: [(f64, u8); 4] = [(3.0, 5), (6.0, 4), (10.0, 3), (15.0, 2)];

/// Scores financial health from the vulnerability composite. Lower vulnerability
/// means healthier finances; a liquidity crisis costs one grade.
pub fn score_financial_health(school: &SchoolRecord, company: Option<&CompanyRecord>) -> AutoScore {
    let Some(vulnerability) = school.vulnerability_score.as_ref() else {
        return AutoScore::manual("No vulnerability data available.", Vec::new());
    };

    let total = vulnerability.total.unwrap_or(0.0);
    let liquidity = vulnerability.pillar2_liquidity.unwrap_or(0.0);
    let governance = vulnerability.pillar4_governance.unwrap_or(0.0);
    let status = vulnerability.status.as_deref().unwrap_or("");
    let action = vulnerability.action.as_deref().unwrap_or("");

    let mut data_points = vec![
        format!("Vulnerability score: {total}/35"),
        format!("Status: {status} ({action})"),
        format!("Liquidity risk: {liquidity} points"),
        format!("Governance risk: {governance} points"),
    ];

    if let Some(number) = school
        .pillar4()
        .and_then(|pillar| pillar.company_number.as_deref())
        .filter(|number| !number.trim().is_empty())
    {
        data_points.push(format!("Company: {number}"));
    }

    if let Some(company) = company {
        if !company.company_status.is_empty() {
            data_points.push(format!("Company status: {}", company.company_status));
        }
        if company.has_insolvency_history {
            data_points.push(format!("{WARNING_MARKER} Insolvency history on record"));
        }
        if company.has_charges {
            data_points.push("Registered charges on file".to_string());
        }
    }

    let mut grade = grade_up_to(total, &VULNERABILITY_BANDS, 1);
    let liquidity_crisis = liquidity >= LIQUIDITY_CRISIS_THRESHOLD;
    if liquidity_crisis {
        data_points.push(format!("{WARNING_MARKER} Liquidity crisis flagged"));
        grade = grade.lowered();
    }

    let mut rationale = format!("Vulnerability total {total}/35.");
    if !action.is_empty() {
        rationale.push_str(&format!(" {action}."));
    }
    if liquidity_crisis {
        rationale.push_str(" Liquidity crisis flagged.");
    }

    AutoScore::scored(grade, Confidence::High, rationale, data_points)
}
