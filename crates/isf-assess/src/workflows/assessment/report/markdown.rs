use chrono::{DateTime, Utc};

use super::super::criteria::{ALERT_MARKER, WARNING_MARKER};
use super::super::domain::{Criterion, Score};
use super::super::scoring::Decision;
use super::super::service::ScoredAssessment;
use crate::workflows::forecast::ForecastResult;

const UNKNOWN: &str = "Unknown";

/// Warning and alert evidence across all criteria, followed by collaborator errors.
pub fn due_diligence_flags(assessment: &ScoredAssessment) -> Vec<String> {
    let outcome = &assessment.outcome;
    let mut flags: Vec<String> = Criterion::ordered()
        .into_iter()
        .filter_map(|criterion| outcome.scores.get(&criterion))
        .flat_map(|auto| auto.data_points.iter())
        .filter_map(|point| {
            point
                .strip_prefix(WARNING_MARKER)
                .or_else(|| point.strip_prefix(ALERT_MARKER))
                .map(|rest| rest.trim().to_string())
        })
        .collect();
    flags.extend(outcome.errors.iter().cloned());
    flags
}

pub fn render_markdown(
    assessment: &ScoredAssessment,
    forecast: Option<&ForecastResult>,
    created_at: DateTime<Utc>,
) -> String {
    let outcome = &assessment.outcome;
    let school = outcome.school.as_ref();
    let name = school
        .map(|school| school.display_name().to_string())
        .unwrap_or_else(|| outcome.urn.to_string());

    let mut lines = vec![
        format!("# School Assessment Report: {name}"),
        format!("**Date:** {}", created_at.format("%Y-%m-%d")),
        String::new(),
        "## 1. School Overview".to_string(),
        format!("- **URN:** {}", outcome.urn),
    ];

    let school_type = school.and_then(|s| s.school_type.as_deref()).unwrap_or(UNKNOWN);
    let capacity = school
        .and_then(|s| s.metrics.as_ref())
        .and_then(|m| m.school_capacity)
        .map_or_else(|| UNKNOWN.to_string(), |c| c.to_string());
    let proprietor = school
        .and_then(|s| s.group_name.as_deref())
        .or_else(|| outcome.company.as_ref().map(|c| c.company_name.as_str()))
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(UNKNOWN);
    lines.push(format!("- **Type:** {school_type}"));
    lines.push(format!("- **Capacity:** {capacity}"));
    lines.push(format!("- **Proprietor:** {proprietor}"));
    if let Some(la_name) = school.and_then(|s| s.la_name.as_deref()) {
        lines.push(format!("- **Local Authority:** {la_name}"));
    }

    lines.push(String::new());
    lines.push("## 2. Financial Health".to_string());
    match outcome.company.as_ref() {
        Some(company) => {
            lines.push(format!("- Company Status: {}", company.company_status));
            lines.push(format!(
                "- Company: {} ({})",
                company.company_name, company.company_number
            ));
            lines.push(format!(
                "- Charges: {} | Insolvency history: {}",
                yes_no(company.has_charges),
                yes_no(company.has_insolvency_history)
            ));
        }
        None => lines.push("- No financial data available".to_string()),
    }
    if let Some(auto) = outcome.scores.get(&Criterion::FinancialHealth) {
        lines.push(format!("- Assessment: {}", auto.rationale));
    }

    lines.push(String::new());
    lines.push("## 3. Catchment Analysis".to_string());
    match outcome.local_authority.as_ref() {
        Some(la) => {
            lines.push(format!("- **Local Authority:** {}", la.la_name));
            if let Some(pool) = la.pool() {
                lines.push(format!(
                    "- **Safety Valve Pool:** {} ({})",
                    pool.get(),
                    pool.label()
                ));
            }
            if let Some(awaiting) = la.awaiting_provision() {
                lines.push(format!("- **Awaiting provision:** {awaiting}"));
            }
            if let Some(total) = la.metrics.operational.as_ref().and_then(|ops| ops.total_ehcps) {
                lines.push(format!("- **Total EHCPs:** {total}"));
            }
        }
        None => lines.push("- No local authority data available".to_string()),
    }

    lines.push(String::new());
    lines.push("## 4. Commissioning Forecast".to_string());
    match forecast {
        Some(forecast) => {
            lines.push(format!(
                "- **Unplaced learners:** {} (addressable {})",
                forecast.total_unplaced, forecast.addressable_demand
            ));
            lines.push(format!(
                "- **LA quality:** {}% of {} LAs in pools 1-2",
                forecast.la_quality_percent, forecast.total_las
            ));
            lines.push(String::new());
            lines.push("| Capacity | Demand ratio | Confidence | Opening places | Year one places |".to_string());
            lines.push("|---|---|---|---|---|".to_string());
            for scenario in &forecast.scenarios {
                lines.push(format!(
                    "| {} | {}:1 | {} | {}-{} | {}-{} |",
                    scenario.capacity,
                    scenario.demand_ratio,
                    scenario.confidence.label(),
                    scenario.opening_places_range.0,
                    scenario.opening_places_range.1,
                    scenario.year_one_places_range.0,
                    scenario.year_one_places_range.1,
                ));
            }
            lines.push(String::new());
            lines.push(format!(
                "**Recommended capacity:** {}",
                forecast.recommended_capacity
            ));
        }
        None => lines.push("- Forecast not run".to_string()),
    }

    let result = &assessment.result;
    lines.push(String::new());
    lines.push("## 5. Go/No-Go Score".to_string());
    lines.push(format!("**Decision:** {}", result.decision.label()));
    lines.push(format!(
        "**Score:** {:.1}% ({}/{})",
        result.percentage, result.total_score, result.max_possible
    ));
    lines.push(String::new());
    lines.push("| Criterion | Weight | Score | Confidence |".to_string());
    lines.push("|---|---|---|---|".to_string());
    for row in &result.breakdown {
        let score = match row.score {
            Score::Present(grade) => grade.get().to_string(),
            Score::NotComputable => "TBC".to_string(),
        };
        let confidence = if assessment.overrides.contains_key(&row.criterion) {
            "OVERRIDE"
        } else {
            outcome
                .scores
                .get(&row.criterion)
                .map_or("MANUAL", |auto| auto.confidence.label())
        };
        lines.push(format!(
            "| {} | {} | {score} | {confidence} |",
            row.label, row.weight
        ));
    }

    lines.push(String::new());
    lines.push("## 6. Due Diligence Flags".to_string());
    let flags = due_diligence_flags(assessment);
    if flags.is_empty() {
        lines.push("- None identified".to_string());
    } else {
        lines.extend(flags.iter().map(|flag| format!("- [FLAG] {flag}")));
    }

    lines.push(String::new());
    lines.push("## 7. Recommendation".to_string());
    lines.push(recommendation(result.decision, result.percentage));

    lines.join("\n")
}

fn recommendation(decision: Decision, percentage: f64) -> String {
    let next_step = match decision {
        Decision::Go => "Proceed to full due diligence and heads of terms.",
        Decision::Investigate => "Resolve the flagged items and manual criteria before committing.",
        Decision::Avoid => "Do not pursue unless the underlying risks materially change.",
    };
    format!("{} at {percentage:.1}%. {next_step}", decision.summary())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
