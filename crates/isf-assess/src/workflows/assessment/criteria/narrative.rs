//! Criteria that always need a human judgement. They still surface whatever
//! context the record carries.

use super::super::domain::{AutoScore, SchoolRecord};
use super::non_empty;

pub fn score_staffing_leadership(school: &SchoolRecord) -> AutoScore {
    let mut data_points = Vec::new();
    if let Some(head) = school.headteacher.as_ref() {
        let name = head.full_name();
        if !name.is_empty() {
            let role = non_empty(head.preferred_job_title.as_deref()).unwrap_or("Headteacher");
            data_points.push(format!("{role}: {name}"));
        }
    }
    if let Some(group) = non_empty(school.group_name.as_deref()) {
        data_points.push(format!("Group: {group}"));
    }

    AutoScore::manual(
        "Requires manual assessment of leadership quality and staffing stability.",
        data_points,
    )
}

pub fn score_reputation(school: &SchoolRecord) -> AutoScore {
    let mut data_points = Vec::new();
    if let Some(status) = non_empty(school.target_status.as_deref()) {
        data_points.push(format!("Target status: {status}"));
    }
    let rationale = non_empty(school.rationale.as_deref());
    if let Some(rationale) = rationale {
        data_points.push(format!("ISF rationale: {rationale}"));
    }

    AutoScore::manual(
        rationale.unwrap_or("Requires manual assessment of school reputation."),
        data_points,
    )
}

pub fn score_synergy() -> AutoScore {
    AutoScore::manual(
        "Requires manual assessment of fit with existing portfolio.",
        Vec::new(),
    )
}
