use chrono::NaiveDate;

use super::super::domain::{
    parse_inspection_date, AutoScore, Confidence, ExternalRating, Grade, SchoolRecord,
};
use super::{non_empty, ALERT_MARKER, WARNING_MARKER};

/// Inspections older than this many years no longer support `HIGH` confidence.
pub const STALE_INSPECTION_YEARS: f64 = 5.0;

/// Rating phrases in match order; the first substring hit wins.
const RATING_TABLE: [(&str, u8); 7] = [
    ("outstanding", 5),
    ("good", 4),
    ("requires improvement", 2),
    ("satisfactory", 2),
    ("inadequate", 1),
    ("serious weaknesses", 1),
    ("special measures", 1),
];

/// Scores regulatory standing from the published rating, preferring the
/// external registry over the school record field by field.
pub fn score_regulatory_rating(
    school: &SchoolRecord,
    external: Option<&ExternalRating>,
    today: NaiveDate,
) -> AutoScore {
    let mut data_points = Vec::new();

    if school
        .pillar3()
        .and_then(|pillar| pillar.no_ofsted_data.as_ref())
        .is_some()
    {
        data_points.push("No Ofsted data (likely ISI-inspected)".to_string());
        return AutoScore::scored(
            Grade::of(3),
            Confidence::Medium,
            "Independent school inspected by ISI rather than Ofsted. Assumed acceptable regulatory standing.",
            data_points,
        );
    }

    let rating = non_empty(external.and_then(|ext| ext.rating.as_deref()))
        .or_else(|| non_empty(school.ofsted_rating.as_deref()));
    let inspected_on = non_empty(external.and_then(|ext| ext.last_inspection_date.as_deref()))
        .or_else(|| non_empty(school.last_inspection_date.as_deref()));
    let inspectorate = non_empty(external.and_then(|ext| ext.inspectorate_name.as_deref()))
        .or_else(|| non_empty(school.inspectorate.as_deref()));

    if let Some(inspectorate) = inspectorate {
        data_points.push(format!("Inspectorate: {inspectorate}"));
    }
    if let Some(rating) = rating {
        data_points.push(format!("Ofsted Rating: {rating}"));
    }
    if let Some(date) = inspected_on {
        data_points.push(format!("Last Inspection: {date}"));
    }

    let mut scored = rating.map(|rating| {
        let lowered = rating.to_lowercase();
        match RATING_TABLE
            .iter()
            .find(|(phrase, _)| lowered.contains(phrase))
        {
            Some((_, grade)) => {
                match *grade {
                    2 => data_points.push(format!("{WARNING_MARKER} School requires improvement")),
                    1 => data_points.push(format!(
                        "{ALERT_MARKER} Inadequate rating - high regulatory risk"
                    )),
                    _ => {}
                }
                (Grade::of(*grade), Confidence::High)
            }
            None => (Grade::of(3), Confidence::Low),
        }
    });

    if let Some(inspection) = inspected_on.and_then(parse_inspection_date) {
        let years_since = (today - inspection).num_days() as f64 / 365.0;
        if years_since > STALE_INSPECTION_YEARS {
            data_points.push(format!(
                "{WARNING_MARKER} Inspection data is {} years old",
                years_since.round()
            ));
            if let Some((_, confidence)) = scored.as_mut() {
                if *confidence == Confidence::High {
                    *confidence = Confidence::Medium;
                }
            }
        }
    }

    match scored {
        Some((grade, confidence)) => {
            let mut rationale = format!("Ofsted rating: {}.", rating.unwrap_or("Unknown"));
            match inspectorate {
                Some("Ofsted") => rationale.push_str(" State-inspected."),
                Some(other) => rationale.push_str(&format!(" Inspected by {other}.")),
                None => {}
            }
            AutoScore::scored(grade, confidence, rationale, data_points)
        }
        None => AutoScore::manual(
            "No Ofsted rating available. Manual assessment required.",
            data_points,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{
        PillarDetails, PillarFlag, RegulatoryPillar, Score,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
    }

    fn rated(rating: &str, inspected: Option<&str>) -> ExternalRating {
        ExternalRating {
            rating: Some(rating.to_string()),
            last_inspection_date: inspected.map(str::to_string),
            inspectorate_name: Some("Ofsted".to_string()),
        }
    }

    #[test]
    fn outstanding_scores_five_with_high_confidence() {
        let school = SchoolRecord::default();
        let rating = rated("Outstanding", Some("2024-02-01"));
        let score = score_regulatory_rating(&school, Some(&rating), today());
        assert_eq!(score.score.grade().map(Grade::get), Some(5));
        assert_eq!(score.confidence, Confidence::High);
        assert_eq!(score.rationale, "Ofsted rating: Outstanding. State-inspected.");
    }

    #[test]
    fn requires_improvement_carries_warning_marker() {
        let school = SchoolRecord::default();
        let rating = rated("Requires Improvement", Some("2023-09-12"));
        let score = score_regulatory_rating(&school, Some(&rating), today());
        assert_eq!(score.score.grade().map(Grade::get), Some(2));
        assert_eq!(score.confidence, Confidence::High);
        assert!(score
            .data_points
            .iter()
            .any(|point| point.starts_with(WARNING_MARKER)));
    }

    #[test]
    fn stale_inspection_downgrades_confidence() {
        let school = SchoolRecord::default();
        let rating = rated("Good", Some("2020-05-01"));
        let score = score_regulatory_rating(&school, Some(&rating), today());
        assert_eq!(score.score.grade().map(Grade::get), Some(4));
        assert_eq!(score.confidence, Confidence::Medium);
        assert!(score
            .data_points
            .iter()
            .any(|point| point.contains("Inspection data is 6 years old")));
    }

    #[test]
    fn inadequate_variants_score_one() {
        let school = SchoolRecord::default();
        for text in ["Inadequate", "Serious Weaknesses", "special measures"] {
            let rating = rated(text, None);
            let score = score_regulatory_rating(&school, Some(&rating), today());
            assert_eq!(score.score.grade().map(Grade::get), Some(1), "{text}");
            assert!(score
                .data_points
                .iter()
                .any(|point| point.starts_with(ALERT_MARKER)));
        }
    }

    #[test]
    fn unrecognised_rating_is_low_confidence_three() {
        let school = SchoolRecord::default();
        let rating = ExternalRating {
            rating: Some("Met all standards".to_string()),
            last_inspection_date: Some("2015-01-01".to_string()),
            inspectorate_name: Some("ISI".to_string()),
        };
        let score = score_regulatory_rating(&school, Some(&rating), today());
        assert_eq!(score.score.grade().map(Grade::get), Some(3));
        assert_eq!(score.confidence, Confidence::Low);
        assert_eq!(
            score.rationale,
            "Ofsted rating: Met all standards. Inspected by ISI."
        );
    }

    #[test]
    fn no_inspection_flag_assumes_isi_standing() {
        let school = SchoolRecord {
            pillar_details: Some(PillarDetails {
                pillar3: Some(RegulatoryPillar {
                    no_ofsted_data: Some(PillarFlag::default()),
                }),
                ..PillarDetails::default()
            }),
            ..SchoolRecord::default()
        };
        let rating = rated("Inadequate", None);
        let score = score_regulatory_rating(&school, Some(&rating), today());
        assert_eq!(score.score.grade().map(Grade::get), Some(3));
        assert_eq!(score.confidence, Confidence::Medium);
    }

    #[test]
    fn falls_back_to_school_record_fields() {
        let school = SchoolRecord {
            ofsted_rating: Some("Good".to_string()),
            last_inspection_date: Some("01-03-2025".to_string()),
            ..SchoolRecord::default()
        };
        let empty_external = ExternalRating::default();
        let score = score_regulatory_rating(&school, Some(&empty_external), today());
        assert_eq!(score.score.grade().map(Grade::get), Some(4));
        assert_eq!(score.confidence, Confidence::High);
        assert_eq!(score.rationale, "Ofsted rating: Good.");
    }

    #[test]
    fn missing_rating_is_manual() {
        let school = SchoolRecord::default();
        let score = score_regulatory_rating(&school, None, today());
        assert_eq!(score.score, Score::NotComputable);
        assert_eq!(score.confidence, Confidence::Manual);
    }
}
