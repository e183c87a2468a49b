use super::super::domain::{AutoScore, Confidence, SchoolRecord};
use super::{grade_below, grade_up_to, non_empty};

/// Utilisation percentage upper bounds (exclusive) mapped to grades; 95% and above scores 1.
///
/// Policy constant with no documented derivation; kept exactly as historically scored.
pub const UTILISATION_BANDS: [(f64, u8); 4] = [(60.0, 5), (75.0, 4), (85.0, 3), (95.0, 2)];

const ASSET_RISK_BANDS: [(f64, u8); 3] = [(0.0, 5), (2.0, 4), (4.0, 3)];

/// Infers building headroom from capacity utilisation. Spare space favours
/// conversion, but only a physical inspection can confirm condition.
pub fn score_building_condition(school: &SchoolRecord) -> AutoScore {
    let mut data_points = Vec::new();
    let metrics = school.metrics.as_ref();

    if let Some(boarders) = metrics.and_then(|m| m.boarders).filter(|count| *count > 0) {
        data_points.push(format!("Boarders: {boarders}"));
    }

    let occupancy = metrics.and_then(|m| {
        match (m.school_capacity, m.pupil_count) {
            (Some(capacity), Some(pupils)) if capacity > 0 && pupils > 0 => {
                Some((capacity, pupils))
            }
            _ => None,
        }
    });

    let utilisation = occupancy.map(|(capacity, pupils)| {
        let pct = f64::from(pupils) / f64::from(capacity) * 100.0;
        data_points.push(format!(
            "Capacity utilisation: {pct:.1}% ({pupils}/{capacity})"
        ));
        pct
    });

    if let Some(pillar) = school.pillar5() {
        if let Some(rural) = pillar.rural_isolation.as_ref() {
            let flag = non_empty(rural.flag.as_deref()).unwrap_or("flagged");
            data_points.push(format!("Rural isolation: {flag}"));
        }
        if pillar.lease_data_unavailable {
            data_points.push("Lease tenure data not available".to_string());
        }
    }

    if let Some(boarding) = school.pillar6().and_then(|p| p.has_boarding.as_ref()) {
        let detail = non_empty(boarding.flag.as_deref())
            .or_else(|| non_empty(boarding.status.as_deref()))
            .unwrap_or("Yes");
        data_points.push(format!("Boarding: {detail}"));
    }

    match utilisation {
        Some(pct) => AutoScore::scored(
            grade_below(pct, &UTILISATION_BANDS, 1),
            Confidence::Low,
            "Based on capacity utilisation. Physical inspection required for accurate score.",
            data_points,
        ),
        None => AutoScore::manual(
            "No capacity data available. Requires physical inspection.",
            data_points,
        ),
    }
}

/// Scores access from the asset-risk pillar; urban sites with low asset risk score best.
pub fn score_location_access(school: &SchoolRecord) -> AutoScore {
    let mut data_points = Vec::new();

    if let Some(location) = school.location.as_ref() {
        let line = [&location.town, &location.county, &location.postcode]
            .into_iter()
            .filter_map(|part| non_empty(part.as_deref()))
            .collect::<Vec<_>>()
            .join(", ");
        data_points.push(format!("Location: {line}"));
    }

    let Some(vulnerability) = school.vulnerability_score.as_ref() else {
        return AutoScore::manual(
            "No asset risk data available. Manual assessment required.",
            data_points,
        );
    };

    let asset_points = vulnerability.pillar5_assets.unwrap_or(0.0);
    data_points.push(format!("Asset risk: {asset_points} points"));

    let rural_points = school
        .pillar5()
        .and_then(|pillar| pillar.rural_isolation.as_ref())
        .map(|rural| rural.points.unwrap_or(0.0));
    if let Some(points) = rural_points {
        let rural = if points > 0.0 { "Yes" } else { "No" };
        data_points.push(format!("Rural isolation: {rural} ({points} pts)"));
    }

    let setting = if rural_points.is_some_and(|points| points > 0.0) {
        "Rural location."
    } else {
        "Urban/suburban."
    };

    AutoScore::scored(
        grade_up_to(asset_points, &ASSET_RISK_BANDS, 2),
        Confidence::Medium,
        format!("Asset risk {asset_points} points. {setting}"),
        data_points,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{
        AssetPillar, CapacityMetrics, Grade, PillarDetails, PillarFlag, Score, SchoolLocation,
        VulnerabilityScore,
    };

    fn occupied(capacity: u32, pupils: u32) -> SchoolRecord {
        SchoolRecord {
            metrics: Some(CapacityMetrics {
                school_capacity: Some(capacity),
                pupil_count: Some(pupils),
                ..CapacityMetrics::default()
            }),
            ..SchoolRecord::default()
        }
    }

    #[test]
    fn utilisation_bands_are_exclusive_upper_bounds() {
        let cases = [(59, 5), (60, 4), (74, 4), (75, 3), (84, 3), (85, 2), (94, 2), (95, 1), (120, 1)];
        for (pupils, grade) in cases {
            let score = score_building_condition(&occupied(100, pupils));
            assert_eq!(score.score.grade().map(Grade::get), Some(grade), "pupils {pupils}");
            assert_eq!(score.confidence, Confidence::Low);
        }
    }

    #[test]
    fn utilisation_is_reported_to_one_decimal() {
        let score = score_building_condition(&occupied(240, 130));
        assert!(score
            .data_points
            .iter()
            .any(|point| point == "Capacity utilisation: 54.2% (130/240)"));
    }

    #[test]
    fn missing_capacity_is_manual() {
        let score = score_building_condition(&occupied(0, 130));
        assert_eq!(score.score, Score::NotComputable);
        assert_eq!(score.confidence, Confidence::Manual);
    }

    fn located(asset_points: Option<f64>, rural_points: Option<f64>) -> SchoolRecord {
        SchoolRecord {
            location: Some(SchoolLocation {
                town: Some("Ashford".to_string()),
                county: None,
                postcode: Some("TN24 8AA".to_string()),
            }),
            vulnerability_score: asset_points.map(|points| VulnerabilityScore {
                pillar5_assets: Some(points),
                ..VulnerabilityScore::default()
            }),
            pillar_details: rural_points.map(|points| PillarDetails {
                pillar5: Some(AssetPillar {
                    rural_isolation: Some(PillarFlag {
                        points: Some(points),
                        ..PillarFlag::default()
                    }),
                    lease_data_unavailable: false,
                }),
                ..PillarDetails::default()
            }),
            ..SchoolRecord::default()
        }
    }

    #[test]
    fn location_bands_follow_asset_risk() {
        let cases = [(0.0, 5), (1.0, 4), (2.0, 4), (4.0, 3), (4.5, 2), (9.0, 2)];
        for (points, grade) in cases {
            let score = score_location_access(&located(Some(points), None));
            assert_eq!(score.score.grade().map(Grade::get), Some(grade), "points {points}");
            assert_eq!(score.confidence, Confidence::Medium);
        }
    }

    #[test]
    fn rural_isolation_is_described() {
        let score = score_location_access(&located(Some(2.0), Some(1.0)));
        assert_eq!(score.data_points[0], "Location: Ashford, TN24 8AA");
        assert!(score
            .data_points
            .iter()
            .any(|point| point == "Rural isolation: Yes (1 pts)"));
        assert_eq!(score.rationale, "Asset risk 2 points. Rural location.");
    }

    #[test]
    fn missing_vulnerability_leaves_location_manual() {
        let score = score_location_access(&located(None, None));
        assert_eq!(score.score, Score::NotComputable);
        assert_eq!(score.data_points.len(), 1);
    }
}
