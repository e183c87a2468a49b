use super::super::domain::{AutoScore, Confidence, Grade, LocalAuthorityRecord};

/// Scores commissioning demand from the awaiting-provision count and the LA's pool.
pub fn score_commissioning_demand(la: Option<&LocalAuthorityRecord>) -> AutoScore {
    let Some(la) = la else {
        return AutoScore::manual("Insufficient data for auto-scoring.", Vec::new());
    };

    let awaiting = la.awaiting_provision();
    let pool = la.pool();
    let operational = la.metrics.operational.as_ref();

    let mut data_points = Vec::new();
    if let Some(awaiting) = awaiting {
        let la_name = if la.la_name.trim().is_empty() {
            "LA"
        } else {
            la.la_name.as_str()
        };
        data_points.push(format!(
            "{awaiting} learners awaiting provision in {la_name}"
        ));
    }
    if let Some(total) = operational.and_then(|ops| ops.total_ehcps) {
        data_points.push(format!("{total} total EHCPs"));
    }
    if let Some(timeliness) = operational.and_then(|ops| ops.timeliness_pct) {
        data_points.push(format!("{timeliness:.1}% of EHCPs issued within 20 weeks"));
    }
    if let Some(pool) = pool {
        data_points.push(format!(
            "Safety Valve Pool {} ({})",
            pool.get(),
            pool.label()
        ));
    }

    let scored = match (awaiting, pool.map(|pool| pool.get())) {
        (Some(awaiting), Some(pool)) => Some(if awaiting >= 200 && pool <= 2 {
            (5, Confidence::High)
        } else if awaiting >= 100 && pool <= 2 {
            (4, Confidence::High)
        } else if awaiting >= 50 {
            // covers the >=100 pool 3/4 cases as well
            (3, Confidence::Medium)
        } else if awaiting >= 20 {
            (2, Confidence::Medium)
        } else {
            (1, Confidence::Medium)
        }),
        (Some(awaiting), None) => Some(if awaiting >= 150 {
            (4, Confidence::Low)
        } else if awaiting >= 50 {
            (3, Confidence::Low)
        } else {
            (2, Confidence::Low)
        }),
        (None, _) => None,
    };

    match scored {
        Some((grade, confidence)) => {
            let awaiting = awaiting.map_or_else(|| "?".to_string(), |count| count.to_string());
            let pool = pool.map_or_else(|| "?".to_string(), |pool| pool.get().to_string());
            AutoScore::scored(
                Grade::of(grade),
                confidence,
                format!("Based on {awaiting} unplaced learners and Pool {pool} LA classification."),
                data_points,
            )
        }
        None => AutoScore::manual("Insufficient data for auto-scoring.", data_points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{
        LocalAuthorityMetrics, PlacementMetrics, SafetyValvePool, Score,
    };

    fn authority(awaiting: Option<u32>, pool: Option<u8>) -> LocalAuthorityRecord {
        LocalAuthorityRecord {
            la_name: "Kent".to_string(),
            metrics: LocalAuthorityMetrics {
                placements: Some(PlacementMetrics {
                    awaiting_provision: awaiting,
                }),
                ..LocalAuthorityMetrics::default()
            },
            safety_valve_pool: pool.map(|pool| SafetyValvePool { pool: Some(pool) }),
            ..LocalAuthorityRecord::default()
        }
    }

    fn graded(score: &AutoScore) -> (Option<u8>, Confidence) {
        (score.score.grade().map(Grade::get), score.confidence)
    }

    #[test]
    fn tiers_with_known_pool() {
        let cases = [
            (200, 2, 5, Confidence::High),
            (199, 1, 4, Confidence::High),
            (100, 2, 4, Confidence::High),
            (250, 3, 3, Confidence::Medium),
            (100, 3, 3, Confidence::Medium),
            (150, 4, 3, Confidence::Medium),
            (50, 1, 3, Confidence::Medium),
            (49, 1, 2, Confidence::Medium),
            (20, 4, 2, Confidence::Medium),
            (19, 1, 1, Confidence::Medium),
        ];

        for (awaiting, pool, grade, confidence) in cases {
            let score = score_commissioning_demand(Some(&authority(Some(awaiting), Some(pool))));
            assert_eq!(
                graded(&score),
                (Some(grade), confidence),
                "awaiting {awaiting} pool {pool}"
            );
        }
    }

    #[test]
    fn unknown_pool_falls_back_to_low_confidence_tiers() {
        let cases = [(150, 4), (149, 3), (50, 3), (0, 2)];
        for (awaiting, grade) in cases {
            let score = score_commissioning_demand(Some(&authority(Some(awaiting), None)));
            assert_eq!(graded(&score), (Some(grade), Confidence::Low));
            assert!(score.rationale.contains("Pool ?"));
        }
    }

    #[test]
    fn out_of_range_pool_is_treated_as_unknown() {
        let score = score_commissioning_demand(Some(&authority(Some(220), Some(9))));
        assert_eq!(graded(&score), (Some(4), Confidence::Low));
    }

    #[test]
    fn missing_awaiting_count_is_manual() {
        let score = score_commissioning_demand(Some(&authority(None, Some(1))));
        assert_eq!(score.score, Score::NotComputable);
        assert_eq!(score.confidence, Confidence::Manual);
        assert!(score
            .data_points
            .iter()
            .any(|point| point == "Safety Valve Pool 1 (fastest commissioning)"));

        let missing = score_commissioning_demand(None);
        assert_eq!(missing.confidence, Confidence::Manual);
    }

    #[test]
    fn evidence_names_the_authority() {
        let score = score_commissioning_demand(Some(&authority(Some(120), Some(2))));
        assert_eq!(
            score.data_points[0],
            "120 learners awaiting provision in Kent"
        );
        assert_eq!(
            score.rationale,
            "Based on 120 unplaced learners and Pool 2 LA classification."
        );
    }
}
