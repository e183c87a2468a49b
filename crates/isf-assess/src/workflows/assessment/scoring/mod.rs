//! Weighted aggregation of effective criterion scores into a Go/No-Go decision.

mod config;
mod policy;

pub use config::WeightTable;
pub use policy::{Decision, GO_THRESHOLD, INVESTIGATE_THRESHOLD};

use serde::{Deserialize, Serialize};

use super::domain::{Criterion, EffectiveScores, Grade, Score};
use policy::decide;

/// Stateless aggregator over a weight table.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: WeightTable,
}

impl ScoringEngine {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn score(&self, scores: &EffectiveScores) -> ScoringResult {
        calculate_score(scores, &self.weights)
    }
}

/// One row of the weighted breakdown, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionContribution {
    pub criterion: Criterion,
    pub label: String,
    pub weight: u8,
    pub score: Score,
    pub weighted_score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub total_score: u32,
    pub max_possible: u32,
    pub percentage: f64,
    pub decision: Decision,
    pub breakdown: Vec<CriterionContribution>,
}

/// Only scored criteria count toward the maximum, so partially assessed
/// schools are judged on what is known.
pub fn calculate_score(scores: &EffectiveScores, weights: &WeightTable) -> ScoringResult {
    let mut total_score = 0u32;
    let mut max_possible = 0u32;
    let mut breakdown = Vec::with_capacity(Criterion::ordered().len());

    for criterion in Criterion::ordered() {
        let weight = weights.weight(criterion);
        let score = scores
            .get(&criterion)
            .copied()
            .unwrap_or(Score::NotComputable);

        let weighted_score = score.grade().map(|grade| {
            let weighted = u32::from(grade.get()) * u32::from(weight);
            total_score += weighted;
            max_possible += u32::from(Grade::MAX) * u32::from(weight);
            weighted
        });

        breakdown.push(CriterionContribution {
            criterion,
            label: criterion.label().to_string(),
            weight,
            score,
            weighted_score,
        });
    }

    let percentage = if max_possible == 0 {
        0.0
    } else {
        (f64::from(total_score) * 100.0 / f64::from(max_possible)).clamp(0.0, 100.0)
    };

    ScoringResult {
        total_score,
        max_possible,
        percentage,
        decision: decide(percentage),
        breakdown,
    }
}
