use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{Criterion, Grade};

/// Criterion weights applied by the aggregator. Criteria missing from the
/// table weigh zero and never contribute to the maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    weights: BTreeMap<Criterion, u8>,
}

impl WeightTable {
    pub fn new(weights: BTreeMap<Criterion, u8>) -> Self {
        Self { weights }
    }

    pub fn weight(&self, criterion: Criterion) -> u8 {
        self.weights.get(&criterion).copied().unwrap_or(0)
    }

    pub fn with_weight(mut self, criterion: Criterion, weight: u8) -> Self {
        self.weights.insert(criterion, weight);
        self
    }

    /// Weighted maximum when every criterion carries a score.
    pub fn max_possible(&self) -> u32 {
        self.weights
            .values()
            .map(|weight| u32::from(*weight) * u32::from(Grade::MAX))
            .sum()
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::new(
            Criterion::ordered()
                .into_iter()
                .map(|criterion| (criterion, criterion.default_weight()))
                .collect(),
        )
    }
}
