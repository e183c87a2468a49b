//! Commissioning forecast: addressable demand against candidate facility sizes.

mod catchment;
mod fill;
pub mod router;

pub use catchment::{Catchment, CatchmentImportError, CatchmentImporter};
pub use fill::{lookup_fill, FillBand, FillEstimate, FALLBACK_FILL, FILL_TABLE};
pub use router::forecast_router;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::assessment::domain::{CommissioningPool, Confidence};

/// Share of unplaced learners reachable by the provision type.
pub const ADDRESSABLE_SHARE: f64 = 0.34;
pub const DEFAULT_CAPACITIES: [u32; 4] = [12, 18, 24, 30];
/// Demand ratio at which a scenario is `HIGH` confidence and eligible for recommendation.
pub const HIGH_DEMAND_RATIO: u32 = 40;
pub const MEDIUM_DEMAND_RATIO: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    #[default]
    Full,
    Partial,
}

/// A local authority whose area overlaps the catchment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaInCatchment {
    #[serde(default)]
    pub la_name: String,
    pub pool: CommissioningPool,
    #[serde(default)]
    pub coverage: Coverage,
    #[serde(default)]
    pub coverage_percent: f64,
    #[serde(default)]
    pub students: u32,
    #[serde(default)]
    pub ehcps: u32,
    #[serde(default)]
    pub unplaced: u32,
}

impl LaInCatchment {
    pub fn in_pool(pool: CommissioningPool) -> Self {
        Self {
            la_name: String::new(),
            pool,
            coverage: Coverage::Full,
            coverage_percent: 100.0,
            students: 0,
            ehcps: 0,
            unplaced: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityScenario {
    pub capacity: u32,
    pub demand_ratio: u32,
    pub confidence: Confidence,
    pub opening_fill_range: (u8, u8),
    pub year_one_fill_range: (u8, u8),
    pub opening_places_range: (u32, u32),
    pub year_one_places_range: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub total_unplaced: u32,
    pub addressable_demand: u32,
    pub total_las: usize,
    pub pool_counts: [usize; 4],
    pub la_quality_percent: u8,
    pub scenarios: Vec<CapacityScenario>,
    pub recommended_capacity: u32,
}

impl ForecastResult {
    pub fn pool_count(&self, pool: CommissioningPool) -> usize {
        self.pool_counts[usize::from(pool.get() - 1)]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForecastError {
    #[error("at least one candidate capacity is required")]
    NoCapacities,
    #[error("candidate capacities must be positive")]
    ZeroCapacity,
}

/// Forecast inputs as supplied over HTTP or the CLI. Inline catchment rows are
/// appended to `las`; `unplaced` defaults to the catchment's summed unplaced count.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastRequest {
    pub unplaced: Option<u32>,
    pub las: Vec<LaInCatchment>,
    pub catchment_csv: Option<String>,
    pub capacities: Option<Vec<u32>>,
}

#[derive(Debug, Error)]
pub enum ForecastRequestError {
    #[error(transparent)]
    Catchment(#[from] CatchmentImportError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl ForecastRequest {
    pub fn run(self) -> Result<ForecastResult, ForecastRequestError> {
        let mut las = self.las;
        if let Some(csv) = self.catchment_csv.as_deref() {
            let catchment = CatchmentImporter::from_reader(csv.as_bytes())?;
            las.extend(catchment.local_authorities);
        }

        let unplaced = self
            .unplaced
            .unwrap_or_else(|| las.iter().map(|la| la.unplaced).sum());
        let capacities = self
            .capacities
            .unwrap_or_else(|| DEFAULT_CAPACITIES.to_vec());

        Ok(calculate_forecast(unplaced, &las, &capacities)?)
    }
}

pub fn addressable_demand(unplaced: u32) -> u32 {
    (f64::from(unplaced) * ADDRESSABLE_SHARE).round() as u32
}

/// Percentage of catchment LAs in pools 1 or 2, rounded; 0 with no LAs.
pub fn la_quality_percent(las: &[LaInCatchment]) -> u8 {
    if las.is_empty() {
        return 0;
    }
    let good = las.iter().filter(|la| la.pool.get() <= 2).count();
    (good as f64 / las.len() as f64 * 100.0).round() as u8
}

pub fn scenario_confidence(demand_ratio: u32) -> Confidence {
    if demand_ratio >= HIGH_DEMAND_RATIO {
        Confidence::High
    } else if demand_ratio >= MEDIUM_DEMAND_RATIO {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn calculate_forecast(
    unplaced: u32,
    las: &[LaInCatchment],
    capacities: &[u32],
) -> Result<ForecastResult, ForecastError> {
    let Some(&first_capacity) = capacities.first() else {
        return Err(ForecastError::NoCapacities);
    };
    if capacities.contains(&0) {
        return Err(ForecastError::ZeroCapacity);
    }

    let addressable = addressable_demand(unplaced);
    let quality = la_quality_percent(las);

    let mut pool_counts = [0usize; 4];
    for la in las {
        pool_counts[usize::from(la.pool.get() - 1)] += 1;
    }

    let scenarios: Vec<CapacityScenario> = capacities
        .iter()
        .map(|&capacity| build_scenario(capacity, addressable, quality))
        .collect();

    let recommended_capacity = scenarios
        .iter()
        .filter(|scenario| scenario.demand_ratio >= HIGH_DEMAND_RATIO)
        .map(|scenario| scenario.capacity)
        .max()
        .unwrap_or(first_capacity);

    Ok(ForecastResult {
        total_unplaced: unplaced,
        addressable_demand: addressable,
        total_las: las.len(),
        pool_counts,
        la_quality_percent: quality,
        scenarios,
        recommended_capacity,
    })
}

fn build_scenario(capacity: u32, addressable: u32, quality: u8) -> CapacityScenario {
    let demand_ratio = (f64::from(addressable) / f64::from(capacity)).round() as u32;
    let fill = lookup_fill(demand_ratio, quality);
    let places = |(low, high): (u8, u8)| (expected_places(capacity, low), expected_places(capacity, high));

    CapacityScenario {
        capacity,
        demand_ratio,
        confidence: scenario_confidence(demand_ratio),
        opening_fill_range: fill.opening,
        year_one_fill_range: fill.year_one,
        opening_places_range: places(fill.opening),
        year_one_places_range: places(fill.year_one),
    }
}

fn expected_places(capacity: u32, fill_percent: u8) -> u32 {
    (f64::from(capacity) * f64::from(fill_percent) / 100.0).round() as u32
}
