use serde::{Deserialize, Serialize};

/// Opening and year-one fill percentages as inclusive `(low, high)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEstimate {
    pub opening: (u8, u8),
    pub year_one: (u8, u8),
}

/// One row of the fill-rate model. Ratio bounds are half-open, quality bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillBand {
    pub ratio_min: u32,
    pub ratio_max: Option<u32>,
    pub quality_min: u8,
    pub quality_max: u8,
    pub estimate: FillEstimate,
}

impl FillBand {
    const fn new(
        ratio: (u32, Option<u32>),
        quality: (u8, u8),
        opening: (u8, u8),
        year_one: (u8, u8),
    ) -> Self {
        Self {
            ratio_min: ratio.0,
            ratio_max: ratio.1,
            quality_min: quality.0,
            quality_max: quality.1,
            estimate: FillEstimate { opening, year_one },
        }
    }

    pub fn admits(&self, demand_ratio: u32, quality_percent: u8) -> bool {
        demand_ratio >= self.ratio_min
            && self.ratio_max.map_or(true, |max| demand_ratio < max)
            && (self.quality_min..=self.quality_max).contains(&quality_percent)
    }
}

/// Used when no band admits the combination (e.g. ratio >= 10 with quality under 40%).
pub const FALLBACK_FILL: FillEstimate = FillEstimate {
    opening: (15, 25),
    year_one: (35, 50),
};

/// Matched first to last; a quality of exactly 70% lands in the upper band.
pub const FILL_TABLE: [FillBand; 7] = [
    FillBand::new((40, None), (70, 100), (50, 65), (85, 100)),
    FillBand::new((40, None), (40, 70), (40, 55), (75, 90)),
    FillBand::new((20, Some(40)), (70, 100), (40, 55), (75, 90)),
    FillBand::new((20, Some(40)), (40, 70), (30, 45), (65, 80)),
    FillBand::new((10, Some(20)), (70, 100), (25, 40), (55, 70)),
    FillBand::new((10, Some(20)), (40, 70), (20, 30), (45, 60)),
    FillBand::new((0, Some(10)), (0, 100), (15, 25), (35, 50)),
];

pub fn lookup_fill(demand_ratio: u32, quality_percent: u8) -> FillEstimate {
    FILL_TABLE
        .iter()
        .find(|band| band.admits(demand_ratio, quality_percent))
        .map(|band| band.estimate)
        .unwrap_or(FALLBACK_FILL)
}
