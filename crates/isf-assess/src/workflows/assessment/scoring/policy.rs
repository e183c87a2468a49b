use serde::{Deserialize, Serialize};

/// Percentage at or above which an acquisition is a go.
pub const GO_THRESHOLD: f64 = 75.0;
/// Percentage at or above which an acquisition warrants investigation.
pub const INVESTIGATE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Go,
    Investigate,
    Avoid,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Go => "GO",
            Decision::Investigate => "INVESTIGATE",
            Decision::Avoid => "AVOID",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Decision::Go => "Proceed with acquisition",
            Decision::Investigate => "Further investigation required",
            Decision::Avoid => "Do not proceed",
        }
    }
}

pub(crate) fn decide(percentage: f64) -> Decision {
    if percentage >= GO_THRESHOLD {
        Decision::Go
    } else if percentage >= INVESTIGATE_THRESHOLD {
        Decision::Investigate
    } else {
        Decision::Avoid
    }
}
