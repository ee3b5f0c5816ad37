//! Composite entry score
//!
//! Blends edge, survival, time to resolution and the admissible Kelly
//! stake into a 0-100 score with a grade. The gate runs it last and refuses
//! entries that score under `min_entry_score` or grade as wait/skip.

use serde::{Deserialize, Serialize};

/// Edge at which the edge component saturates
const FULL_EDGE: f64 = 0.15;
/// Admissible Kelly fraction at which the sizing component saturates
const FULL_KELLY: f64 = 0.10;
const VELOCITY_HORIZON_SECONDS: f64 = 3600.0;
const MIN_VELOCITY_SECONDS: f64 = 60.0;

const EDGE_WEIGHT: f64 = 0.30;
const SURVIVAL_WEIGHT: f64 = 0.40;
const VELOCITY_WEIGHT: f64 = 0.20;
const KELLY_WEIGHT: f64 = 0.10;

const STRONG_ENTRY_SCORE: f64 = 70.0;
const ENTER_SCORE: f64 = 50.0;
const MARGINAL_SCORE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryGrade {
    StrongEntry,
    Enter,
    Marginal,
    /// Survival under the threshold, whatever the score
    Wait,
    Skip,
}

impl EntryGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryGrade::StrongEntry => "strong entry",
            EntryGrade::Enter => "enter",
            EntryGrade::Marginal => "marginal",
            EntryGrade::Wait => "wait",
            EntryGrade::Skip => "skip",
        }
    }

    pub fn allows_entry(&self) -> bool {
        !matches!(self, EntryGrade::Wait | EntryGrade::Skip)
    }
}

impl std::fmt::Display for EntryGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryScore {
    /// 0 to 100, one decimal place
    pub score: f64,
    pub grade: EntryGrade,
}

/// Score an entry
///
/// Components, each in `[0, 1]`:
///
/// ```text
/// edge      = clamp(edge / 0.15)
/// survival  = max(0, (s − min_survival) / (1 − min_survival))
/// velocity  = min(1, 3600 / max(seconds_remaining, 60))
/// kelly     = min(1, f_admissible / 0.10)
/// score     = 100 · (0.30·edge + 0.40·survival + 0.20·velocity + 0.10·kelly)
/// ```
pub fn entry_score(
    edge: f64,
    survival: f64,
    seconds_remaining: u32,
    kelly_fraction: f64,
    min_survival: f64,
) -> EntryScore {
    let edge_component = (edge / FULL_EDGE).clamp(0.0, 1.0);
    let survival_component = if min_survival < 1.0 {
        ((survival - min_survival) / (1.0 - min_survival)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let velocity_component =
        (VELOCITY_HORIZON_SECONDS / f64::from(seconds_remaining).max(MIN_VELOCITY_SECONDS)).min(1.0);
    let kelly_component = (kelly_fraction.max(0.0) / FULL_KELLY).min(1.0);

    let raw = EDGE_WEIGHT * edge_component
        + SURVIVAL_WEIGHT * survival_component
        + VELOCITY_WEIGHT * velocity_component
        + KELLY_WEIGHT * kelly_component;
    let score = (raw * 1000.0).round() / 10.0;

    let grade = if survival < min_survival {
        EntryGrade::Wait
    } else if score >= STRONG_ENTRY_SCORE {
        EntryGrade::StrongEntry
    } else if score >= ENTER_SCORE {
        EntryGrade::Enter
    } else if score >= MARGINAL_SCORE {
        EntryGrade::Marginal
    } else {
        EntryGrade::Skip
    };

    EntryScore { score, grade }
}
