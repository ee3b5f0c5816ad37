use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::OrderIntent;
use crate::strategy::score::EntryScore;

/// Why the entry gate refused an opportunity
///
/// Checks run in declaration order; the first failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    PriceBelowFloor,
    InsufficientEdge,
    BelowSurvivalThreshold,
    PeriodExcluded,
    LowEntryScore,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::PriceBelowFloor => "price below floor",
            RejectionReason::InsufficientEdge => "insufficient edge",
            RejectionReason::BelowSurvivalThreshold => "below survival threshold",
            RejectionReason::PeriodExcluded => "period excluded",
            RejectionReason::LowEntryScore => "entry score too low",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the entry gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryVerdict {
    pub accepted: bool,
    /// Populated on every rejection, empty on acceptance
    pub reason: Option<RejectionReason>,
    /// Side probability minus ask-implied probability
    pub edge: Decimal,
    /// Survival probability, when the gate got far enough to compute it
    pub survival: Option<f64>,
    /// Composite score, computed once every other check has passed
    pub score: Option<EntryScore>,
}

impl EntryVerdict {
    pub fn accept(edge: Decimal, survival: f64, score: EntryScore) -> Self {
        Self {
            accepted: true,
            reason: None,
            edge,
            survival: Some(survival),
            score: Some(score),
        }
    }

    pub fn reject(reason: RejectionReason, edge: Decimal, survival: Option<f64>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
            edge,
            survival,
            score: None,
        }
    }

    pub fn with_score(mut self, score: EntryScore) -> Self {
        self.score = Some(score);
        self
    }

    /// Reason text, empty when accepted
    pub fn reason_str(&self) -> &'static str {
        self.reason.map(|r| r.as_str()).unwrap_or("")
    }
}

/// Why the sizer returned zero contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingRejection {
    BelowPriceFloor,
    FeeExceedsProfit,
    NoEdge,
    NoAdmissibleFraction,
    InsufficientCapital,
    ZeroContracts,
    NonPositiveExpectedValue,
}

impl SizingRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingRejection::BelowPriceFloor => "below price floor",
            SizingRejection::FeeExceedsProfit => "fee exceeds profit",
            SizingRejection::NoEdge => "no edge",
            SizingRejection::NoAdmissibleFraction => "no fraction satisfies drawdown limit",
            SizingRejection::InsufficientCapital => "insufficient free capital",
            SizingRejection::ZeroContracts => "zero contracts",
            SizingRejection::NonPositiveExpectedValue => "non-positive expected value",
        }
    }
}

impl std::fmt::Display for SizingRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the position sizer
///
/// Dollar amounts throughout. `contracts == 0` iff `rejected_reason` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub contracts: u32,
    /// `contracts × price`
    pub notional_cost: Decimal,
    /// Exchange fee for the whole order
    pub expected_fee: Decimal,
    /// `contracts × (p − price) − fee`
    pub expected_value: Decimal,
    /// Full-Kelly fraction before any cap
    pub kelly_fraction: Decimal,
    /// Fraction actually staked after ruin cap and drawdown throttle
    pub applied_fraction: Decimal,
    pub rejected_reason: Option<SizingRejection>,
}

impl SizingResult {
    pub fn rejected(reason: SizingRejection, kelly_fraction: Decimal) -> Self {
        Self {
            contracts: 0,
            notional_cost: Decimal::ZERO,
            expected_fee: Decimal::ZERO,
            expected_value: Decimal::ZERO,
            kelly_fraction,
            applied_fraction: Decimal::ZERO,
            rejected_reason: Some(reason),
        }
    }

    /// Notional plus fee
    pub fn total_cost(&self) -> Decimal {
        self.notional_cost + self.expected_fee
    }

    pub fn is_viable(&self) -> bool {
        self.contracts > 0 && self.rejected_reason.is_none()
    }
}

/// Stage a decision cycle reached before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStage {
    Received,
    Gated,
    Sized,
    IntentEmitted,
}

/// Why a cycle ended without an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoGoReason {
    /// Existing exposure at or above the per-game ceiling
    PositionCeiling { held: u32, ceiling: u32 },
    /// Entry gate refused the opportunity
    Rejected(EntryVerdict),
    /// Sizer found no viable size
    SizingInfeasible(SizingResult),
}

impl NoGoReason {
    /// Last stage reached
    pub fn stage(&self) -> DecisionStage {
        match self {
            NoGoReason::PositionCeiling { .. } => DecisionStage::Received,
            NoGoReason::Rejected(_) => DecisionStage::Gated,
            NoGoReason::SizingInfeasible(_) => DecisionStage::Sized,
        }
    }
}

impl std::fmt::Display for NoGoReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoGoReason::PositionCeiling { held, ceiling } => {
                write!(f, "position ceiling ({} held, ceiling {})", held, ceiling)
            }
            NoGoReason::Rejected(verdict) => f.write_str(verdict.reason_str()),
            NoGoReason::SizingInfeasible(sizing) => match sizing.rejected_reason {
                Some(reason) => f.write_str(reason.as_str()),
                None => f.write_str("zero contracts"),
            },
        }
    }
}

/// Engine output for one opportunity
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// No action should be taken
    NoGo(NoGoReason),
    /// Submit this order
    Go {
        intent: OrderIntent,
        verdict: EntryVerdict,
        sizing: SizingResult,
    },
}

impl Decision {
    /// Returns true if this is a Go decision
    pub fn is_go(&self) -> bool {
        matches!(self, Self::Go { .. })
    }

    pub fn intent(&self) -> Option<&OrderIntent> {
        match self {
            Self::Go { intent, .. } => Some(intent),
            Self::NoGo(_) => None,
        }
    }

    pub fn stage(&self) -> DecisionStage {
        match self {
            Self::Go { .. } => DecisionStage::IntentEmitted,
            Self::NoGo(reason) => reason.stage(),
        }
    }
}
