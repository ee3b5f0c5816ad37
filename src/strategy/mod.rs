//! Strategy module: the decision engine and the pieces it is built from
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PURE (no I/O)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Opportunity arrives                                        │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  entry_gate::evaluate() → EntryVerdict                      │
//! │    price floor → edge → survival → period → entry score     │
//! │       │                                                     │
//! │       ▼ (if accepted)                                       │
//! │  PositionSizer::size() → SizingResult                       │
//! │    Kelly → drawdown cap → throttle → caps → contracts       │
//! │       │                                                     │
//! │       ▼ (if contracts > 0)                                  │
//! │  Decision::Go(OrderIntent)                                  │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ASYNC (adapter calls)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DecisionEngine::run_cycle()                                │
//! │    - get_position(game_id), skip at the per-game ceiling    │
//! │    - decide()                                               │
//! │    - place_order(intent)                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`FeeSchedule`]: Kalshi maker/taker fee curve
//! - [`PositionSizer`]: Kelly sizing with drawdown cap and throttle
//! - [`SurvivalModel`]: pluggable survival curve, [`BrownianSurvival`] by default
//! - [`DecisionEngine`]: gate, sizer and adapter wired together
//!
//! # Example
//!
//! ```ignore
//! use courtside::strategy::DecisionEngine;
//!
//! let engine = DecisionEngine::new(config.trading.clone());
//! match engine.decide(&opportunity, &ledger.snapshot(), held)? {
//!     Decision::Go { intent, .. } => adapter.place_order(&intent).await?,
//!     Decision::NoGo(reason) => debug!(%reason, "skipped"),
//! }
//! ```

pub mod engine;
pub mod entry_gate;
pub mod fees;
pub mod kelly;
pub mod score;
pub mod size_calculator;
pub mod survival;
mod types;

pub use types::{
    Decision, DecisionStage, EntryVerdict, NoGoReason, RejectionReason, SizingRejection,
    SizingResult,
};

pub use engine::{CycleOutcome, DecisionEngine};
pub use fees::{kalshi_fee, FeeSchedule};
pub use score::{entry_score, EntryGrade, EntryScore};
pub use size_calculator::{drawdown_scale, PositionSizer};
pub use survival::{BrownianSurvival, SurvivalModel};
