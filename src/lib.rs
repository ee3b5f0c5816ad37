//! Courtside Library
//!
//! Decision engine for buying late-game basketball favourites on Kalshi
//! when the ESPN win probability beats the ask: fee-aware Kelly sizing, an
//! entry gate with a survival model, and execution adapters.

pub mod common;
pub mod config;
pub mod execution;
pub mod feed;
pub mod kalshi;
pub mod strategy;
pub mod trader;

// Re-export commonly used types
pub use common::errors::{AdapterError, EngineError, InputError, Result};
pub use common::traits::{BoxedExecutionAdapter, ExecutionAdapter, OpportunityFeed};
pub use common::types::{
    BankrollState, ContractSide, League, Opportunity, OrderAck, OrderIntent, OrderStatus,
    OrderType, Settlement, TeamSide,
};
pub use config::types::AppConfig;
pub use execution::{DryRunExecutor, PaperExecutor};
pub use feed::SnapshotFeed;
pub use kalshi::{KalshiAuth, KalshiRestClient};
pub use trader::{BankrollLedger, TickSummary, TradingLoop};

// Strategy types
pub use strategy::{
    kalshi_fee, BrownianSurvival, CycleOutcome, Decision, DecisionEngine, DecisionStage,
    EntryGrade, EntryScore, EntryVerdict, FeeSchedule, NoGoReason, PositionSizer,
    RejectionReason, SizingRejection, SizingResult, SurvivalModel,
};
